/*!
Locomotion controller settings.

These values tune a single character controller. They are plain data so a host can load them
from JSON (or any serde format) and hand them to the builder.

Notes
- Distances are in meters, time in seconds, speeds in meters per second.
- Gravity is expressed along the character's up axis, so the usual value is negative.
- `validate()` is called by the builder; a controller never runs with rejected settings.
*/

use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        DEFAULT_GRAVITY, DEFAULT_JUMP_SPEED, DEFAULT_MOVE_SPEED, DEFAULT_REORIENTATION_DURATION,
        MIN_VERTICAL_SPEED, TIME_BEFORE_UNGROUNDED,
    },
    error::{LocomotionError, Result},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    /// Planar speed at full input deflection.
    pub move_speed: f32,

    /// Vertical speed given by a jump.
    pub jump_speed: f32,

    /// Acceleration along up while airborne (negative pulls toward the floor).
    pub gravity: f32,

    /// Terminal fall speed along up (negative).
    pub min_vertical_speed: f32,

    /// Grounded hysteresis window after the last safely grounded frame.
    pub time_before_ungrounded: f32,

    /// How long a gravity reorientation takes.
    pub reorientation_duration: f32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            move_speed: DEFAULT_MOVE_SPEED,
            jump_speed: DEFAULT_JUMP_SPEED,
            gravity: DEFAULT_GRAVITY,
            min_vertical_speed: MIN_VERTICAL_SPEED,
            time_before_ungrounded: TIME_BEFORE_UNGROUNDED,
            reorientation_duration: DEFAULT_REORIENTATION_DURATION,
        }
    }
}

impl ControllerSettings {
    /// Parse settings from JSON. Missing fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("move_speed", self.move_speed),
            ("jump_speed", self.jump_speed),
            ("gravity", self.gravity),
            ("min_vertical_speed", self.min_vertical_speed),
            ("time_before_ungrounded", self.time_before_ungrounded),
            ("reorientation_duration", self.reorientation_duration),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(LocomotionError::InvalidSettings(format!(
                "`{name}` must be finite"
            )));
        }

        if self.move_speed < 0.0 {
            return Err(invalid("`move_speed` must be >= 0"));
        }
        if self.gravity >= 0.0 {
            return Err(invalid("`gravity` must be negative along up"));
        }
        if self.min_vertical_speed >= 0.0 {
            return Err(invalid("`min_vertical_speed` must be negative"));
        }
        if self.time_before_ungrounded <= 0.0 {
            return Err(invalid("`time_before_ungrounded` must be > 0"));
        }
        if self.reorientation_duration <= 0.0 {
            return Err(invalid("`reorientation_duration` must be > 0"));
        }

        Ok(())
    }
}

fn invalid(reason: &str) -> LocomotionError {
    LocomotionError::InvalidSettings(reason.to_owned())
}
