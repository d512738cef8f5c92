/*!
Gravity orientation: which way is up, how strong gravity is, and how hard a jump pushes.

Orientation is chosen from a finite set of named [`GravityProfile`]s. Switching profiles is a
timed, cancellable [`Reorientation`]: while it runs, the character's rotation is slerped toward
the new up axis and the committed `{up, gravity, jump_speed}` stay untouched. They are replaced
together only when the transition completes. Cancelling leaves the rotation wherever the last
frame put it and keeps the previously committed values.

Re-entrancy: requesting a different profile while a transition is in flight cancels it and
restarts from the current, partially rotated pose. Requesting the profile already being
transitioned to is a no-op, and so is requesting the settled profile while the pose still lines
up with it. After a cancel the pose may be left tilted; requesting the settled profile then
swings it back.
*/

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{
    constants::{DEFAULT_PROFILE, DIR_EPS_SQ, INVERTED_PROFILE},
    error::{LocomotionError, Result},
    settings::ControllerSettings,
    types::{CharacterPose, Quat, UnitVec3, Vec3},
};

/// A named `{up, gravity, jump_speed}` combination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GravityProfile {
    pub name: String,
    /// Up axis in world space. Normalized on use.
    pub up: [f32; 3],
    /// Acceleration along `up` (negative).
    pub gravity: f32,
    pub jump_speed: f32,
}

impl GravityProfile {
    pub fn new(name: impl Into<String>, up: Vec3, gravity: f32, jump_speed: f32) -> Self {
        Self {
            name: name.into(),
            up: [up.x, up.y, up.z],
            gravity,
            jump_speed,
        }
    }

    pub fn up_axis(&self) -> Result<UnitVec3> {
        unit_up(Vec3::from(self.up))
    }

    pub fn orientation(&self) -> Result<Orientation> {
        Ok(Orientation {
            up: self.up_axis()?,
            gravity: self.gravity,
            jump_speed: self.jump_speed,
        })
    }
}

/// Normalize an up axis, rejecting zero-length and non-finite vectors.
pub fn unit_up(up: Vec3) -> Result<UnitVec3> {
    if !up.iter().all(|c| c.is_finite()) || up.norm_squared() <= DIR_EPS_SQ {
        return Err(LocomotionError::DegenerateUpAxis);
    }
    Ok(UnitVec3::new_normalize(up))
}

/// The set of profiles a controller may switch between.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GravityProfileSet {
    profiles: Vec<GravityProfile>,
}

impl GravityProfileSet {
    pub fn new(profiles: Vec<GravityProfile>) -> Result<Self> {
        let set = Self { profiles };
        set.validate()?;
        Ok(set)
    }

    /// `default` (world up) and `inverted` (world down), both with the settings' gravity and
    /// jump speed.
    pub fn standard(settings: &ControllerSettings) -> Self {
        Self {
            profiles: vec![
                GravityProfile::new(
                    DEFAULT_PROFILE,
                    Vec3::y(),
                    settings.gravity,
                    settings.jump_speed,
                ),
                GravityProfile::new(
                    INVERTED_PROFILE,
                    -Vec3::y(),
                    settings.gravity,
                    settings.jump_speed,
                ),
            ],
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let set: Self = serde_json::from_str(json)?;
        set.validate()?;
        Ok(set)
    }

    pub fn validate(&self) -> Result<()> {
        if self.profiles.is_empty() {
            return Err(LocomotionError::InvalidSettings(
                "at least one gravity profile is required".into(),
            ));
        }

        for (i, profile) in self.profiles.iter().enumerate() {
            profile.up_axis()?;
            if !profile.gravity.is_finite() || profile.gravity >= 0.0 {
                return Err(LocomotionError::InvalidSettings(format!(
                    "profile `{}` must have finite negative gravity",
                    profile.name
                )));
            }
            if !profile.jump_speed.is_finite() {
                return Err(LocomotionError::InvalidSettings(format!(
                    "profile `{}` must have a finite jump speed",
                    profile.name
                )));
            }
            if self.profiles[..i].iter().any(|p| p.name == profile.name) {
                return Err(LocomotionError::InvalidSettings(format!(
                    "duplicate gravity profile `{}`",
                    profile.name
                )));
            }
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&GravityProfile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| LocomotionError::UnknownGravityProfile(name.to_owned()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.name.as_str())
    }

    /// First profile whose up axis matches `up` within a small angle.
    fn matching(&self, up: &UnitVec3) -> Option<&GravityProfile> {
        self.profiles.iter().find(|p| {
            p.up_axis()
                .map(|axis| axis.dot(&up.into_inner()) > 1.0 - 1.0e-4)
                .unwrap_or(false)
        })
    }
}

/// Values used by the vertical integrator. Replaced as a whole.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    pub up: UnitVec3,
    pub gravity: f32,
    pub jump_speed: f32,
}

/// A running, time-bounded switch to another profile.
#[derive(Clone, Debug, PartialEq)]
pub struct Reorientation {
    target: String,
    target_orientation: Orientation,
    from_rotation: Quat,
    to_rotation: Quat,
    elapsed: f32,
    duration: f32,
}

impl Reorientation {
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Fraction of the transition completed, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    fn rotation_at(&self, t: f32) -> Quat {
        self.from_rotation
            .try_slerp(&self.to_rotation, t, 1.0e-6)
            .unwrap_or(self.to_rotation)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum OrientationStatus {
    /// Committed values are final. Holds the profile name when the orientation matches one.
    Settled(Option<String>),
    Transitioning(Reorientation),
}

/// What the orientation did during one step.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ReorientationEvent {
    #[default]
    Idle,
    InProgress(f32),
    Committed(String),
}

/// Owner of the committed orientation and of the reorientation task.
#[derive(Clone, Debug)]
pub struct GravityOrientation {
    current: Orientation,
    status: OrientationStatus,
    profiles: GravityProfileSet,
    duration: f32,
}

impl GravityOrientation {
    /// Start from the character's initial up axis, using the settings' gravity and jump speed.
    pub fn new(
        initial_up: UnitVec3,
        settings: &ControllerSettings,
        profiles: GravityProfileSet,
    ) -> Self {
        let matching = profiles.matching(&initial_up);
        let current = Orientation {
            up: initial_up,
            gravity: matching.map_or(settings.gravity, |p| p.gravity),
            jump_speed: matching.map_or(settings.jump_speed, |p| p.jump_speed),
        };
        let settled = matching.map(|p| p.name.clone());
        Self {
            current,
            status: OrientationStatus::Settled(settled),
            profiles,
            duration: settings.reorientation_duration,
        }
    }

    #[inline]
    pub fn current(&self) -> &Orientation {
        &self.current
    }

    #[inline]
    pub fn up(&self) -> UnitVec3 {
        self.current.up
    }

    #[inline]
    pub fn gravity(&self) -> f32 {
        self.current.gravity
    }

    #[inline]
    pub fn jump_speed(&self) -> f32 {
        self.current.jump_speed
    }

    pub fn status(&self) -> &OrientationStatus {
        &self.status
    }

    pub fn profiles(&self) -> &GravityProfileSet {
        &self.profiles
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.status, OrientationStatus::Transitioning(_))
    }

    /// Begin reorienting toward the profile called `name`.
    pub fn request(&mut self, name: &str, pose: &CharacterPose) -> Result<()> {
        let profile = self.profiles.get(name)?;
        let target_orientation = profile.orientation()?;

        let aligned = pose.up().dot(&target_orientation.up.into_inner()) > 1.0 - 1.0e-4;
        match &self.status {
            OrientationStatus::Settled(Some(settled)) if settled == name && aligned => {
                return Ok(());
            }
            OrientationStatus::Transitioning(running) if running.target == name => return Ok(()),
            OrientationStatus::Transitioning(running) => {
                log::info!(
                    "Reorientation toward `{}` restarted toward `{name}` at {:.0}%",
                    running.target,
                    running.progress() * 100.0
                );
            }
            OrientationStatus::Settled(_) => {
                log::info!("Reorientation toward `{name}` started");
            }
        }

        let to_rotation = rotation_onto(pose, &target_orientation.up) * pose.rotation;
        self.status = OrientationStatus::Transitioning(Reorientation {
            target: name.to_owned(),
            target_orientation,
            from_rotation: pose.rotation,
            to_rotation,
            elapsed: 0.0,
            duration: self.duration,
        });

        Ok(())
    }

    /// Abandon a running transition. Returns whether one was running.
    pub fn cancel(&mut self) -> bool {
        let OrientationStatus::Transitioning(running) = &self.status else {
            return false;
        };
        log::info!(
            "Reorientation toward `{}` cancelled at {:.0}%",
            running.target,
            running.progress() * 100.0
        );
        let settled = self.profiles.matching(&self.current.up).map(|p| p.name.clone());
        self.status = OrientationStatus::Settled(settled);
        true
    }

    /// Advance a running transition by `dt`, rotating `pose`, and commit when done.
    pub fn advance(&mut self, dt: f32, pose: &mut CharacterPose) -> ReorientationEvent {
        let OrientationStatus::Transitioning(running) = &mut self.status else {
            return ReorientationEvent::Idle;
        };

        running.elapsed += dt.max(0.0);
        let t = running.progress();
        pose.rotation = running.rotation_at(t);

        if t < 1.0 {
            return ReorientationEvent::InProgress(t);
        }

        let name = running.target.clone();
        self.current = running.target_orientation;
        self.status = OrientationStatus::Settled(Some(name.clone()));
        log::info!("Reorientation toward `{name}` committed");
        ReorientationEvent::Committed(name)
    }
}

/// Shortest rotation carrying the character's up onto `target_up`.
///
/// An exact flip has no unique shortest arc; it turns half a revolution about the character's
/// forward axis.
fn rotation_onto(pose: &CharacterPose, target_up: &UnitVec3) -> Quat {
    let current_up = pose.up();
    if current_up.dot(&target_up.into_inner()) < -1.0 + 1.0e-6 {
        return Quat::from_axis_angle(&pose.forward(), PI);
    }
    Quat::rotation_between_axis(&current_up, target_up).unwrap_or_else(Quat::identity)
}
