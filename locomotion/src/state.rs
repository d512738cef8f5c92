//! Per-character locomotion state and the grounded hysteresis.
//!
//! Grounded classification is driven by a timer rather than the raw probe result: every safely
//! grounded frame pushes `next_ungrounded_time` forward, and the character counts as grounded
//! until that time passes. Short probe dropouts on bumpy ground therefore do not flicker the
//! state.

use crate::constants::SAFE_GROUND_VERTICAL_SPEED;

/// Mutable state owned by one controller.
///
/// The vertical integrator (see `vertical.rs`) and the state machine share `vertical_speed`;
/// both are implemented on this type.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LocomotionState {
    /// Speed along the character's up axis (m/s).
    pub vertical_speed: f32,
    /// Absolute time after which the character is considered ungrounded. `None` when unset.
    pub next_ungrounded_time: Option<f32>,
}

impl LocomotionState {
    /// Ground was found, classified as floor, and we are not moving up.
    #[inline]
    pub fn is_safely_grounded(&self, ground_detected: bool, is_on_floor: bool) -> bool {
        ground_detected && is_on_floor && self.vertical_speed < SAFE_GROUND_VERTICAL_SPEED
    }

    /// Keep the character grounded until `now + window`.
    #[inline]
    pub fn extend_grounded(&mut self, now: f32, window: f32) {
        self.next_ungrounded_time = Some(now + window);
    }

    #[inline]
    pub fn is_grounded(&self, now: f32) -> bool {
        self.next_ungrounded_time.is_some_and(|t| now < t)
    }

    /// Start a jump: set the vertical speed and invalidate the grounded window at once.
    #[inline]
    pub fn jump(&mut self, jump_speed: f32) {
        self.vertical_speed = jump_speed;
        self.next_ungrounded_time = None;
    }

    /// A grounded frame carries no vertical speed.
    #[inline]
    pub fn land(&mut self) {
        self.vertical_speed = 0.0;
    }
}
