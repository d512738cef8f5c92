use crate::{
    constants::{CEILING_BOUNCE_FACTOR, CEILING_DOT_THRESHOLD},
    contacts::ContactBuffer,
    state::LocomotionState,
    types::UnitVec3,
};

/// Downward speed along up that keeps a grounded character pressed onto descending floors.
///
/// Proportional to move speed and to how steep a floor the resolver still walks on.
#[inline]
pub fn ground_clamp_speed(max_floor_angle_deg: f32, move_speed: f32) -> f32 {
    -max_floor_angle_deg.to_radians().tan() * move_speed
}

impl LocomotionState {
    /// Dampen and invert vertical speed if any contact is a ceiling.
    ///
    /// The first qualifying contact in report order wins. Returns whether a bounce happened.
    pub fn bounce_off_ceiling(&mut self, contacts: &ContactBuffer, up: &UnitVec3) -> bool {
        let hit_ceiling = contacts
            .iter()
            .any(|contact| contact.normal.dot(&up.into_inner()) < CEILING_DOT_THRESHOLD);

        if hit_ceiling {
            self.vertical_speed *= CEILING_BOUNCE_FACTOR;
        }
        hit_ceiling
    }

    /// Semi-implicit Euler step of gravity, clamped to the terminal fall speed.
    pub fn integrate_gravity(&mut self, gravity: f32, min_vertical_speed: f32, dt: f32) {
        self.vertical_speed += gravity * dt;

        if self.vertical_speed < min_vertical_speed {
            self.vertical_speed = min_vertical_speed;
        }
    }
}
