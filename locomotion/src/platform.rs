//! Rigid follow-through for characters standing on moving platforms.
//!
//! A platform reports its per-frame rigid delta (translation plus rotation about its origin).
//! The character inherits the world-space motion of the exact point it stands on, and the
//! yaw component of the platform rotation about the character's own up axis. The result is
//! applied after the controller's own collision move, so it never fights the resolver.

use crate::types::{CharacterPose, MovingPlatform, UnitVec3, Vec3};

/// Translation and up-axis rotation inherited from a platform for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlatformDisplacement {
    /// World-space translation of the contact point.
    pub delta_position: Vec3,
    /// Signed rotation about the character's up axis (degrees).
    pub delta_up_rotation: f32,
}

impl PlatformDisplacement {
    /// Net motion of `point` (world space) carried by `platform` this frame.
    ///
    /// The platform rotation is projected onto `character_up` by sign only: an axis pointing
    /// along up turns the character one way, an axis pointing away turns it the other way.
    /// A null rotation yields zero angle.
    pub fn at_point(platform: &MovingPlatform, point: &Vec3, character_up: &UnitVec3) -> Self {
        let (platform_delta_position, platform_delta_rotation) = platform.displacement();

        let local_position = point - platform.origin;
        let delta_position =
            platform_delta_position + platform_delta_rotation * local_position - local_position;

        let delta_up_rotation = platform_delta_rotation
            .axis_angle()
            .map(|(axis, angle)| {
                let sign = if axis.dot(&character_up.into_inner()) >= 0.0 {
                    1.0
                } else {
                    -1.0
                };
                angle.to_degrees() * sign
            })
            .unwrap_or(0.0);

        Self {
            delta_position,
            delta_up_rotation,
        }
    }

    /// Translate in world space, then turn about the character's own up axis.
    pub fn apply(&self, pose: &mut CharacterPose) {
        pose.translate_world(self.delta_position);
        pose.rotate_about_local_up(self.delta_up_rotation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Quat;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    fn platform(origin: Vec3, delta_position: Vec3, delta_rotation: Quat) -> MovingPlatform {
        MovingPlatform {
            origin,
            delta_position,
            delta_rotation,
        }
    }

    #[test]
    fn quarter_turn_about_up_moves_the_contact_tangentially() {
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2);
        let p = platform(Vec3::zeros(), Vec3::zeros(), rotation);
        let contact = Vec3::new(1.0, 0.0, 0.0);

        let d = PlatformDisplacement::at_point(&p, &contact, &Vec3::y_axis());

        let expected = rotation * contact - contact;
        assert!((d.delta_position - expected).norm() < 1.0e-5);
        assert!((d.delta_position - Vec3::new(-1.0, 0.0, -1.0)).norm() < 1.0e-5);
        assert!((d.delta_up_rotation - 90.0).abs() < 1.0e-3);
    }

    #[test]
    fn rotation_about_down_axis_turns_the_other_way() {
        let rotation = Quat::from_axis_angle(&UnitVec3::new_unchecked(-Vec3::y()), FRAC_PI_2);
        let p = platform(Vec3::zeros(), Vec3::zeros(), rotation);

        let d = PlatformDisplacement::at_point(&p, &Vec3::zeros(), &Vec3::y_axis());
        assert!((d.delta_up_rotation + 90.0).abs() < 1.0e-3);
    }

    #[test]
    fn contact_is_measured_from_the_platform_origin() {
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2);
        let origin = Vec3::new(10.0, 2.0, -4.0);
        let p = platform(origin, Vec3::zeros(), rotation);

        // Standing on the pivot itself: no tangential motion.
        let d = PlatformDisplacement::at_point(&p, &origin, &Vec3::y_axis());
        assert!(d.delta_position.norm() < 1.0e-5);
    }

    #[test]
    fn identity_rotation_has_zero_angle() {
        let p = platform(Vec3::zeros(), Vec3::zeros(), Quat::identity());
        let d = PlatformDisplacement::at_point(&p, &Vec3::new(3.0, 0.0, 1.0), &Vec3::y_axis());
        assert_eq!(d.delta_up_rotation, 0.0);
        assert!(d.delta_position.norm() < 1.0e-6);
    }

    #[test]
    fn apply_translates_then_turns_about_own_up() {
        let mut pose = CharacterPose::new(Vec3::new(1.0, 0.0, 0.0), Quat::identity());
        let d = PlatformDisplacement {
            delta_position: Vec3::new(0.0, 0.0, 2.0),
            delta_up_rotation: 90.0,
        };
        d.apply(&mut pose);

        assert!((pose.translation - Vec3::new(1.0, 0.0, 2.0)).norm() < 1.0e-6);
        assert!((pose.forward().into_inner() + Vec3::x()).norm() < 1.0e-5);
    }

    proptest! {
        #[test]
        fn pure_translation_ignores_the_contact_point(
            x in -100.0f32..100.0,
            y in -100.0f32..100.0,
            z in -100.0f32..100.0,
        ) {
            let p = platform(Vec3::new(5.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 0.0), Quat::identity());
            let d = PlatformDisplacement::at_point(&p, &Vec3::new(x, y, z), &Vec3::y_axis());
            prop_assert!((d.delta_position - Vec3::new(1.0, 0.0, 0.0)).norm() < 1.0e-4);
            prop_assert_eq!(d.delta_up_rotation, 0.0);
        }
    }
}
