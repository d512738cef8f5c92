/*!
Core data types exchanged between the controller and its collaborators.

This module contains no algorithms. It defines:
- math aliases used across the crate,
- the character pose and its local axes,
- the surfaces a ground probe can report, including the moving-platform capability,
- the per-frame ground and contact records.

Axis convention: right-handed, Y-up local frame. `up = rotation * +Y`,
`right = rotation * +X`, `forward = rotation * -Z`.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type UnitVec3 = na::Unit<na::Vector3<f32>>;
pub type Iso = na::Isometry3<f32>;

/// World-space pose of the character.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CharacterPose {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for CharacterPose {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Quat::identity())
    }
}

impl CharacterPose {
    #[inline]
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    #[inline]
    pub fn up(&self) -> UnitVec3 {
        self.rotation * Vec3::y_axis()
    }

    #[inline]
    pub fn right(&self) -> UnitVec3 {
        self.rotation * Vec3::x_axis()
    }

    #[inline]
    pub fn forward(&self) -> UnitVec3 {
        UnitVec3::new_unchecked(self.rotation * -Vec3::z())
    }

    /// Convert to nalgebra `Isometry3` for scene queries.
    #[inline]
    pub fn iso(&self) -> Iso {
        Iso::from_parts(na::Translation3::from(self.translation), self.rotation)
    }

    /// Translate in world space.
    #[inline]
    pub fn translate_world(&mut self, delta: Vec3) {
        self.translation += delta;
    }

    /// Rotate about the character's own up axis (local +Y).
    pub fn rotate_about_local_up(&mut self, degrees: f32) {
        let yaw = Quat::from_axis_angle(&Vec3::y_axis(), degrees.to_radians());
        self.rotation *= yaw;
    }
}

/// Stable identifier of a surface in the collision world.
pub type SurfaceId = u32;

/// Per-frame rigid motion of a platform, as seen through the surface that was contacted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovingPlatform {
    /// Platform reference point before this frame's update.
    pub origin: Vec3,
    /// Translation applied to the platform this frame.
    pub delta_position: Vec3,
    /// Rotation applied to the platform this frame, about `origin`.
    pub delta_rotation: Quat,
}

impl MovingPlatform {
    /// The platform's rigid delta for this frame.
    #[inline]
    pub fn displacement(&self) -> (Vec3, Quat) {
        (self.delta_position, self.delta_rotation)
    }
}

/// What kind of surface was touched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SurfaceKind {
    Static,
    Platform(MovingPlatform),
}

/// A contacted surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    pub id: SurfaceId,
    pub kind: SurfaceKind,
}

impl Surface {
    #[inline]
    pub fn fixed(id: SurfaceId) -> Self {
        Self {
            id,
            kind: SurfaceKind::Static,
        }
    }

    #[inline]
    pub fn platform(id: SurfaceId, platform: MovingPlatform) -> Self {
        Self {
            id,
            kind: SurfaceKind::Platform(platform),
        }
    }

    /// Moving-platform capability of this surface, if it has one.
    #[inline]
    pub fn as_platform(&self) -> Option<&MovingPlatform> {
        match &self.kind {
            SurfaceKind::Platform(platform) => Some(platform),
            SurfaceKind::Static => None,
        }
    }
}

/// Result of a successful ground probe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundInfo {
    /// Whether the surface is walkable floor (as opposed to a wall or an over-steep slope).
    pub is_on_floor: bool,
    /// The surface under the character, when the probe can identify it.
    pub surface: Option<Surface>,
    /// World-space contact point.
    pub point: Vec3,
}

/// A single contact reported by the displacement resolver during a move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveContact {
    /// World-space unit normal of the touched surface, pointing toward the character.
    pub normal: Vec3,
    /// World-space contact point.
    pub point: Vec3,
    pub surface: Option<SurfaceId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_pose_axes_follow_y_up_convention() {
        let pose = CharacterPose::default();
        assert!((pose.up().into_inner() - Vec3::y()).norm() < 1.0e-6);
        assert!((pose.right().into_inner() - Vec3::x()).norm() < 1.0e-6);
        assert!((pose.forward().into_inner() + Vec3::z()).norm() < 1.0e-6);
    }

    #[test]
    fn rotate_about_local_up_keeps_up_and_turns_forward() {
        let mut pose = CharacterPose::default();
        pose.rotate_about_local_up(90.0);

        assert!((pose.up().into_inner() - Vec3::y()).norm() < 1.0e-5);
        // A quarter turn counter-clockwise about +Y moves -Z onto -X.
        assert!((pose.forward().into_inner() + Vec3::x()).norm() < 1.0e-5);
    }

    #[test]
    fn rotate_about_local_up_uses_the_characters_own_up() {
        let flipped = Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::PI);
        let mut pose = CharacterPose::new(Vec3::zeros(), flipped);
        pose.rotate_about_local_up(45.0);

        assert!((pose.up().into_inner() + Vec3::y()).norm() < 1.0e-5);
    }

    #[test]
    fn only_platform_surfaces_expose_the_platform_capability() {
        let platform = MovingPlatform {
            origin: Vec3::zeros(),
            delta_position: Vec3::x(),
            delta_rotation: Quat::identity(),
        };

        assert!(Surface::fixed(1).as_platform().is_none());
        assert_eq!(Surface::platform(2, platform).as_platform(), Some(&platform));
    }
}
