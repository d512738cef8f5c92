//! Contracts the controller relies on but does not implement.
//!
//! Collision resolution, step climbing and slope policy live behind [`DisplacementResolver`];
//! floor detection lives behind [`GroundProbe`]. `RapierWorld` implements both against a
//! Rapier scene, and tests use small scripted fakes.

use crate::{
    bitmask_flags::MoverFlags,
    contacts::ContactBuffer,
    types::{CharacterPose, GroundInfo, Vec3},
};

/// Reports whether there is ground beneath the character this frame.
pub trait GroundProbe {
    /// Returns `None` when no ground was found.
    fn detect_ground(&mut self, pose: &CharacterPose) -> Option<GroundInfo>;
}

/// Moves the character through the collision world.
pub trait DisplacementResolver {
    /// Replace the behavior switches used by subsequent moves.
    fn set_flags(&mut self, flags: MoverFlags);

    fn flags(&self) -> MoverFlags;

    /// Steepest slope (degrees from up) still classified as floor.
    fn max_floor_angle_deg(&self) -> f32;

    /// Move `pose` by `displacement`, resolving collisions.
    ///
    /// Implementations must clear `contacts` and then report the contacts made during this
    /// move, in the order they occurred.
    fn move_character(
        &mut self,
        pose: &mut CharacterPose,
        displacement: Vec3,
        contacts: &mut ContactBuffer,
    );
}

impl<T: GroundProbe + ?Sized> GroundProbe for Box<T> {
    fn detect_ground(&mut self, pose: &CharacterPose) -> Option<GroundInfo> {
        (**self).detect_ground(pose)
    }
}

impl<T: DisplacementResolver + ?Sized> DisplacementResolver for Box<T> {
    fn set_flags(&mut self, flags: MoverFlags) {
        (**self).set_flags(flags)
    }

    fn flags(&self) -> MoverFlags {
        (**self).flags()
    }

    fn max_floor_angle_deg(&self) -> f32 {
        (**self).max_floor_angle_deg()
    }

    fn move_character(
        &mut self,
        pose: &mut CharacterPose,
        displacement: Vec3,
        contacts: &mut ContactBuffer,
    ) {
        (**self).move_character(pose, displacement, contacts)
    }
}
