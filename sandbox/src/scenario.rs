//! The scripted test level: a floor, a low ceiling slab over the spawn point and a spinning
//! platform a few meters ahead.

use locomotion::{
    CapsuleSpec, ColliderShapeDef, PlatformMotion, Quat, RapierWorld, SurfaceDef, SurfaceId, Vec3,
    constants::{DEFAULT_PROFILE, INVERTED_PROFILE},
};

pub const FLOOR: SurfaceId = 1;
pub const CEILING: SurfaceId = 2;
pub const PLATFORM: SurfaceId = 3;

/// Steepest walkable slope for both the probe and the mover.
pub const MAX_FLOOR_ANGLE_DEG: f32 = 45.0;

pub fn build_world() -> RapierWorld {
    RapierWorld::build(vec![
        SurfaceDef::fixed(
            FLOOR,
            Vec3::zeros(),
            Quat::identity(),
            ColliderShapeDef::Plane {
                offset_along_normal: 0.0,
            },
        ),
        // Underside at 2.5 m: lower than the apex of a standing jump.
        SurfaceDef::fixed(
            CEILING,
            Vec3::new(0.0, 2.75, 0.0),
            Quat::identity(),
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(3.0, 0.25, 3.0),
            },
        ),
        // Thin enough to step onto.
        SurfaceDef::fixed(
            PLATFORM,
            Vec3::new(0.0, 0.1, -8.0),
            Quat::identity(),
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(2.5, 0.1, 2.5),
            },
        )
        .moving(PlatformMotion {
            linear_velocity: Vec3::zeros(),
            angular_velocity: Vec3::new(0.0, 0.8, 0.0),
        }),
    ])
}

/// Spawn with the feet just above the floor.
pub fn spawn_point(capsule: &CapsuleSpec) -> Vec3 {
    Vec3::new(0.0, capsule.center_to_feet() + 0.02, 0.0)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Hold the input axes until the next `Walk`.
    Walk { horizontal: f32, vertical: f32 },
    Jump,
    Reorient(&'static str),
}

pub const SCRIPT: &[(f32, Action)] = &[
    (0.5, Action::Jump),
    (
        1.5,
        Action::Walk {
            horizontal: 0.0,
            vertical: 1.0,
        },
    ),
    (
        3.1,
        Action::Walk {
            horizontal: 0.0,
            vertical: 0.0,
        },
    ),
    (4.5, Action::Reorient(INVERTED_PROFILE)),
    (4.8, Action::Reorient(DEFAULT_PROFILE)),
];

/// Actions scheduled in `(from, to]`.
pub fn due(from: f32, to: f32) -> impl Iterator<Item = Action> {
    SCRIPT
        .iter()
        .filter(move |(at, _)| *at > from && *at <= to)
        .map(|(_, action)| *action)
}
