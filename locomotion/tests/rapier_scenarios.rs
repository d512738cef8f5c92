use std::f32::consts::FRAC_PI_2;

use locomotion::{
    CapsuleSpec, CharacterPose, ColliderShapeDef, FrameInput, LocomotionController,
    PlatformMotion, Quat, RapierGroundProbe, RapierMover, RapierWorld, SharedWorld, StepReport,
    SurfaceDef, Vec3,
};

type Controller = LocomotionController<RapierGroundProbe, RapierMover>;

const DT: f32 = 1.0 / 60.0;
const CAPSULE: CapsuleSpec = CapsuleSpec {
    half_height: 0.5,
    radius: 0.4,
};

fn floor() -> SurfaceDef {
    SurfaceDef::fixed(
        1,
        Vec3::zeros(),
        Quat::identity(),
        ColliderShapeDef::Plane {
            offset_along_normal: 0.0,
        },
    )
}

struct Rig {
    world: SharedWorld,
    controller: Controller,
    time: f32,
}

impl Rig {
    fn new(defs: Vec<SurfaceDef>, spawn: Vec3) -> Self {
        let world = RapierWorld::build(defs).into_shared();
        let controller = LocomotionController::builder()
            .probe(RapierGroundProbe::new(world.clone(), CAPSULE, 45.0))
            .resolver(RapierMover::new(world.clone(), CAPSULE, 45.0))
            .pose(CharacterPose::new(spawn, Quat::identity()))
            .build()
            .unwrap();
        Self {
            world,
            controller,
            time: 0.0,
        }
    }

    fn step(&mut self, horizontal: f32, vertical: f32, jump_pressed: bool) -> StepReport {
        self.time += DT;
        self.world.borrow_mut().advance_platforms(DT);
        self.controller.step(&FrameInput {
            horizontal,
            vertical,
            jump_pressed,
            delta_time: DT,
            time: self.time,
        })
    }

    fn idle(&mut self, frames: usize) -> StepReport {
        let mut last = self.step(0.0, 0.0, false);
        for _ in 1..frames {
            last = self.step(0.0, 0.0, false);
        }
        last
    }

    fn translation(&self) -> Vec3 {
        self.controller.pose().translation
    }
}

fn standing_height() -> f32 {
    CAPSULE.half_height + CAPSULE.radius
}

#[test]
fn falls_onto_the_floor_and_settles() {
    let mut rig = Rig::new(vec![floor()], Vec3::new(0.0, 3.0, 0.0));

    let first = rig.step(0.0, 0.0, false);
    assert!(!first.grounded);

    let last = rig.idle(120);
    assert!(last.grounded);
    assert_eq!(last.vertical_speed, 0.0);
    assert!((rig.translation().y - standing_height()).abs() < 0.1);
}

#[test]
fn walks_forward_at_move_speed() {
    let mut rig = Rig::new(vec![floor()], Vec3::new(0.0, standing_height() + 0.02, 0.0));
    rig.idle(10);

    let start = rig.translation();
    for _ in 0..60 {
        rig.step(0.0, 1.0, false);
    }
    let travelled = rig.translation() - start;

    // Forward is -Z; one second at 5 m/s.
    assert!((travelled.z + 5.0).abs() < 0.25);
    assert!(travelled.x.abs() < 1.0e-3);
    assert!((rig.translation().y - standing_height()).abs() < 0.1);
}

#[test]
fn jump_leaves_the_ground_and_lands_again() {
    let mut rig = Rig::new(vec![floor()], Vec3::new(0.0, standing_height() + 0.02, 0.0));
    rig.idle(10);

    let takeoff = rig.step(0.0, 0.0, true);
    assert!(takeoff.jumped);
    assert!(!takeoff.grounded);

    let rising = rig.idle(12);
    assert!(!rising.grounded);
    assert!(rig.translation().y > standing_height() + 0.5);

    let landed = rig.idle(90);
    assert!(landed.grounded);
    assert!((rig.translation().y - standing_height()).abs() < 0.1);
}

#[test]
fn low_ceiling_turns_a_jump_around() {
    let ceiling = SurfaceDef::fixed(
        2,
        Vec3::new(0.0, 2.25, 0.0),
        Quat::identity(),
        ColliderShapeDef::Cuboid {
            half_extents: Vec3::new(3.0, 0.25, 3.0),
        },
    );
    let mut rig = Rig::new(
        vec![floor(), ceiling],
        Vec3::new(0.0, standing_height() + 0.02, 0.0),
    );
    rig.idle(10);
    rig.step(0.0, 0.0, true);

    let mut bounced = None;
    for _ in 0..60 {
        let report = rig.step(0.0, 0.0, false);
        if report.ceiling_bounce {
            bounced = Some(report);
            break;
        }
    }

    let report = bounced.expect("head hit the ceiling");
    assert!(report.vertical_speed < 0.0);
    // The head never passes the underside of the slab.
    assert!(rig.translation().y + standing_height() <= 2.0 + 0.05);
}

#[test]
fn rides_a_spinning_platform() {
    let platform_center = Vec3::new(0.0, 0.1, 0.0);
    let platform = SurfaceDef::fixed(
        5,
        platform_center,
        Quat::identity(),
        ColliderShapeDef::Cuboid {
            half_extents: Vec3::new(3.0, 0.1, 3.0),
        },
    )
    .moving(PlatformMotion {
        linear_velocity: Vec3::zeros(),
        angular_velocity: Vec3::new(0.0, FRAC_PI_2, 0.0),
    });

    let spawn = Vec3::new(1.5, 0.2 + standing_height() + 0.02, 0.0);
    let mut rig = Rig::new(vec![floor(), platform], spawn);

    let mut riding_frames = 0;
    for _ in 0..60 {
        if rig.step(0.0, 0.0, false).platform.is_some() {
            riding_frames += 1;
        }
    }
    assert!(riding_frames > 50);

    // A quarter turn in one second carries +X round to -Z.
    let planar = rig.translation() - platform_center;
    assert!((planar.x.hypot(planar.z) - 1.5).abs() < 0.2);
    assert!(planar.z < -1.2);

    // Facing turns with the platform: forward (-Z) becomes -X.
    let forward = rig.controller.pose().forward();
    assert!(forward.x < -0.9);
}

#[test]
fn rides_a_platform_that_slides_and_spins_without_drifting() {
    let start_center = Vec3::new(0.0, 0.1, 0.0);
    let velocity = Vec3::new(1.0, 0.0, 0.0);
    let platform = SurfaceDef::fixed(
        5,
        start_center,
        Quat::identity(),
        ColliderShapeDef::Cuboid {
            half_extents: Vec3::new(3.0, 0.1, 3.0),
        },
    )
    .moving(PlatformMotion {
        linear_velocity: velocity,
        angular_velocity: Vec3::new(0.0, FRAC_PI_2, 0.0),
    });

    let offset = Vec3::new(1.5, 0.0, 0.0);
    let spawn = start_center + offset + Vec3::new(0.0, 0.1 + standing_height() + 0.02, 0.0);
    let mut rig = Rig::new(vec![floor(), platform], spawn);

    for _ in 0..60 {
        rig.step(0.0, 0.0, false);
    }

    // The character keeps its spot on the deck: the platform moved 1 m along +X and the
    // +X offset turned a quarter round to -Z.
    let pose = rig.world.borrow().surface_pose(5).expect("platform pose");
    let expected = pose.translation.vector + pose.rotation * offset;
    let planar = rig.translation() - expected;
    assert!(planar.x.hypot(planar.z) < 0.15);
    assert!((pose.translation.vector - (start_center + velocity)).norm() < 0.05);
}

#[test]
fn inverted_gravity_falls_toward_the_new_down() {
    let mut rig = Rig::new(vec![floor()], Vec3::new(0.0, standing_height() + 0.02, 0.0));
    rig.idle(10);

    rig.controller.request_reorientation("inverted").unwrap();
    rig.idle(60);

    assert!(!rig.controller.orientation().is_transitioning());
    assert!(rig.controller.pose().up().y < -0.99);
    assert!(rig.translation().y > standing_height() + 0.5);
}
