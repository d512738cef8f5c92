//! Rapier-backed collision world and the reference collaborators built on it.
//!
//! [`RapierWorld`] owns a small collision-only Rapier scene: static surfaces plus kinematic
//! platforms that move by a fixed linear/angular velocity. There are no rigid-body dynamics;
//! the `CollisionPipeline` only keeps the broad and narrow phases current so scene queries and
//! the Rapier `KinematicCharacterController` see the latest platform poses.
//!
//! The probe and the mover share the world through [`SharedWorld`] so the host can advance
//! platforms between controller steps.

use std::{cell::RefCell, f32::consts::FRAC_PI_2, rc::Rc};

use log::debug;
use rapier3d::{
    control::{CharacterAutostep, CharacterLength, KinematicCharacterController},
    na::Translation3,
    prelude::*,
};

use crate::{
    bitmask_flags::MoverFlags,
    collaborators::{DisplacementResolver, GroundProbe},
    contacts::ContactBuffer,
    types::{
        CharacterPose, GroundInfo, Iso, MoveContact, MovingPlatform, Quat, Surface, SurfaceId,
        UnitVec3, Vec3,
    },
};

/// Shape of a world surface. Units are meters.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite half-space. The normal is `rotation * +Y`, through `translation` shifted by
    /// `offset_along_normal`.
    Plane { offset_along_normal: f32 },
    Cuboid { half_extents: Vec3 },
}

/// Constant velocity of a kinematic platform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlatformMotion {
    /// World-space linear velocity (m/s).
    pub linear_velocity: Vec3,
    /// World-space angular velocity as a scaled axis (rad/s), about the platform origin.
    pub angular_velocity: Vec3,
}

/// Definition of one world surface.
#[derive(Clone, Debug)]
pub struct SurfaceDef {
    /// Stable unique id. Reported back in contacts and ground hits.
    pub id: SurfaceId,
    pub translation: Vec3,
    pub rotation: Quat,
    pub shape: ColliderShapeDef,
    /// `None` for static geometry.
    pub motion: Option<PlatformMotion>,
}

impl SurfaceDef {
    pub fn fixed(
        id: SurfaceId,
        translation: Vec3,
        rotation: Quat,
        shape: ColliderShapeDef,
    ) -> Self {
        Self {
            id,
            translation,
            rotation,
            shape,
            motion: None,
        }
    }

    pub fn moving(mut self, motion: PlatformMotion) -> Self {
        self.motion = Some(motion);
        self
    }
}

/// Capsule dimensions of the character, aligned with its local up axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleSpec {
    pub half_height: f32,
    pub radius: f32,
}

impl Default for CapsuleSpec {
    fn default() -> Self {
        Self {
            half_height: 0.5,
            radius: 0.4,
        }
    }
}

impl CapsuleSpec {
    /// Distance from the capsule center to its feet along up.
    #[inline]
    pub fn center_to_feet(&self) -> f32 {
        self.half_height + self.radius
    }
}

struct SurfaceEntry {
    id: SurfaceId,
    handle: ColliderHandle,
    motion: Option<PlatformMotion>,
    /// Rigid delta of the last `advance_platforms` call.
    last_delta: Option<MovingPlatform>,
}

pub type SharedWorld = Rc<RefCell<RapierWorld>>;

pub struct RapierWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    collision_pipeline: CollisionPipeline,
    /// Sorted by id.
    surfaces: Vec<SurfaceEntry>,
}

impl RapierWorld {
    /// Build a world from surface definitions, inserted in id order.
    pub fn build(mut defs: Vec<SurfaceDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let mut surfaces = Vec::with_capacity(defs.len());

        for def in defs {
            let handle = colliders.insert(collider_from_def(&def));
            surfaces.push(SurfaceEntry {
                id: def.id,
                handle,
                motion: def.motion,
                last_delta: None,
            });
        }

        let mut world = Self {
            bodies,
            colliders,
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            collision_pipeline: CollisionPipeline::new(),
            surfaces,
        };
        world.refresh();

        debug!(
            "Built collision world with {} surface(s), {} moving",
            world.surfaces.len(),
            world.surfaces.iter().filter(|s| s.motion.is_some()).count()
        );
        world
    }

    pub fn into_shared(self) -> SharedWorld {
        Rc::new(RefCell::new(self))
    }

    /// Move every platform by its velocity over `dt` and remember the rigid delta.
    pub fn advance_platforms(&mut self, dt: f32) {
        for entry in &mut self.surfaces {
            let Some(motion) = entry.motion else {
                continue;
            };
            let Some(collider) = self.colliders.get_mut(entry.handle) else {
                continue;
            };

            let before = *collider.position();
            let delta_position = motion.linear_velocity * dt;
            let delta_rotation = Quat::from_scaled_axis(motion.angular_velocity * dt);

            let after = Iso::from_parts(
                Translation3::from(before.translation.vector + delta_position),
                delta_rotation * before.rotation,
            );
            collider.set_position(after);

            // Pre-update origin: until the controller applies the follow-through, the character
            // (and the ground point under it) still sits where the platform point was before
            // this update, so `point - origin` is that point's offset in the old frame.
            entry.last_delta = Some(MovingPlatform {
                origin: before.translation.vector,
                delta_position,
                delta_rotation,
            });
        }

        self.refresh();
    }

    /// Current world pose of a surface.
    pub fn surface_pose(&self, id: SurfaceId) -> Option<Iso> {
        let entry = self.entry(id)?;
        self.colliders.get(entry.handle).map(|c| *c.position())
    }

    /// Surface description for a collider, including the last platform delta.
    pub fn surface(&self, handle: ColliderHandle) -> Option<Surface> {
        let id = self.colliders.get(handle)?.user_data as SurfaceId;
        let entry = self.entry(id)?;

        if entry.motion.is_none() {
            return Some(Surface::fixed(id));
        }

        let platform = match entry.last_delta {
            Some(delta) => delta,
            None => MovingPlatform {
                origin: self.colliders.get(handle)?.position().translation.vector,
                delta_position: Vec3::zeros(),
                delta_rotation: Quat::identity(),
            },
        };
        Some(Surface::platform(id, platform))
    }

    /// Borrowed query view over the current scene.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    fn entry(&self, id: SurfaceId) -> Option<&SurfaceEntry> {
        self.surfaces
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|idx| &self.surfaces[idx])
    }

    /// Rerun collision detection only, so the broad phase sees moved colliders.
    fn refresh(&mut self) {
        let hooks = ();
        let events = ();
        self.collision_pipeline.step(
            0.0,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &hooks,
            &events,
        );
    }
}

fn collider_from_def(def: &SurfaceDef) -> Collider {
    let iso = Iso::from_parts(Translation3::from(def.translation), def.rotation);

    let builder = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // Plane `n . x = dist` placed at `n * dist`.
            let n = def.rotation * Vector::y();
            let dist = n.dot(&def.translation) + *offset_along_normal;
            let unit_n = UnitVector::new_normalize(n);
            ColliderBuilder::new(SharedShape::new(HalfSpace::new(unit_n)))
                .translation(unit_n.into_inner() * dist)
        }
        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).position(iso)
        }
    };

    builder.user_data(def.id as u128).build()
}

/// Ray-cast ground probe along the character's `-up`.
pub struct RapierGroundProbe {
    world: SharedWorld,
    capsule: CapsuleSpec,
    /// Extra reach below the feet (meters).
    pub probe_distance: f32,
    pub max_floor_angle_deg: f32,
}

impl RapierGroundProbe {
    pub fn new(world: SharedWorld, capsule: CapsuleSpec, max_floor_angle_deg: f32) -> Self {
        Self {
            world,
            capsule,
            probe_distance: 0.1,
            max_floor_angle_deg,
        }
    }
}

impl GroundProbe for RapierGroundProbe {
    fn detect_ground(&mut self, pose: &CharacterPose) -> Option<GroundInfo> {
        let up = pose.up();
        let world = self.world.borrow();
        let query_pipeline = world.query_pipeline(QueryFilter::default());

        let ray = Ray::new(Point::from(pose.translation), -up.into_inner());
        let reach = self.capsule.center_to_feet() + self.probe_distance;
        let (handle, hit) = query_pipeline.cast_ray_and_get_normal(&ray, reach, true)?;

        let is_on_floor =
            hit.normal.dot(&up.into_inner()) >= self.max_floor_angle_deg.to_radians().cos();

        Some(GroundInfo {
            is_on_floor,
            surface: world.surface(handle),
            point: ray.point_at(hit.time_of_impact).coords,
        })
    }
}

/// Sweep-and-slide mover built on Rapier's `KinematicCharacterController`.
pub struct RapierMover {
    world: SharedWorld,
    capsule: CapsuleSpec,
    flags: MoverFlags,
    max_floor_angle_deg: f32,
    /// Skin width kept between the capsule and obstacles (meters).
    pub offset: f32,
    /// Highest step climbed while `CanClimbSteps` is set (meters).
    pub max_step_height: f32,
    /// Time step handed to Rapier's slope heuristics.
    pub time_step: f32,
}

impl RapierMover {
    pub fn new(world: SharedWorld, capsule: CapsuleSpec, max_floor_angle_deg: f32) -> Self {
        Self {
            world,
            capsule,
            flags: MoverFlags::default(),
            max_floor_angle_deg,
            offset: 0.02,
            max_step_height: 0.3,
            time_step: 1.0 / 60.0,
        }
    }

    fn character_controller(&self, up: UnitVec3) -> KinematicCharacterController {
        let max_floor_angle = self.max_floor_angle_deg.to_radians();
        KinematicCharacterController {
            up,
            offset: CharacterLength::Absolute(self.offset),
            autostep: self.flags.can_climb_steps().then(|| CharacterAutostep {
                include_dynamic_bodies: false,
                max_height: CharacterLength::Absolute(self.max_step_height),
                ..CharacterAutostep::default()
            }),
            max_slope_climb_angle: if self.flags.prevent_moving_up_steep_slope() {
                max_floor_angle
            } else {
                FRAC_PI_2
            },
            min_slope_slide_angle: max_floor_angle,
            snap_to_ground: None,
            ..KinematicCharacterController::default()
        }
    }
}

impl DisplacementResolver for RapierMover {
    fn set_flags(&mut self, flags: MoverFlags) {
        self.flags = flags;
    }

    fn flags(&self) -> MoverFlags {
        self.flags
    }

    fn max_floor_angle_deg(&self) -> f32 {
        self.max_floor_angle_deg
    }

    fn move_character(
        &mut self,
        pose: &mut CharacterPose,
        displacement: Vec3,
        contacts: &mut ContactBuffer,
    ) {
        contacts.clear();

        let world = self.world.borrow();
        let query_pipeline = world.query_pipeline(QueryFilter::default());
        let kcc = self.character_controller(pose.up());

        let movement = kcc.move_shape(
            self.time_step,
            &query_pipeline,
            &Capsule::new_y(self.capsule.half_height, self.capsule.radius),
            &pose.iso(),
            displacement,
            |collision| {
                // Orient the normal against the motion so it points back at the character.
                let motion = collision.translation_applied + collision.translation_remaining;
                let mut normal = collision.hit.normal1.into_inner();
                if normal.dot(&motion) > 0.0 {
                    normal = -normal;
                }

                contacts.push(MoveContact {
                    normal,
                    point: collision.hit.witness1.coords,
                    surface: world
                        .colliders
                        .get(collision.handle)
                        .map(|c| c.user_data as SurfaceId),
                });
            },
        );

        pose.translate_world(movement.translation);
    }
}
