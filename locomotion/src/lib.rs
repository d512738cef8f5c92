pub mod bitmask_flags;
pub mod collaborators;
pub mod constants;
pub mod contacts;
pub mod controller;
pub mod error;
pub mod gravity;
pub mod platform;
pub mod settings;
pub mod state;
pub mod types;
pub mod vertical;
pub mod world;

// Re-export Rapier so hosts can build worlds without depending on `rapier3d` directly.
pub use rapier3d;

pub use bitmask_flags::{MoverFlag, MoverFlags};
pub use collaborators::{DisplacementResolver, GroundProbe};
pub use contacts::ContactBuffer;
pub use controller::{ControllerBuilder, FrameInput, LocomotionController, StepReport};
pub use error::{LocomotionError, Result};
pub use gravity::{
    GravityOrientation, GravityProfile, GravityProfileSet, OrientationStatus, ReorientationEvent,
};
pub use platform::PlatformDisplacement;
pub use settings::ControllerSettings;
pub use state::LocomotionState;
pub use types::{
    CharacterPose, GroundInfo, MoveContact, MovingPlatform, Quat, Surface, SurfaceId, SurfaceKind,
    UnitVec3, Vec3,
};
pub use vertical::ground_clamp_speed;
pub use world::{
    CapsuleSpec, ColliderShapeDef, PlatformMotion, RapierGroundProbe, RapierMover, RapierWorld,
    SharedWorld, SurfaceDef,
};
