/// Allowed time (seconds) before the character is set to ungrounded from the last time it was
/// safely grounded.
pub const TIME_BEFORE_UNGROUNDED: f32 = 0.1;

/// Terminal fall speed along the up axis (meters per second, negative = falling).
pub const MIN_VERTICAL_SPEED: f32 = -12.0;

/// A frame only extends the grounded window while the vertical speed stays below this value.
///
/// This keeps the rising part of a jump from re-latching onto the floor it just left.
pub const SAFE_GROUND_VERTICAL_SPEED: f32 = 0.1;

/// Contacts whose normal has a dot product with up below this value count as a ceiling hit.
pub const CEILING_DOT_THRESHOLD: f32 = -0.7;

/// Vertical speed multiplier applied on a ceiling hit (dampens and inverts).
pub const CEILING_BOUNCE_FACTOR: f32 = -0.25;

/// Number of move contacts kept per frame. Extra contacts reported by the resolver are dropped.
pub const MAX_MOVE_CONTACTS: usize = 10;

/// Default walking speed in meters per second.
pub const DEFAULT_MOVE_SPEED: f32 = 5.0;

/// Default jump impulse along up (meters per second).
pub const DEFAULT_JUMP_SPEED: f32 = 8.0;

/// Default gravity along up (meters per second squared, negative = pulls down).
pub const DEFAULT_GRAVITY: f32 = -25.0;

/// Default duration of a gravity reorientation (seconds).
pub const DEFAULT_REORIENTATION_DURATION: f32 = 0.5;

/// Name of the profile matching world up (+Y).
pub const DEFAULT_PROFILE: &str = "default";

/// Name of the profile with up flipped to -Y.
pub const INVERTED_PROFILE: &str = "inverted";

/// Squared length below which a direction is considered degenerate.
pub const DIR_EPS_SQ: f32 = 1.0e-8;
