use thiserror::Error;

/// Errors raised while wiring or configuring a locomotion controller.
///
/// Stepping a built controller never fails; everything here surfaces at construction or
/// configuration time.
#[derive(Debug, Error)]
pub enum LocomotionError {
    #[error("missing collaborator: {0} must be wired before the first step")]
    MissingCollaborator(&'static str),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("up axis must have a non-zero length")]
    DegenerateUpAxis,

    #[error("unknown gravity profile `{0}`")]
    UnknownGravityProfile(String),

    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LocomotionError>;
