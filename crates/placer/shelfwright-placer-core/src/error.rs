use thiserror::Error;

use shelfwright_stage::{PrimPath, StageError};

/// Failures of the placement pipeline.
///
/// `MissingRequiredField` and `InvalidField` are entity-scoped: the orchestrator
/// records them and moves on. Every other variant raised by a stage aborts the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacerError {
    #[error("entry '{entry}' is missing required field '{field}'")]
    MissingRequiredField { entry: String, field: &'static str },
    #[error("entry '{entry}' has a malformed '{field}' field")]
    InvalidField { entry: String, field: &'static str },
    #[error("anchor prim {0} does not exist")]
    AnchorMissing(PrimPath),
    #[error("no active scene to attach the base fixture into")]
    NoActiveScene,
    #[error("failed to open base fixture '{asset}' as a new scene")]
    SceneLoadFailed { asset: String },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid catalog: {0}")]
    Catalog(String),
    #[error(transparent)]
    Stage(#[from] StageError),
}

pub type Result<T, E = PlacerError> = std::result::Result<T, E>;
