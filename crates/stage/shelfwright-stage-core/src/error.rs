use thiserror::Error;

use crate::{PrimPath, XformOpKind};

/// Errors raised by stage authoring calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    #[error("invalid prim path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
    #[error("prim not found: {0}")]
    PrimNotFound(PrimPath),
    #[error("prim {path} already has a {op} op; clear the op stack first")]
    DuplicateXformOp { path: PrimPath, op: XformOpKind },
    #[error("prim {path} has no authored {op} op to order")]
    UnknownXformOp { path: PrimPath, op: XformOpKind },
}
