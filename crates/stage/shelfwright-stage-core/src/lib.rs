//! shelfwright-stage-core: the scene-graph surface the placer authors against.
//!
//! The placer never talks to a concrete scene runtime directly. It authors
//! through [`SceneStage`] and obtains stages through [`StageContext`]; hosts
//! adapt their runtime to these traits. [`MemoryStage`] and [`MemoryContext`]
//! are a complete in-process implementation used by tests and benches.

pub mod asset;
pub mod error;
pub mod memory;
pub mod prim_path;
pub mod stage;
pub mod xform_op;

pub use asset::AssetRef;
pub use error::StageError;
pub use memory::{MemoryContext, MemoryStage, Prim};
pub use prim_path::PrimPath;
pub use stage::{PrimKind, SceneStage, StageContext};
pub use xform_op::{Quatf, XformOp, XformOpKind};
