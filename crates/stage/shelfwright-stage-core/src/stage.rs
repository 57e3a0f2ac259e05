//! Collaborator traits implemented by scene runtimes.

use serde::{Deserialize, Serialize};

use crate::{AssetRef, PrimPath, StageError, XformOp, XformOpKind};

/// Schema type of a defined prim.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimKind {
    /// Typeless `def`; the kind given to implicitly created ancestors.
    #[default]
    Untyped,
    /// Transformable group.
    Xform,
    /// Non-transformable organizational container.
    Scope,
}

/// Authoring surface of one open scene.
///
/// Every mutating call on a path that does not hold a prim fails with
/// [`StageError::PrimNotFound`]. Calls are synchronous and assume exclusive access.
pub trait SceneStage {
    fn prim_exists(&self, path: &PrimPath) -> bool;

    fn prim_kind(&self, path: &PrimPath) -> Option<PrimKind>;

    /// Get-or-create. Missing ancestors are created [`PrimKind::Untyped`]; an
    /// existing prim is returned untouched and keeps its kind.
    fn define_prim(&mut self, path: &PrimPath, kind: PrimKind) -> Result<(), StageError>;

    fn clear_references(&mut self, path: &PrimPath) -> Result<(), StageError>;

    fn add_reference(&mut self, path: &PrimPath, target: AssetRef) -> Result<(), StageError>;

    fn references(&self, path: &PrimPath) -> Result<Vec<AssetRef>, StageError>;

    fn clear_payloads(&mut self, path: &PrimPath) -> Result<(), StageError>;

    fn add_payload(&mut self, path: &PrimPath, target: AssetRef) -> Result<(), StageError>;

    fn payloads(&self, path: &PrimPath) -> Result<Vec<AssetRef>, StageError>;

    /// Drop every authored op and the op order.
    fn clear_xform_ops(&mut self, path: &PrimPath) -> Result<(), StageError>;

    /// Author one op. A prim carries at most one op per [`XformOpKind`].
    fn add_xform_op(&mut self, path: &PrimPath, op: XformOp) -> Result<(), StageError>;

    fn set_xform_op_order(
        &mut self,
        path: &PrimPath,
        order: &[XformOpKind],
    ) -> Result<(), StageError>;

    fn xform_ops(&self, path: &PrimPath) -> Result<Vec<XformOp>, StageError>;

    fn xform_op_order(&self, path: &PrimPath) -> Result<Vec<XformOpKind>, StageError>;

    fn set_reset_xform_stack(&mut self, path: &PrimPath, reset: bool) -> Result<(), StageError>;

    fn reset_xform_stack(&self, path: &PrimPath) -> Result<bool, StageError>;
}

/// Host-side session that owns the active scene and can replace it.
pub trait StageContext {
    /// The currently active scene, if any.
    fn stage_mut(&mut self) -> Option<&mut dyn SceneStage>;

    /// Load `asset` as the new active scene. Returns false if it cannot be opened.
    fn open_stage(&mut self, asset: &str) -> bool;
}
