//! In-memory scene stage and context.
//!
//! `MemoryStage` keeps prims in a `BTreeMap` keyed by path so that snapshots
//! serialize deterministically; two stages compare equal exactly when they hold
//! the same prims with the same authored opinions.

use log::debug;
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    AssetRef, PrimKind, PrimPath, SceneStage, StageContext, StageError, XformOp, XformOpKind,
};

fn is_false(v: &bool) -> bool {
    !*v
}

/// Authored state of a single prim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prim {
    #[serde(default)]
    pub kind: PrimKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<AssetRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payloads: Vec<AssetRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub xform_ops: Vec<XformOp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub xform_op_order: Vec<XformOpKind>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub reset_xform_stack: bool,
}

impl Prim {
    pub fn new(kind: PrimKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Authored op of the given kind, if any.
    pub fn op(&self, kind: XformOpKind) -> Option<&XformOp> {
        self.xform_ops.iter().find(|op| op.kind() == kind)
    }

    /// Local transform: ops multiplied left-to-right in op order.
    /// Authored ops absent from the order do not contribute.
    pub fn local_transform(&self) -> Matrix4<f64> {
        self.xform_op_order
            .iter()
            .filter_map(|kind| self.op(*kind))
            .fold(Matrix4::identity(), |m, op| m * op.to_matrix())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStage {
    #[serde(default)]
    prims: BTreeMap<PrimPath, Prim>,
}

impl MemoryStage {
    /// Create a new empty stage.
    pub fn new() -> Self {
        Self {
            prims: BTreeMap::new(),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn prim(&self, path: &PrimPath) -> Option<&Prim> {
        self.prims.get(path)
    }

    pub fn len(&self) -> usize {
        self.prims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prims.is_empty()
    }

    /// Iterate over all prims in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&PrimPath, &Prim)> {
        self.prims.iter()
    }

    /// Direct children of `path`.
    pub fn children<'a>(&'a self, path: &'a PrimPath) -> impl Iterator<Item = &'a PrimPath> + 'a {
        self.prims
            .keys()
            .filter(move |p| p.depth() == path.depth() + 1 && p.has_prefix(path))
    }

    pub fn local_transform(&self, path: &PrimPath) -> Result<Matrix4<f64>, StageError> {
        Ok(self.prim_ref(path)?.local_transform())
    }

    /// Local-to-world transform. Accumulation walks upward and stops at the first
    /// prim that resets the transform stack; that prim's own ops still apply.
    pub fn world_transform(&self, path: &PrimPath) -> Result<Matrix4<f64>, StageError> {
        let prim = self.prim_ref(path)?;
        let mut m = prim.local_transform();
        if prim.reset_xform_stack {
            return Ok(m);
        }
        let mut cursor = path.parent();
        while let Some(p) = cursor {
            if let Some(ancestor) = self.prims.get(&p) {
                m = ancestor.local_transform() * m;
                if ancestor.reset_xform_stack {
                    break;
                }
            }
            cursor = p.parent();
        }
        Ok(m)
    }

    fn prim_ref(&self, path: &PrimPath) -> Result<&Prim, StageError> {
        self.prims
            .get(path)
            .ok_or_else(|| StageError::PrimNotFound(path.clone()))
    }

    fn prim_mut(&mut self, path: &PrimPath) -> Result<&mut Prim, StageError> {
        self.prims
            .get_mut(path)
            .ok_or_else(|| StageError::PrimNotFound(path.clone()))
    }
}

impl SceneStage for MemoryStage {
    fn prim_exists(&self, path: &PrimPath) -> bool {
        self.prims.contains_key(path)
    }

    fn prim_kind(&self, path: &PrimPath) -> Option<PrimKind> {
        self.prims.get(path).map(|p| p.kind)
    }

    fn define_prim(&mut self, path: &PrimPath, kind: PrimKind) -> Result<(), StageError> {
        if path.is_root() {
            return Err(StageError::InvalidPath {
                path: path.to_string(),
                reason: "cannot define the pseudo-root".to_string(),
            });
        }
        if self.prims.contains_key(path) {
            return Ok(());
        }
        for ancestor in path.ancestors() {
            self.prims
                .entry(ancestor)
                .or_insert_with(|| Prim::new(PrimKind::Untyped));
        }
        debug!("define {:?} prim at {}", kind, path);
        self.prims.insert(path.clone(), Prim::new(kind));
        Ok(())
    }

    fn clear_references(&mut self, path: &PrimPath) -> Result<(), StageError> {
        self.prim_mut(path)?.references.clear();
        Ok(())
    }

    fn add_reference(&mut self, path: &PrimPath, target: AssetRef) -> Result<(), StageError> {
        self.prim_mut(path)?.references.push(target);
        Ok(())
    }

    fn references(&self, path: &PrimPath) -> Result<Vec<AssetRef>, StageError> {
        Ok(self.prim_ref(path)?.references.clone())
    }

    fn clear_payloads(&mut self, path: &PrimPath) -> Result<(), StageError> {
        self.prim_mut(path)?.payloads.clear();
        Ok(())
    }

    fn add_payload(&mut self, path: &PrimPath, target: AssetRef) -> Result<(), StageError> {
        self.prim_mut(path)?.payloads.push(target);
        Ok(())
    }

    fn payloads(&self, path: &PrimPath) -> Result<Vec<AssetRef>, StageError> {
        Ok(self.prim_ref(path)?.payloads.clone())
    }

    fn clear_xform_ops(&mut self, path: &PrimPath) -> Result<(), StageError> {
        let prim = self.prim_mut(path)?;
        prim.xform_ops.clear();
        prim.xform_op_order.clear();
        Ok(())
    }

    fn add_xform_op(&mut self, path: &PrimPath, op: XformOp) -> Result<(), StageError> {
        let prim = self.prim_mut(path)?;
        let kind = op.kind();
        if prim.op(kind).is_some() {
            return Err(StageError::DuplicateXformOp {
                path: path.clone(),
                op: kind,
            });
        }
        prim.xform_ops.push(op);
        Ok(())
    }

    fn set_xform_op_order(
        &mut self,
        path: &PrimPath,
        order: &[XformOpKind],
    ) -> Result<(), StageError> {
        let prim = self.prim_mut(path)?;
        if let Some(missing) = order.iter().find(|k| prim.op(**k).is_none()) {
            return Err(StageError::UnknownXformOp {
                path: path.clone(),
                op: *missing,
            });
        }
        prim.xform_op_order = order.to_vec();
        Ok(())
    }

    fn xform_ops(&self, path: &PrimPath) -> Result<Vec<XformOp>, StageError> {
        Ok(self.prim_ref(path)?.xform_ops.clone())
    }

    fn xform_op_order(&self, path: &PrimPath) -> Result<Vec<XformOpKind>, StageError> {
        Ok(self.prim_ref(path)?.xform_op_order.clone())
    }

    fn set_reset_xform_stack(&mut self, path: &PrimPath, reset: bool) -> Result<(), StageError> {
        self.prim_mut(path)?.reset_xform_stack = reset;
        Ok(())
    }

    fn reset_xform_stack(&self, path: &PrimPath) -> Result<bool, StageError> {
        Ok(self.prim_ref(path)?.reset_xform_stack)
    }
}

/// Session holding an optional active stage and a library of loadable assets.
#[derive(Debug, Default)]
pub struct MemoryContext {
    active: Option<MemoryStage>,
    library: hashbrown::HashMap<String, MemoryStage>,
}

impl MemoryContext {
    /// A context with no active stage.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context whose active stage is `stage`.
    pub fn with_stage(stage: MemoryStage) -> Self {
        Self {
            active: Some(stage),
            library: hashbrown::HashMap::new(),
        }
    }

    /// Make `stage` loadable through [`StageContext::open_stage`] under `asset`.
    pub fn register_asset(&mut self, asset: impl Into<String>, stage: MemoryStage) {
        self.library.insert(asset.into(), stage);
    }

    pub fn active(&self) -> Option<&MemoryStage> {
        self.active.as_ref()
    }
}

impl StageContext for MemoryContext {
    fn stage_mut(&mut self) -> Option<&mut dyn SceneStage> {
        self.active.as_mut().map(|s| s as &mut dyn SceneStage)
    }

    fn open_stage(&mut self, asset: &str) -> bool {
        match self.library.get(asset) {
            Some(stage) => {
                debug!("open stage {asset} ({} prims)", stage.len());
                self.active = Some(stage.clone());
                true
            }
            None => false,
        }
    }
}
