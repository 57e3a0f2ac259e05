//! Transform composition for a single prim.
//!
//! Every call replaces the prim's op stack wholesale, so running it again with
//! the same inputs leaves the prim exactly as one run would.

use log::debug;

use shelfwright_stage::{PrimPath, SceneStage, XformOp, XformOpKind};

use crate::catalog::Rotation;
use crate::error::{PlacerError, Result};

/// Replace the op stack on `path` with `ops`, in the given order.
pub fn author_op_stack(
    stage: &mut dyn SceneStage,
    path: &PrimPath,
    ops: Vec<XformOp>,
) -> Result<Vec<XformOpKind>> {
    stage.clear_xform_ops(path)?;
    let order: Vec<XformOpKind> = ops.iter().map(XformOp::kind).collect();
    for op in ops {
        stage.add_xform_op(path, op)?;
    }
    stage.set_xform_op_order(path, &order)?;
    Ok(order)
}

/// Author `[translate, rotation?, scale]` on `path`.
///
/// Euler rotations become a rotateZYX op; quaternions become an orient op
/// carrying the four numbers exactly as given. Fails with
/// [`PlacerError::MissingRequiredField`] before touching the stage if translate
/// or scale is absent.
pub fn compose(
    stage: &mut dyn SceneStage,
    path: &PrimPath,
    translate: Option<[f64; 3]>,
    scale: Option<[f32; 3]>,
    rotation: Option<Rotation>,
) -> Result<Vec<XformOpKind>> {
    let translate = translate.ok_or_else(|| missing(path, "translate"))?;
    let scale = scale.ok_or_else(|| missing(path, "scale"))?;

    let mut ops = Vec::with_capacity(3);
    ops.push(XformOp::Translate(translate));
    match rotation {
        Some(Rotation::Euler(r)) => ops.push(XformOp::RotateZyx(r)),
        Some(Rotation::Orient(q)) => ops.push(XformOp::Orient(q)),
        None => {}
    }
    ops.push(XformOp::Scale(scale));

    let order = author_op_stack(stage, path, ops)?;
    debug!("composed {} ops on {}", order.len(), path);
    Ok(order)
}

fn missing(path: &PrimPath, field: &'static str) -> PlacerError {
    PlacerError::MissingRequiredField {
        entry: path.name().unwrap_or("/").to_string(),
        field,
    }
}
