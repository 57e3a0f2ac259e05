//! Base fixture attachment and the optional anchor world transform.

use log::{error, info};

use shelfwright_stage::{
    AssetRef, PrimKind, PrimPath, SceneStage, StageContext, XformOp, XformOpKind,
};

use crate::compose::author_op_stack;
use crate::config::{PlacerConfig, TargetMode, WorldTransform, WorldTransformMode};
use crate::error::{PlacerError, Result};

/// Bring the base fixture into the scene according to `config.target_mode` and
/// return the stage the rest of the pipeline authors into.
pub fn attach_base<'a>(
    ctx: &'a mut dyn StageContext,
    config: &PlacerConfig,
) -> Result<&'a mut dyn SceneStage> {
    match config.target_mode {
        TargetMode::AttachIntoCurrent => {
            let Some(stage) = ctx.stage_mut() else {
                error!("no active scene to attach {} into", config.base_fixture);
                return Err(PlacerError::NoActiveScene);
            };
            let anchor = config.anchor_path()?;
            let target = AssetRef::with_prim(config.base_fixture.clone(), config.fixture_prim_path()?);
            reference_fixture(stage, &anchor, target)?;
            Ok(stage)
        }
        TargetMode::OpenNewScene => open_fixture(ctx, &config.base_fixture),
    }
}

/// Make `anchor` hold exactly one reference, to `target`. The anchor is created
/// as an xform if missing.
pub fn reference_fixture(
    stage: &mut dyn SceneStage,
    anchor: &PrimPath,
    target: AssetRef,
) -> Result<()> {
    if !stage.prim_exists(anchor) {
        stage.define_prim(anchor, PrimKind::Xform)?;
    }
    stage.clear_references(anchor)?;
    info!("referencing {} at {}", target, anchor);
    stage.add_reference(anchor, target)?;
    Ok(())
}

/// Replace the active scene with the fixture asset.
pub fn open_fixture<'a>(
    ctx: &'a mut dyn StageContext,
    asset: &str,
) -> Result<&'a mut dyn SceneStage> {
    if !ctx.open_stage(asset) {
        error!("failed to open base fixture {asset}");
        return Err(PlacerError::SceneLoadFailed {
            asset: asset.to_string(),
        });
    }
    info!("opened base fixture {asset} as a new scene");
    ctx.stage_mut().ok_or_else(|| PlacerError::SceneLoadFailed {
        asset: asset.to_string(),
    })
}

/// Author one translate and one rotateZYX op on `anchor`, replacing whatever ops
/// it held. `Override` marks the anchor's own ops as authoritative for its world
/// pose; `Additive` clears that mark so inherited transforms compose again.
/// Ops inside the referenced fixture below the anchor are left alone.
pub fn apply_world_transform(
    stage: &mut dyn SceneStage,
    anchor: &PrimPath,
    transform: &WorldTransform,
) -> Result<Vec<XformOpKind>> {
    if !stage.prim_exists(anchor) {
        error!("cannot apply world transform: {} does not exist", anchor);
        return Err(PlacerError::AnchorMissing(anchor.clone()));
    }

    let reset = transform.mode == WorldTransformMode::Override;
    stage.set_reset_xform_stack(anchor, reset)?;

    let order = author_op_stack(
        stage,
        anchor,
        vec![
            XformOp::Translate(transform.translate),
            XformOp::RotateZyx(transform.rotate_zyx_deg),
        ],
    )?;
    info!(
        "applied {:?} world transform on {}: T={:?} R_zyx_deg={:?}",
        transform.mode, anchor, transform.translate, transform.rotate_zyx_deg
    );
    Ok(order)
}
