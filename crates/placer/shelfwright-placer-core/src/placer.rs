//! The placement pipeline:
//!   attach base -> [world transform] -> build hierarchy -> vary entries -> place entities
//!
//! Stage failures stop the run and leave whatever was already authored in place;
//! every stage is idempotent, so a retried run converges to the same scene.

use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use shelfwright_stage::{AssetRef, PrimKind, PrimPath, SceneStage, StageContext};

use crate::attach::{apply_world_transform, attach_base};
use crate::catalog::{Catalog, CatalogEntry};
use crate::compose::compose;
use crate::config::PlacerConfig;
use crate::error::{PlacerError, Result};
use crate::hierarchy::{self, product_path};
use crate::report::{EntityOutcome, EntityStatus, PipelineStage, PlacementReport, StageFailure};
use crate::variation::vary;

/// Runs the placement pipeline. Owns its configuration and random source; holds
/// no scene state between runs.
#[derive(Debug)]
pub struct ShopPlacer<R = StdRng> {
    config: PlacerConfig,
    rng: R,
}

impl ShopPlacer<StdRng> {
    /// Placer with an entropy-seeded random source.
    pub fn new(config: PlacerConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Placer whose variations are reproducible for a given seed.
    pub fn seeded(config: PlacerConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ShopPlacer<R> {
    pub fn with_rng(config: PlacerConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &PlacerConfig {
        &self.config
    }

    /// Build or refresh the shelf layout for `catalog` in the scene held by `ctx`.
    pub fn run(&mut self, ctx: &mut dyn StageContext, catalog: &Catalog) -> PlacementReport {
        info!(
            "starting shop placement: {} entries, mode {:?}",
            catalog.len(),
            self.config.target_mode
        );
        let mut report = PlacementReport::default();

        if let Err((stage, err)) = self.run_stages(ctx, catalog, &mut report) {
            error!("placement failed during {stage}: {err}");
            report.failure = Some(StageFailure {
                stage,
                message: err.to_string(),
            });
        }

        report.success = report.failure.is_none() && report.placed > 0;
        if report.failure.is_none() {
            if report.success {
                info!("{report}");
            } else {
                warn!("{report}; nothing was placed");
            }
        }
        report
    }

    fn run_stages(
        &mut self,
        ctx: &mut dyn StageContext,
        catalog: &Catalog,
        report: &mut PlacementReport,
    ) -> std::result::Result<(), (PipelineStage, PlacerError)> {
        let anchor = self
            .config
            .anchor_path()
            .map_err(at(PipelineStage::AttachBase))?;

        let stage = attach_base(ctx, &self.config).map_err(at(PipelineStage::AttachBase))?;
        report.completed_stages.push(PipelineStage::AttachBase);

        if self.config.apply_world_transform {
            apply_world_transform(stage, &anchor, &self.config.world_transform)
                .map_err(at(PipelineStage::WorldTransform))?;
            report.completed_stages.push(PipelineStage::WorldTransform);
        }

        hierarchy::build(stage, &anchor, catalog).map_err(at(PipelineStage::BuildHierarchy))?;
        report.completed_stages.push(PipelineStage::BuildHierarchy);

        let variation = vary(catalog, self.config.variation_count, &mut self.rng);
        report.varied = variation.varied;
        report.completed_stages.push(PipelineStage::VaryEntries);

        for (id, entry) in variation.catalog.iter() {
            report.attempted += 1;
            let status = match place_entity(stage, &anchor, id, entry) {
                Ok(path) => {
                    report.placed += 1;
                    EntityStatus::Placed { path }
                }
                Err(err) => {
                    warn!("error placing {id}: {err}");
                    EntityStatus::Failed {
                        reason: err.to_string(),
                    }
                }
            };
            report.entities.push(EntityOutcome {
                id: id.to_string(),
                status,
            });
        }
        report.completed_stages.push(PipelineStage::PlaceEntities);

        Ok(())
    }
}

fn at(stage: PipelineStage) -> impl Fn(PlacerError) -> (PipelineStage, PlacerError) {
    move |err| (stage, err)
}

/// Author one product at `anchor/shelf/category/id`: a single payload to its
/// asset and a fresh op stack. Malformed and required fields are checked before
/// anything is authored.
pub fn place_entity(
    stage: &mut dyn SceneStage,
    anchor: &PrimPath,
    id: &str,
    entry: &CatalogEntry,
) -> Result<PrimPath> {
    if let Some(&field) = entry.invalid_fields.first() {
        return Err(PlacerError::InvalidField {
            entry: id.to_string(),
            field,
        });
    }
    let asset = entry
        .asset
        .as_deref()
        .ok_or_else(|| missing(id, "asset"))?;
    let translate = entry.translate.ok_or_else(|| missing(id, "translate"))?;
    let scale = entry.scale.ok_or_else(|| missing(id, "scale"))?;

    let path = product_path(anchor, &entry.shelf, &entry.category, id)?;
    stage.define_prim(&path, PrimKind::Untyped)?;
    stage.clear_payloads(&path)?;
    stage.add_payload(&path, AssetRef::new(asset))?;
    compose(stage, &path, Some(translate), Some(scale), entry.rotation)?;

    debug!("placed product {id} at {translate:?}");
    Ok(path)
}

fn missing(id: &str, field: &'static str) -> PlacerError {
    PlacerError::MissingRequiredField {
        entry: id.to_string(),
        field,
    }
}
