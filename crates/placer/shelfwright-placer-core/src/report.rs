use serde::{Deserialize, Serialize};
use std::fmt;

use shelfwright_stage::PrimPath;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    AttachBase,
    WorldTransform,
    BuildHierarchy,
    VaryEntries,
    PlaceEntities,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::AttachBase => "attach base",
            PipelineStage::WorldTransform => "world transform",
            PipelineStage::BuildHierarchy => "build hierarchy",
            PipelineStage::VaryEntries => "vary entries",
            PipelineStage::PlaceEntities => "place entities",
        };
        f.write_str(name)
    }
}

/// A fatal failure and the stage that raised it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: PipelineStage,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntityStatus {
    Placed { path: PrimPath },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityOutcome {
    pub id: String,
    #[serde(flatten)]
    pub status: EntityStatus,
}

impl EntityOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self.status, EntityStatus::Placed { .. })
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlacementReport {
    /// True when every stage completed and at least one entity was placed.
    pub success: bool,
    pub placed: usize,
    pub attempted: usize,
    pub completed_stages: Vec<PipelineStage>,
    /// Ids whose rotation was randomized this run.
    pub varied: Vec<String>,
    pub failure: Option<StageFailure>,
    /// One outcome per attempted entity, in catalog order.
    pub entities: Vec<EntityOutcome>,
}

impl PlacementReport {
    pub fn failed_entities(&self) -> impl Iterator<Item = &EntityOutcome> {
        self.entities.iter().filter(|e| !e.is_placed())
    }

    pub fn outcome(&self, id: &str) -> Option<&EntityOutcome> {
        self.entities.iter().find(|e| e.id == id)
    }
}

impl fmt::Display for PlacementReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(failure) = &self.failure {
            return write!(f, "failed during {}: {}", failure.stage, failure.message);
        }
        write!(f, "Placed {}/{} products", self.placed, self.attempted)
    }
}
