//! Run configuration for the placement pipeline.

use serde::{Deserialize, Serialize};

use shelfwright_stage::PrimPath;

use crate::error::{PlacerError, Result};

pub const DEFAULT_BASE_FIXTURE: &str = "assets/Shop Minimal Empty.usda";
pub const DEFAULT_SHELF_PATH: &str = "/World/Shelf";

/// How the base fixture enters the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetMode {
    /// Reference the fixture prim into the active scene at the anchor.
    #[default]
    AttachIntoCurrent,
    /// Replace the active scene with the fixture asset itself.
    OpenNewScene,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorldTransformMode {
    /// Compose on top of whatever the anchor inherits.
    #[default]
    Additive,
    /// The anchor's own ops are the sole source of its transform.
    Override,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTransform {
    pub mode: WorldTransformMode,
    pub translate: [f64; 3],
    /// Degrees, `[x, y, z]`, authored as a single rotateZYX op.
    pub rotate_zyx_deg: [f32; 3],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacerConfig {
    pub target_mode: TargetMode,
    /// Asset path of the base fixture layer.
    pub base_fixture: String,
    /// Prim inside the base fixture that gets referenced.
    pub fixture_prim: String,
    /// Prim the fixture attaches to and the product hierarchy grows under.
    pub anchor: String,
    pub apply_world_transform: bool,
    pub world_transform: WorldTransform,
    /// How many catalog entries get a random rotation per run.
    pub variation_count: usize,
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            target_mode: TargetMode::default(),
            base_fixture: DEFAULT_BASE_FIXTURE.to_string(),
            fixture_prim: DEFAULT_SHELF_PATH.to_string(),
            anchor: DEFAULT_SHELF_PATH.to_string(),
            apply_world_transform: false,
            world_transform: WorldTransform::default(),
            variation_count: 3,
        }
    }
}

impl PlacerConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| PlacerError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.anchor_path()?;
        self.fixture_prim_path()?;
        if self.base_fixture.trim().is_empty() {
            return Err(PlacerError::Config("base_fixture is empty".into()));
        }
        Ok(())
    }

    pub fn anchor_path(&self) -> Result<PrimPath> {
        parse_non_root("anchor", &self.anchor)
    }

    pub fn fixture_prim_path(&self) -> Result<PrimPath> {
        parse_non_root("fixture_prim", &self.fixture_prim)
    }
}

fn parse_non_root(field: &str, raw: &str) -> Result<PrimPath> {
    let path = PrimPath::parse(raw).map_err(|e| PlacerError::Config(format!("{field}: {e}")))?;
    if path.is_root() {
        return Err(PlacerError::Config(format!(
            "{field}: the pseudo-root cannot be used"
        )));
    }
    Ok(path)
}
