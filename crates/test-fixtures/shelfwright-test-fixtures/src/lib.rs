//! Shared fixtures for shelfwright tests and benches.
//!
//! `fixtures/manifest.json` names every fixture:
//!
//! ```json
//! {
//!   "catalogs": { "shop-mixed": "catalogs/shop_mixed.json" },
//!   "stages": {
//!     "shop-minimal-empty": { "stage": "stages/shop_minimal_empty.json",
//!                             "asset": "assets/Shop Minimal Empty.usda" }
//!   }
//! }
//! ```
//!
//! Catalog entries map straight to a file. Stage entries carry a `MemoryStage`
//! snapshot and, for base fixtures, the asset path a context registers it under.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .expect("fixtures/manifest.json is valid")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    catalogs: HashMap<String, String>,
    stages: HashMap<String, StageEntry>,
}

#[derive(Debug, Deserialize)]
struct StageEntry {
    stage: String,
    #[serde(default)]
    asset: Option<String>,
}

fn fixture_path(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../../fixtures")
        .join(rel)
}

fn read_fixture(rel: &str) -> Result<String> {
    let path = fixture_path(rel);
    fs::read_to_string(&path).with_context(|| format!("reading fixture {}", path.display()))
}

fn parse_fixture<T: DeserializeOwned>(rel: &str) -> Result<T> {
    serde_json::from_str(&read_fixture(rel)?).with_context(|| format!("parsing fixture {rel}"))
}

fn named<'a, T>(section: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    section
        .get(name)
        .ok_or_else(|| anyhow!("no {kind} fixture named '{name}'"))
}

/// Product catalogs, as raw JSON or decoded into any serde type.
pub mod catalogs {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.catalogs.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = named(&MANIFEST.catalogs, "catalog", name)?;
        read_fixture(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = named(&MANIFEST.catalogs, "catalog", name)?;
        super::parse_fixture(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = named(&MANIFEST.catalogs, "catalog", name)?;
        Ok(fixture_path(rel))
    }
}

/// `MemoryStage` snapshots: base fixtures and scenes that start out active.
pub mod stages {
    use super::*;

    pub fn keys() -> Vec<String> {
        MANIFEST.stages.keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = named(&MANIFEST.stages, "stage", name)?;
        read_fixture(&entry.stage)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = named(&MANIFEST.stages, "stage", name)?;
        super::parse_fixture(&entry.stage)
    }

    /// Asset path for base fixtures; `None` for scenes used directly.
    pub fn asset(name: &str) -> Result<Option<String>> {
        let entry = named(&MANIFEST.stages, "stage", name)?;
        Ok(entry.asset.clone())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = named(&MANIFEST.stages, "stage", name)?;
        Ok(fixture_path(&entry.stage))
    }
}
