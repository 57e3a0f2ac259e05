//! shelfwright-placer
//!
//! Populates a shelf fixture from a product catalog. A run references the base
//! fixture at a fixed anchor, grows `anchor/shelf/category` scopes, randomizes the
//! rotation of a few products and places every product as a payload with its own
//! transform stack. Reruns against the same scene converge instead of piling up
//! references, groups or ops.
//!
//! ```no_run
//! use shelfwright_placer::{Catalog, PlacerConfig, ShopPlacer};
//! use shelfwright_stage::{MemoryContext, MemoryStage};
//!
//! let catalog = Catalog::from_json_str(r#"{
//!     "A": { "category": "Snacks", "asset": "chips.usd",
//!            "translate": [1, 0, 0], "scale": [1, 1, 1] }
//! }"#).unwrap();
//! let mut ctx = MemoryContext::with_stage(MemoryStage::new());
//! let report = ShopPlacer::seeded(PlacerConfig::default(), 7).run(&mut ctx, &catalog);
//! assert!(report.success);
//! ```

pub mod attach;
pub mod catalog;
pub mod compose;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod placer;
pub mod report;
pub mod variation;

pub use crate::catalog::{Catalog, CatalogEntry, Rotation};
pub use crate::config::{PlacerConfig, TargetMode, WorldTransform, WorldTransformMode};
pub use crate::error::PlacerError;
pub use crate::placer::{place_entity, ShopPlacer};
pub use crate::report::{EntityOutcome, EntityStatus, PipelineStage, PlacementReport, StageFailure};
pub use crate::variation::{vary, Variation};
