//! Product catalog model.
//!
//! JSON shape (one record per product id, document order preserved):
//!
//! ```json
//! { "A": { "shelf": "Items_Lower", "category": "Snacks", "asset": "chips.usd",
//!          "translate": [1, 0, 0], "scale": [1, 1, 1], "rotate": [0, 90, 0] } }
//! ```
//!
//! `asset`, `translate` and `scale` are required for placement but optional for
//! loading. Fields are decoded one at a time: a missing or malformed field is
//! recorded on its entry and fails only that entry's placement. Only a document
//! that is not an object of records is rejected at load time.

use indexmap::IndexMap;
use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use shelfwright_stage::Quatf;

use crate::error::{PlacerError, Result};

pub const DEFAULT_SHELF: &str = "Items_Lower";
pub const DEFAULT_CATEGORY: &str = "Unknown";

/// Rotation of a product. Only one representation is ever active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rotation {
    /// Degrees `[x, y, z]`, applied about Z, then Y, then X.
    Euler([f32; 3]),
    Orient(Quatf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "RawEntry")]
pub struct CatalogEntry {
    pub shelf: String,
    pub category: String,
    pub asset: Option<String>,
    pub translate: Option<[f64; 3]>,
    pub scale: Option<[f32; 3]>,
    pub rotation: Option<Rotation>,
    /// Fields present in the source record whose value could not be decoded.
    /// `"record"` when the record itself is not an object.
    pub invalid_fields: Vec<&'static str>,
}

impl CatalogEntry {
    /// An entry with every required field filled in and default grouping.
    pub fn new(asset: impl Into<String>, translate: [f64; 3], scale: [f32; 3]) -> Self {
        Self {
            asset: Some(asset.into()),
            translate: Some(translate),
            scale: Some(scale),
            ..Self::default()
        }
    }

    pub fn with_group(mut self, shelf: impl Into<String>, category: impl Into<String>) -> Self {
        self.shelf = shelf.into();
        self.category = category.into();
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Replace the rotation, discarding any malformed rotation fields it supersedes.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = Some(rotation);
        self.invalid_fields
            .retain(|field| !matches!(*field, "rotate" | "orient"));
    }
}

impl Default for CatalogEntry {
    fn default() -> Self {
        Self {
            shelf: DEFAULT_SHELF.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            asset: None,
            translate: None,
            scale: None,
            rotation: None,
            invalid_fields: Vec::new(),
        }
    }
}

/// Take `name` out of `record` and decode it. Absent and `null` are both missing;
/// an undecodable value is noted in `invalid`.
fn take_field<T: DeserializeOwned>(
    record: &mut Map<String, Value>,
    name: &'static str,
    invalid: &mut Vec<&'static str>,
) -> Option<T> {
    match record.remove(name) {
        None | Some(Value::Null) => None,
        Some(raw) => match serde_json::from_value(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!("catalog field '{name}' rejected: {err}");
                invalid.push(name);
                None
            }
        },
    }
}

impl From<Value> for CatalogEntry {
    fn from(value: Value) -> Self {
        let mut entry = Self::default();
        let Value::Object(mut record) = value else {
            entry.invalid_fields.push("record");
            return entry;
        };
        let invalid = &mut entry.invalid_fields;

        if let Some(shelf) = take_field(&mut record, "shelf", invalid) {
            entry.shelf = shelf;
        }
        if let Some(category) = take_field(&mut record, "category", invalid) {
            entry.category = category;
        }
        entry.asset = take_field(&mut record, "asset", invalid);
        entry.translate = take_field(&mut record, "translate", invalid);
        entry.scale = take_field(&mut record, "scale", invalid);

        // rotate wins when a record carries both
        let rotate: Option<[f32; 3]> = take_field(&mut record, "rotate", invalid);
        let orient: Option<[f32; 4]> = take_field(&mut record, "orient", invalid);
        entry.rotation = match (rotate, orient) {
            (Some(r), _) => Some(Rotation::Euler(r)),
            (None, Some(q)) => Some(Rotation::Orient(Quatf::from_wxyz(q))),
            (None, None) => None,
        };
        entry
    }
}

/// Wire form of a catalog record.
#[derive(Debug, Clone, Serialize)]
struct RawEntry {
    shelf: String,
    category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    asset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    translate: Option<[f64; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scale: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rotate: Option<[f32; 3]>,
    /// `[real, i, j, k]`
    #[serde(skip_serializing_if = "Option::is_none")]
    orient: Option<[f32; 4]>,
}

impl From<CatalogEntry> for RawEntry {
    fn from(entry: CatalogEntry) -> Self {
        let (rotate, orient) = match entry.rotation {
            Some(Rotation::Euler(r)) => (Some(r), None),
            Some(Rotation::Orient(q)) => (None, Some(q.to_wxyz())),
            None => (None, None),
        };
        Self {
            shelf: entry.shelf,
            category: entry.category,
            asset: entry.asset,
            translate: entry.translate,
            scale: entry.scale,
            rotate,
            orient,
        }
    }
}

/// Product id -> record, in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: IndexMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| PlacerError::Catalog(e.to_string()))
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| PlacerError::Catalog(e.to_string()))
    }

    pub fn insert(&mut self, id: impl Into<String>, entry: CatalogEntry) -> Option<CatalogEntry> {
        self.entries.insert(id.into(), entry)
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut CatalogEntry> {
        self.entries.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entry at a position in document order.
    pub fn get_index(&self, index: usize) -> Option<(&str, &CatalogEntry)> {
        self.entries.get_index(index).map(|(k, v)| (k.as_str(), v))
    }

    /// Distinct shelf levels mapped to the categories that appear on them.
    pub fn group_pairs(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut groups: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for entry in self.entries.values() {
            groups
                .entry(entry.shelf.as_str())
                .or_default()
                .insert(entry.category.as_str());
        }
        groups
    }
}

impl FromIterator<(String, CatalogEntry)> for Catalog {
    fn from_iter<T: IntoIterator<Item = (String, CatalogEntry)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
