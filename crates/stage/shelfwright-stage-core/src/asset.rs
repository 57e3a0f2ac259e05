use serde::{Deserialize, Serialize};
use std::fmt;

use crate::PrimPath;

/// Target of a reference or payload arc: an external asset and, optionally,
/// the prim inside it to graft. `None` means the asset's default prim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef {
    pub asset_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prim_path: Option<PrimPath>,
}

impl AssetRef {
    pub fn new(asset_path: impl Into<String>) -> Self {
        Self {
            asset_path: asset_path.into(),
            prim_path: None,
        }
    }

    pub fn with_prim(asset_path: impl Into<String>, prim_path: PrimPath) -> Self {
        Self {
            asset_path: asset_path.into(),
            prim_path: Some(prim_path),
        }
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prim_path {
            Some(p) => write!(f, "@{}@<{}>", self.asset_path, p),
            None => write!(f, "@{}@", self.asset_path),
        }
    }
}
