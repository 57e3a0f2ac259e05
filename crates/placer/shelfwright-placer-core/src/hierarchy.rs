//! Shelf-level / category grouping prims under the anchor.

use log::{debug, info};

use shelfwright_stage::{PrimKind, PrimPath, SceneStage};

use crate::catalog::Catalog;
use crate::error::{PlacerError, Result};

/// Path of the group holding products of one (shelf, category) pair.
pub fn group_path(anchor: &PrimPath, shelf: &str, category: &str) -> Result<PrimPath> {
    Ok(anchor.join([shelf, category])?)
}

/// Path of a placed product.
pub fn product_path(anchor: &PrimPath, shelf: &str, category: &str, id: &str) -> Result<PrimPath> {
    Ok(anchor.join([shelf, category, id])?)
}

/// Ensure `anchor/shelf` and `anchor/shelf/category` exist as scopes for every
/// pair in the catalog. Existing prims are reused as-is.
///
/// Returns the category group paths, sorted.
pub fn build(
    stage: &mut dyn SceneStage,
    anchor: &PrimPath,
    catalog: &Catalog,
) -> Result<Vec<PrimPath>> {
    if !stage.prim_exists(anchor) {
        return Err(PlacerError::AnchorMissing(anchor.clone()));
    }

    let mut groups = Vec::new();
    for (shelf, categories) in catalog.group_pairs() {
        let shelf_path = anchor.child(shelf)?;
        stage.define_prim(&shelf_path, PrimKind::Scope)?;
        for category in categories {
            let category_path = group_path(anchor, shelf, category)?;
            stage.define_prim(&category_path, PrimKind::Scope)?;
            debug!("group ready at {}", category_path);
            groups.push(category_path);
        }
    }

    info!("product hierarchy ready under {} ({} groups)", anchor, groups.len());
    Ok(groups)
}
