//! Random rotation variation over a subset of catalog entries.

use log::info;
use rand::Rng;

use crate::catalog::{Catalog, Rotation};

pub const ANGLE_MIN_DEG: f32 = -180.0;
pub const ANGLE_MAX_DEG: f32 = 180.0;

/// Output of [`vary`]: the new catalog plus the ids that received a rotation,
/// in sampling order.
#[derive(Debug, Clone, PartialEq)]
pub struct Variation {
    pub catalog: Catalog,
    pub varied: Vec<String>,
}

/// Pick `min(count, len)` distinct entries uniformly without replacement and give
/// each a fresh Euler rotation, every axis uniform in `[-180, 180)` degrees.
/// A picked entry's quaternion orientation, or an unreadable rotation, is
/// dropped with it. The input catalog
/// is untouched; unpicked entries are carried over unchanged.
pub fn vary<R: Rng>(catalog: &Catalog, count: usize, rng: &mut R) -> Variation {
    let mut out = catalog.clone();
    let amount = count.min(catalog.len());
    let picks = rand::seq::index::sample(rng, catalog.len(), amount);

    let mut varied = Vec::with_capacity(amount);
    for idx in picks.iter() {
        let Some((id, _)) = catalog.get_index(idx) else {
            continue;
        };
        let angles = [
            rng.gen_range(ANGLE_MIN_DEG..ANGLE_MAX_DEG),
            rng.gen_range(ANGLE_MIN_DEG..ANGLE_MAX_DEG),
            rng.gen_range(ANGLE_MIN_DEG..ANGLE_MAX_DEG),
        ];
        if let Some(entry) = out.get_mut(id) {
            entry.set_rotation(Rotation::Euler(angles));
            info!("randomized rotation for {id}: {angles:?}");
            varied.push(id.to_string());
        }
    }

    Variation {
        catalog: out,
        varied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntry;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shelfwright_stage::Quatf;
    use std::collections::HashSet;

    fn catalog(n: usize) -> Catalog {
        (0..n)
            .map(|i| {
                let entry = CatalogEntry::new(format!("p{i}.usd"), [i as f64, 0.0, 0.0], [1.0; 3])
                    .with_rotation(Rotation::Orient(Quatf::identity()));
                (format!("P{i}"), entry)
            })
            .collect()
    }

    fn in_bounds(r: &[f32; 3]) -> bool {
        r.iter().all(|a| (ANGLE_MIN_DEG..ANGLE_MAX_DEG).contains(a))
    }

    #[test]
    fn varies_exactly_count_distinct_entries() {
        let input = catalog(10);
        let mut rng = StdRng::seed_from_u64(7);
        let v = vary(&input, 4, &mut rng);

        assert_eq!(v.varied.len(), 4);
        let unique: HashSet<&String> = v.varied.iter().collect();
        assert_eq!(unique.len(), 4);

        for (id, entry) in v.catalog.iter() {
            let original = input.get(id).unwrap();
            if unique.contains(&id.to_string()) {
                match entry.rotation {
                    Some(Rotation::Euler(r)) => assert!(in_bounds(&r), "{id}: {r:?}"),
                    other => panic!("{id} should carry an Euler rotation, got {other:?}"),
                }
                assert_eq!(entry.translate, original.translate);
                assert_eq!(entry.asset, original.asset);
            } else {
                assert_eq!(entry, original);
            }
        }
    }

    #[test]
    fn saturates_when_count_exceeds_len() {
        let input = catalog(3);
        let mut rng = StdRng::seed_from_u64(1);
        let v = vary(&input, 50, &mut rng);
        assert_eq!(v.varied.len(), 3);
        assert!(v
            .catalog
            .iter()
            .all(|(_, e)| matches!(e.rotation, Some(Rotation::Euler(_)))));
    }

    #[test]
    fn fresh_rotation_replaces_unreadable_one() {
        let input = Catalog::from_json_value(serde_json::json!({
            "A": { "asset": "a.usd", "translate": [0, 0, 0], "scale": [1, 1, 1],
                   "rotate": [0, 90] }
        }))
        .unwrap();
        assert_eq!(input.get("A").unwrap().invalid_fields, vec!["rotate"]);

        let v = vary(&input, 1, &mut StdRng::seed_from_u64(5));
        let a = v.catalog.get("A").unwrap();
        assert!(a.invalid_fields.is_empty());
        assert!(matches!(a.rotation, Some(Rotation::Euler(r)) if in_bounds(&r)));
    }

    #[test]
    fn input_is_never_mutated() {
        let input = catalog(5);
        let snapshot = input.clone();
        let mut rng = StdRng::seed_from_u64(3);
        let _ = vary(&input, 5, &mut rng);
        assert_eq!(input, snapshot);
    }

    #[test]
    fn zero_count_and_empty_catalog_are_noops() {
        let input = catalog(4);
        let mut rng = StdRng::seed_from_u64(9);
        let v = vary(&input, 0, &mut rng);
        assert!(v.varied.is_empty());
        assert_eq!(v.catalog, input);

        let empty = Catalog::new();
        let v = vary(&empty, 3, &mut rng);
        assert!(v.varied.is_empty());
        assert!(v.catalog.is_empty());
    }

    #[test]
    fn same_seed_same_variation() {
        let input = catalog(8);
        let a = vary(&input, 3, &mut StdRng::seed_from_u64(42));
        let b = vary(&input, 3, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
