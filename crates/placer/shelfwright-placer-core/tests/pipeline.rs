use approx::assert_relative_eq;
use nalgebra::Point3;
use shelfwright_placer::{
    Catalog, EntityStatus, PipelineStage, PlacerConfig, PlacerError, ShopPlacer, TargetMode,
    WorldTransform, WorldTransformMode,
};
use shelfwright_stage::{
    AssetRef, MemoryContext, MemoryStage, PrimKind, PrimPath, SceneStage, XformOp, XformOpKind,
};
use shelfwright_test_fixtures::{catalogs, stages};

fn path(s: &str) -> PrimPath {
    PrimPath::parse(s).expect("parse path")
}

fn catalog(name: &str) -> Catalog {
    Catalog::from_json_str(&catalogs::json(name).expect("catalog fixture")).expect("catalog parse")
}

fn gui_context() -> MemoryContext {
    let stage: MemoryStage = stages::load("gui-scene").expect("gui scene fixture");
    MemoryContext::with_stage(stage)
}

fn fixture_context() -> MemoryContext {
    let mut ctx = MemoryContext::new();
    let asset = stages::asset("shop-minimal-empty")
        .unwrap()
        .expect("base fixture asset");
    let stage: MemoryStage = stages::load("shop-minimal-empty").unwrap();
    ctx.register_asset(asset, stage);
    ctx
}

fn no_variation() -> PlacerConfig {
    PlacerConfig {
        variation_count: 0,
        ..PlacerConfig::default()
    }
}

/// Paths, kinds, arc counts and op orders; everything but the sampled angles.
fn structure(stage: &MemoryStage) -> Vec<(String, PrimKind, usize, usize, Vec<XformOpKind>)> {
    stage
        .iter()
        .map(|(p, prim)| {
            (
                p.to_string(),
                prim.kind,
                prim.references.len(),
                prim.payloads.len(),
                prim.xform_op_order.clone(),
            )
        })
        .collect()
}

#[test]
fn single_product_lands_under_its_group() {
    let mut ctx = gui_context();
    let report = ShopPlacer::seeded(no_variation(), 1).run(&mut ctx, &catalog("snacks-minimal"));

    assert!(report.success, "{report}");
    assert_eq!((report.placed, report.attempted), (1, 1));
    assert_eq!(report.to_string(), "Placed 1/1 products");

    let stage = ctx.active().unwrap();
    let a = path("/World/Shelf/Items_Lower/Snacks/A");
    assert_eq!(stage.payloads(&a).unwrap(), vec![AssetRef::new("chips.usd")]);
    assert_eq!(
        stage.xform_ops(&a).unwrap(),
        vec![XformOp::Translate([1.0, 0.0, 0.0]), XformOp::Scale([1.0, 1.0, 1.0])]
    );
    assert_eq!(
        stage.xform_op_order(&a).unwrap(),
        vec![XformOpKind::Translate, XformOpKind::Scale]
    );
    assert_eq!(
        stage.prim_kind(&path("/World/Shelf/Items_Lower/Snacks")),
        Some(PrimKind::Scope)
    );
    assert_eq!(
        report.completed_stages,
        vec![
            PipelineStage::AttachBase,
            PipelineStage::BuildHierarchy,
            PipelineStage::VaryEntries,
            PipelineStage::PlaceEntities
        ]
    );
}

#[test]
fn rerun_with_same_seed_reproduces_scene_exactly() {
    let cat = catalog("shop-mixed");
    let mut ctx = gui_context();

    let first = ShopPlacer::seeded(PlacerConfig::default(), 99).run(&mut ctx, &cat);
    let once = ctx.active().unwrap().clone();
    let second = ShopPlacer::seeded(PlacerConfig::default(), 99).run(&mut ctx, &cat);

    assert!(first.success && second.success);
    assert_eq!(first.varied, second.varied);
    assert_eq!(ctx.active().unwrap(), &once);
}

#[test]
fn rerun_with_fresh_randomness_keeps_structure() {
    let cat = catalog("shop-mixed");
    let mut ctx = gui_context();
    let mut placer = ShopPlacer::seeded(PlacerConfig::default(), 5);

    placer.run(&mut ctx, &cat);
    let once = structure(ctx.active().unwrap());
    let report = placer.run(&mut ctx, &cat);
    let twice = structure(ctx.active().unwrap());

    assert!(report.success);
    assert_eq!(once, twice);
    let shelf = ctx.active().unwrap().prim(&path("/World/Shelf")).unwrap();
    assert_eq!(shelf.references.len(), 1);
}

#[test]
fn hierarchy_matches_catalog_pairs_exactly() {
    let cat = catalog("shop-mixed");
    let mut ctx = gui_context();
    ShopPlacer::seeded(no_variation(), 0).run(&mut ctx, &cat);
    let stage = ctx.active().unwrap();

    let anchor = path("/World/Shelf");
    for (_, entry) in cat.iter() {
        let group = anchor.join([entry.shelf.as_str(), entry.category.as_str()]).unwrap();
        assert_eq!(stage.prim_kind(&group), Some(PrimKind::Scope), "{group}");
    }

    let mut groups: Vec<String> = stage
        .children(&anchor)
        .flat_map(|shelf| stage.children(shelf))
        .map(|p| p.to_string())
        .collect();
    groups.sort();
    assert_eq!(
        groups,
        vec![
            "/World/Shelf/Items_Lower/Breakfast",
            "/World/Shelf/Items_Lower/Snacks",
            "/World/Shelf/Items_Lower/Unknown",
            "/World/Shelf/Items_Upper/Drinks",
        ]
    );
}

#[test]
fn op_order_tracks_rotation_presence() {
    let cat = catalog("shop-mixed");
    let mut ctx = gui_context();
    let report = ShopPlacer::seeded(no_variation(), 0).run(&mut ctx, &cat);
    let stage = ctx.active().unwrap();

    assert_eq!(report.placed, cat.len());
    for outcome in &report.entities {
        let EntityStatus::Placed { path } = &outcome.status else {
            panic!("{} was not placed", outcome.id);
        };
        let entry = cat.get(&outcome.id).unwrap();
        let order = stage.xform_op_order(path).unwrap();
        match entry.rotation {
            Some(_) => {
                assert_eq!(order.len(), 3, "{}", outcome.id);
                assert_eq!(order[0], XformOpKind::Translate);
                assert!(order[1].is_rotation());
                assert_eq!(order[2], XformOpKind::Scale);
            }
            None => assert_eq!(order, vec![XformOpKind::Translate, XformOpKind::Scale]),
        }
    }

    let cola = stage
        .prim(&path("/World/Shelf/Items_Upper/Drinks/Cola_Can"))
        .unwrap();
    assert!(cola.op(XformOpKind::Orient).is_some());
    assert!(cola.op(XformOpKind::RotateZyx).is_none());
}

#[test]
fn varied_entries_get_euler_rotation_only() {
    let cat = catalog("shop-mixed");
    let mut ctx = gui_context();
    let config = PlacerConfig {
        variation_count: cat.len() + 10,
        ..PlacerConfig::default()
    };
    let report = ShopPlacer::seeded(config, 11).run(&mut ctx, &cat);
    assert_eq!(report.varied.len(), cat.len());

    let stage = ctx.active().unwrap();
    for (p, prim) in stage.iter().filter(|(p, _)| p.depth() == 5) {
        assert!(prim.op(XformOpKind::Orient).is_none(), "{p}");
        let Some(XformOp::RotateZyx(r)) = prim.op(XformOpKind::RotateZyx) else {
            panic!("{p} lacks a rotateZYX op");
        };
        assert!(r.iter().all(|a| (-180.0..180.0).contains(a)), "{p}: {r:?}");
    }
}

#[test]
fn stale_references_are_replaced_by_one() {
    let mut stage: MemoryStage = stages::load("gui-scene").unwrap();
    let shelf = path("/World/Shelf");
    stage.define_prim(&shelf, PrimKind::Xform).unwrap();
    stage.add_reference(&shelf, AssetRef::new("stale_one.usda")).unwrap();
    stage.add_reference(&shelf, AssetRef::new("stale_two.usda")).unwrap();
    let mut ctx = MemoryContext::with_stage(stage);

    let cfg = no_variation();
    let report = ShopPlacer::seeded(cfg.clone(), 0).run(&mut ctx, &catalog("snacks-minimal"));
    assert!(report.success);
    assert_eq!(
        ctx.active().unwrap().references(&shelf).unwrap(),
        vec![AssetRef::with_prim(cfg.base_fixture, path("/World/Shelf"))]
    );
}

#[test]
fn override_world_transform_replaces_fixture_ops() {
    let mut ctx = fixture_context();
    let config = PlacerConfig {
        target_mode: TargetMode::OpenNewScene,
        apply_world_transform: true,
        world_transform: WorldTransform {
            mode: WorldTransformMode::Override,
            translate: [0.0, 3.0, 0.0],
            rotate_zyx_deg: [0.0, 0.0, 90.0],
        },
        variation_count: 0,
        ..PlacerConfig::default()
    };
    let report = ShopPlacer::seeded(config, 0).run(&mut ctx, &catalog("snacks-minimal"));
    assert!(report.success, "{report}");
    assert!(report.completed_stages.contains(&PipelineStage::WorldTransform));

    let stage = ctx.active().unwrap();
    let shelf = path("/World/Shelf");
    assert!(stage.reset_xform_stack(&shelf).unwrap());
    assert_eq!(
        stage.xform_ops(&shelf).unwrap(),
        vec![
            XformOp::Translate([0.0, 3.0, 0.0]),
            XformOp::RotateZyx([0.0, 0.0, 90.0])
        ]
    );
    // untouched fixture content survives
    assert!(stage.prim_exists(&path("/World/Floor")));
}

#[test]
fn additive_composes_with_inherited_transform() {
    let wt = WorldTransform {
        mode: WorldTransformMode::Additive,
        translate: [1.0, 0.0, 0.0],
        rotate_zyx_deg: [0.0, 0.0, 0.0],
    };
    let config = |mode| PlacerConfig {
        apply_world_transform: true,
        world_transform: WorldTransform { mode, ..wt.clone() },
        variation_count: 0,
        ..PlacerConfig::default()
    };
    let shelf = path("/World/Shelf");
    let origin = Point3::origin();

    // /World in the GUI scene sits at z = 1
    let mut ctx = gui_context();
    ShopPlacer::seeded(config(WorldTransformMode::Additive), 0).run(&mut ctx, &catalog("snacks-minimal"));
    let world = ctx.active().unwrap().world_transform(&shelf).unwrap();
    assert_relative_eq!(world.transform_point(&origin), Point3::new(1.0, 0.0, 1.0));

    ShopPlacer::seeded(config(WorldTransformMode::Override), 0).run(&mut ctx, &catalog("snacks-minimal"));
    let world = ctx.active().unwrap().world_transform(&shelf).unwrap();
    assert_relative_eq!(world.transform_point(&origin), Point3::new(1.0, 0.0, 0.0));
    assert_eq!(ctx.active().unwrap().xform_ops(&shelf).unwrap().len(), 2);
}

#[test]
fn missing_scene_aborts_before_hierarchy() {
    let mut ctx = MemoryContext::new();
    let report = ShopPlacer::seeded(PlacerConfig::default(), 0).run(&mut ctx, &catalog("snacks-minimal"));
    assert!(!report.success);
    let failure = report.failure.expect("failure recorded");
    assert_eq!(failure.stage, PipelineStage::AttachBase);
    assert_eq!(failure.message, PlacerError::NoActiveScene.to_string());
    assert!(report.completed_stages.is_empty());
    assert_eq!(report.attempted, 0);
}

#[test]
fn unloadable_fixture_aborts() {
    let mut ctx = MemoryContext::new();
    let config = PlacerConfig {
        target_mode: TargetMode::OpenNewScene,
        base_fixture: "missing/shop.usda".into(),
        ..PlacerConfig::default()
    };
    let report = ShopPlacer::seeded(config, 0).run(&mut ctx, &catalog("snacks-minimal"));
    let failure = report.failure.expect("failure recorded");
    assert_eq!(failure.stage, PipelineStage::AttachBase);
    assert!(failure.message.contains("missing/shop.usda"));
    assert!(ctx.active().is_none());
}

#[test]
fn fixture_without_anchor_fails_hierarchy() {
    let mut ctx = MemoryContext::new();
    let gui: MemoryStage = stages::load("gui-scene").unwrap();
    let config = PlacerConfig {
        target_mode: TargetMode::OpenNewScene,
        base_fixture: "gui.usda".into(),
        ..PlacerConfig::default()
    };
    ctx.register_asset("gui.usda", gui.clone());

    let report = ShopPlacer::seeded(config.clone(), 0).run(&mut ctx, &catalog("snacks-minimal"));
    let failure = report.failure.expect("failure recorded");
    assert_eq!(failure.stage, PipelineStage::BuildHierarchy);
    assert_eq!(report.completed_stages, vec![PipelineStage::AttachBase]);
    assert_eq!(ctx.active(), Some(&gui));

    let with_transform = PlacerConfig {
        apply_world_transform: true,
        ..config
    };
    let report = ShopPlacer::seeded(with_transform, 0).run(&mut ctx, &catalog("snacks-minimal"));
    assert_eq!(report.failure.unwrap().stage, PipelineStage::WorldTransform);
}

#[test]
fn entity_failures_are_isolated() {
    let cat = catalog("incomplete");
    let mut ctx = gui_context();
    let report = ShopPlacer::seeded(no_variation(), 0).run(&mut ctx, &cat);

    assert!(report.success);
    assert_eq!((report.placed, report.attempted), (1, 5));
    assert!(report.outcome("Good").unwrap().is_placed());

    let reasons: Vec<(&str, &str)> = report
        .failed_entities()
        .map(|o| match &o.status {
            EntityStatus::Failed { reason } => (o.id.as_str(), reason.as_str()),
            EntityStatus::Placed { .. } => unreachable!(),
        })
        .collect();
    assert_eq!(reasons.len(), 4);
    assert!(reasons[0].1.contains("'asset'"), "{reasons:?}");
    assert!(reasons[1].1.contains("'scale'"), "{reasons:?}");
    assert_eq!(reasons[2].0, "bad-id");
    assert_eq!(reasons[3].0, "ShortTranslate");
    assert!(reasons[3].1.contains("malformed 'translate'"), "{reasons:?}");

    let stage = ctx.active().unwrap();
    assert!(!stage.prim_exists(&path("/World/Shelf/Items_Lower/Snacks/NoAsset")));
    assert!(!stage.prim_exists(&path("/World/Shelf/Items_Lower/Drinks/NoScale")));
    assert!(!stage.prim_exists(&path("/World/Shelf/Items_Lower/Snacks/ShortTranslate")));
}

#[test]
fn empty_catalog_reports_failure_without_stage_error() {
    let mut ctx = gui_context();
    let report = ShopPlacer::seeded(PlacerConfig::default(), 0).run(&mut ctx, &Catalog::new());
    assert!(!report.success);
    assert!(report.failure.is_none());
    assert_eq!((report.placed, report.attempted), (0, 0));
    assert_eq!(report.completed_stages.len(), 4);
}

#[test]
fn report_serializes_for_hosts() {
    let mut ctx = gui_context();
    let report = ShopPlacer::seeded(no_variation(), 0).run(&mut ctx, &catalog("snacks-minimal"));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["entities"][0]["status"], "placed");
    assert_eq!(
        json["entities"][0]["path"],
        "/World/Shelf/Items_Lower/Snacks/A"
    );
    assert_eq!(json["completed_stages"][0], "attach_base");
}
