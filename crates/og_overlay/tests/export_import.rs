// crates/og_overlay/tests/export_import.rs

//! 导出/导入文件往返测试
//! 验证参数记录唯一性、文件还原精度以及记录损坏时的回退

use og_config::ProjectionConfig;
use og_geo::{EastNorth, LatLon};
use og_overlay::dataset::Tags;
use og_overlay::document::{build_dataset, Document};
use og_overlay::record::{TRANSFORM_MARKER_KEY, X_IMAGE_KEY};
use og_overlay::{
    export, export_document, import_document, ChangeOrigin, DataSet, ExportOutcome,
    MemoryNotifier, NodeId, SceneSnapshot, StaticOverlay, StaticViewport, WayId,
};

fn projection() -> ProjectionConfig {
    ProjectionConfig {
        reference_lat: 35.68,
        reference_lon: 139.76,
        ..Default::default()
    }
}

fn scene() -> SceneSnapshot {
    SceneSnapshot {
        viewport: StaticViewport {
            center: EastNorth::new(388_000.0, 3_949_000.0),
            width: 1000.0,
            height: 800.0,
            pixels_per_unit_x: 5.0,
            pixels_per_unit_y: 5.0,
        },
        overlay: Some(StaticOverlay {
            matrix: [0.98, 0.17, -0.17, 0.98, 35.0, 12.0],
            anchor: EastNorth::new(388_010.0, 3_948_990.0),
            image_width: 640,
            image_height: 480,
            meters_per_unit_x: Some(0.1),
            meters_per_unit_y: Some(0.1),
            pristine_scale: Some(1.0),
        }),
    }
}

fn populated() -> DataSet {
    let ds = DataSet::new(projection());
    {
        let mut tx = ds.begin_update(ChangeOrigin::User);
        let a = tx.add_node(Some(EastNorth::new(387_990.0, 3_949_012.0)), Tags::new());
        let b = tx.add_node(Some(EastNorth::new(388_021.5, 3_948_977.25)), Tags::new());
        tx.add_way(vec![a, b], Tags::from([("line_info".to_string(), "route".to_string())]))
            .unwrap();
    }
    ds
}

/// 测试两次导出后仍只有一个载体，且数值来自第二次导出
#[test]
fn test_export_twice_keeps_single_carrier() {
    let ds = populated();
    let notifier = MemoryNotifier::new();
    let mut scene = scene();

    export(&ds, &scene.viewport, scene.overlay(), &notifier);
    scene.viewport.pixels_per_unit_x = 8.0;
    scene.viewport.pixels_per_unit_y = 8.0;
    let second = export(&ds, &scene.viewport, scene.overlay(), &notifier);

    let data = ds.read();
    let carriers = data.ways().filter(|w| w.has_key(TRANSFORM_MARKER_KEY)).count();
    assert_eq!(carriers, 1);
    let stored = data.transform_record().unwrap();
    match second {
        ExportOutcome::Calibrated { record, .. } => assert_eq!(stored, record),
        other => panic!("期望 Calibrated, 得到 {other:?}"),
    }
    assert!((stored.pixels_per_unit_x - 8.0).abs() < 1e-9);
}

/// 测试文档中重复的载体在导入后只保留一个，再次导出后仍只有一个
#[test]
fn test_duplicate_carrier_in_document_collapses() {
    let ds = populated();
    let notifier = MemoryNotifier::new();
    let scene = scene();
    export(&ds, &scene.viewport, scene.overlay(), &notifier);

    let mut doc = Document::from_dataset(&ds);
    let mut duplicate = doc.transform_record_entry().cloned().unwrap();
    duplicate.id = WayId(99);
    doc.ways.push(duplicate);

    let (reloaded, summary) = build_dataset(doc, &notifier).unwrap();
    assert_eq!(summary.discarded_carriers, 1);
    export(&reloaded, &scene.viewport, scene.overlay(), &notifier);

    let data = reloaded.read();
    assert_eq!(data.ways().filter(|w| w.has_key(TRANSFORM_MARKER_KEY)).count(), 1);
}

/// 测试导出文件去掉经纬度后能由像素坐标还原
#[test]
fn test_file_round_trip_via_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.json");
    let ds = populated();
    let scene = scene();
    let notifier = MemoryNotifier::new();

    let outcome = export_document(&ds, &scene.viewport, scene.overlay(), &path, &notifier).unwrap();
    assert!(outcome.is_calibrated());

    // 去掉经纬度，只保留像素坐标
    let mut doc = Document::load(&path).unwrap();
    for node in &mut doc.nodes {
        node.lat = None;
        node.lon = None;
    }
    doc.save(&path).unwrap();

    let (restored, summary) = import_document(&path, &notifier).unwrap();
    assert_eq!(summary.converted, 2);
    assert_eq!(summary.unresolved, 0);

    let original = ds.read();
    let restored = restored.read();
    for node in original.nodes() {
        let a = node.coord.unwrap();
        let b = restored.node(node.id).and_then(|n| n.coord).unwrap();
        assert!((a.east - b.east).abs() < 1e-6);
        assert!((a.north - b.north).abs() < 1e-6);
    }
    assert_eq!(restored.way_count(), original.way_count());
}

/// 测试记录缺少 scaleY 时节点坐标保持未设置
#[test]
fn test_missing_scale_y_leaves_nodes_unset() {
    let ds = populated();
    let scene = scene();
    let notifier = MemoryNotifier::new();
    export(&ds, &scene.viewport, scene.overlay(), &notifier);

    let mut doc = Document::from_dataset(&ds);
    for way in &mut doc.ways {
        way.tags.remove("scaleY");
    }
    for node in &mut doc.nodes {
        node.lat = None;
        node.lon = None;
    }

    let (restored, summary) = build_dataset(doc, &notifier).unwrap();
    assert!(!summary.has_record);
    assert_eq!(summary.unresolved, 2);
    assert!(restored.read().nodes().all(|n| n.coord.is_none()));
    assert!(notifier.contains("scaleY"));
}

/// 测试无叠加图层时仍保存文件但不写像素属性
#[test]
fn test_export_without_overlay_saves_plain_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.json");
    let ds = populated();
    let scene = SceneSnapshot {
        overlay: None,
        ..scene()
    };
    let notifier = MemoryNotifier::new();

    let outcome = export_document(&ds, &scene.viewport, scene.overlay(), &path, &notifier).unwrap();
    assert!(!outcome.is_calibrated());

    let doc = Document::load(&path).unwrap();
    assert!(doc.transform_record_entry().is_none());
    assert!(doc.nodes.iter().all(|n| !n.tags.contains_key(X_IMAGE_KEY)));
    assert!(doc.nodes.iter().all(|n| n.lat.is_some()));

    let ll = ds.projection().unproject(ds.read().node(NodeId(1)).unwrap().coord.unwrap());
    let saved = &doc.nodes[0];
    assert!((saved.lat.unwrap() - ll.lat).abs() < 1e-12);
    assert!(LatLon::new(saved.lat.unwrap(), saved.lon.unwrap()).is_valid());
}
