// crates/og_overlay/tests/capture.rs

//! CSV 采集测试
//! 验证从文件采集的节点落在参数记录反算的位置上

use og_config::{CaptureConfig, ProjectionConfig};
use og_geo::EastNorth;
use og_overlay::record::{X_IMAGE_KEY, Y_IMAGE_KEY};
use og_overlay::{
    capture_file, export, CaptureKind, ChangeOrigin, DataSet, InverseTransformer, MemoryNotifier,
    PixelCoord, StaticOverlay, StaticViewport,
};
use std::io::Write;

fn calibrated_dataset() -> DataSet {
    let ds = DataSet::new(ProjectionConfig::default());
    ds.begin_update(ChangeOrigin::User)
        .add_node(Some(EastNorth::new(500_000.0, 4_500_000.0)), Default::default());
    let viewport = StaticViewport {
        center: EastNorth::new(500_000.0, 4_500_000.0),
        width: 600.0,
        height: 400.0,
        pixels_per_unit_x: 4.0,
        pixels_per_unit_y: 4.0,
    };
    let overlay = StaticOverlay {
        matrix: [1.1, 0.2, -0.2, 1.1, 0.0, 0.0],
        anchor: EastNorth::new(500_003.0, 4_499_998.0),
        image_width: 300,
        image_height: 200,
        meters_per_unit_x: Some(0.04),
        meters_per_unit_y: Some(0.04),
        pristine_scale: Some(1.0),
    };
    assert!(export(&ds, &viewport, Some(&overlay), &MemoryNotifier::new()).is_calibrated());
    ds
}

/// 测试无表头、分号分隔的目标点文件
#[test]
fn test_goal_file_without_header() {
    let ds = calibrated_dataset();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "120.5;80.25;0.0").unwrap();
    writeln!(file, "10;20").unwrap();
    writeln!(file, "200;150;3.14159").unwrap();
    file.flush().unwrap();

    let config = CaptureConfig {
        has_header: false,
        delimiter: ';',
        ..Default::default()
    };
    let outcome =
        capture_file(&ds, CaptureKind::AmrGoal, file.path(), &config, &MemoryNotifier::new()).unwrap();
    assert_eq!(outcome.rows, 2);
    assert_eq!(outcome.skipped, 1);

    let data = ds.read();
    let transformer = InverseTransformer::new(data.transform_record().unwrap()).unwrap();
    let captured = data
        .nodes()
        .find(|n| n.get(X_IMAGE_KEY) == Some("120.5"))
        .unwrap();
    assert_eq!(captured.get(Y_IMAGE_KEY), Some("80.25"));
    let expected = transformer.east_north(PixelCoord::new(120.5, 80.25));
    let coord = captured.coord.unwrap();
    assert!((coord.east - expected.east).abs() < 1e-9);
    assert!((coord.north - expected.north).abs() < 1e-9);
}

/// 测试文件不存在
#[test]
fn test_missing_file_is_io_error() {
    let ds = calibrated_dataset();
    let result = capture_file(
        &ds,
        CaptureKind::PgvTape,
        "/nonexistent/tape.csv",
        &CaptureConfig::default(),
        &MemoryNotifier::new(),
    );
    assert!(matches!(result, Err(og_overlay::OverlayError::Io(_))));
}
