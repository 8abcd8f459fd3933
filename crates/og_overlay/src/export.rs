// crates/og_overlay/src/export.rs

//! 导出：为全部节点写入像素属性并持久化参数记录
//!
//! 整个导出在一个修改守卫内完成。标定不可用时不写入任何像素属性，
//! 数据集保持原样，并通过通知告知用户已回退为普通保存。

use crate::collaborators::{OverlayCalibration, PixelCoord, Viewport};
use crate::dataset::{ChangeOrigin, DataSet, NodeId, UpdateGuard};
use crate::error::{OverlayError, OverlayResult};
use crate::forward::ForwardTransformer;
use crate::notify::{NoticeLevel, Notifier};
use crate::record::{TransformParameterRecord, X_IMAGE_KEY, Y_IMAGE_KEY};
use crate::sampler::{sample_calibration, sample_viewport};
use og_geo::EastNorth;

/// 导出结果
#[derive(Debug)]
pub enum ExportOutcome {
    /// 已写入像素属性
    Calibrated {
        /// 写入像素属性的节点数
        exported: usize,
        /// 因坐标未设置而跳过的节点数
        skipped: usize,
        /// 写入载体的参数记录
        record: TransformParameterRecord,
    },
    /// 回退：未写入任何像素属性
    Fallback {
        /// 原因
        reason: OverlayError,
    },
}

impl ExportOutcome {
    /// 是否已标定导出
    pub fn is_calibrated(&self) -> bool {
        matches!(self, Self::Calibrated { .. })
    }
}

/// 导出
///
/// 标定相关错误在此恢复为 [`ExportOutcome::Fallback`]，不会向上传播。
pub fn export(
    dataset: &DataSet,
    viewport: &dyn Viewport,
    overlay: Option<&dyn OverlayCalibration>,
    notifier: &dyn Notifier,
) -> ExportOutcome {
    let mut tx = dataset.begin_update(ChangeOrigin::Batch);

    match write_pixel_attributes(&mut tx, viewport, overlay) {
        Ok((exported, skipped, record)) => {
            tracing::info!(
                "Export calibrated: {} nodes written, {} skipped",
                exported,
                skipped
            );
            if skipped > 0 {
                notifier.notify(
                    NoticeLevel::Info,
                    &format!("{skipped} nodes without coordinates were not exported"),
                );
            }
            ExportOutcome::Calibrated {
                exported,
                skipped,
                record,
            }
        }
        Err(reason) => {
            tracing::warn!("Export fell back to plain save: {}", reason);
            notifier.notify(
                NoticeLevel::Warning,
                &format!("Image calibration unavailable ({reason}); saved without pixel coordinates"),
            );
            ExportOutcome::Fallback { reason }
        }
    }
}

fn write_pixel_attributes(
    tx: &mut UpdateGuard<'_>,
    viewport: &dyn Viewport,
    overlay: Option<&dyn OverlayCalibration>,
) -> OverlayResult<(usize, usize, TransformParameterRecord)> {
    let overlay = overlay.ok_or(OverlayError::MissingOverlay)?;
    let view = sample_viewport(viewport)?;
    let calibration = sample_calibration(overlay, &view)?;
    let record = TransformParameterRecord::from_samples(&view, &calibration);
    let transformer = ForwardTransformer::new(record)?;

    let (ids, points): (Vec<NodeId>, Vec<EastNorth>) = tx
        .nodes()
        .filter_map(|n| n.coord.map(|c| (n.id, c)))
        .unzip();
    let skipped = tx.node_count() - ids.len();
    let pixels = transformer.transform_all(&points);

    tracing::debug!("Forward transformed {} nodes", pixels.len());

    for (id, PixelCoord { x, y }) in ids.iter().zip(pixels) {
        tx.set_node_tags(*id, [(X_IMAGE_KEY, x.to_string()), (Y_IMAGE_KEY, y.to_string())])?;
    }
    tx.upsert_transform_record(&record);

    Ok((ids.len(), skipped, record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Tags;
    use crate::notify::MemoryNotifier;
    use crate::scene::{StaticOverlay, StaticViewport};
    use og_config::ProjectionConfig;

    fn viewport() -> StaticViewport {
        StaticViewport {
            center: EastNorth::new(500_000.0, 4_500_000.5),
            width: 800.0,
            height: 600.0,
            pixels_per_unit_x: 10.0,
            pixels_per_unit_y: 10.0,
        }
    }

    fn overlay(matrix: [f64; 6]) -> StaticOverlay {
        StaticOverlay {
            matrix,
            anchor: EastNorth::new(500_000.0, 4_500_000.5),
            image_width: 100,
            image_height: 100,
            meters_per_unit_x: Some(0.1),
            meters_per_unit_y: Some(0.1),
            pristine_scale: Some(1.0),
        }
    }

    fn dataset() -> DataSet {
        let ds = DataSet::new(ProjectionConfig::default());
        {
            let mut tx = ds.begin_update(ChangeOrigin::User);
            tx.add_node(Some(EastNorth::new(500_000.0, 4_500_000.0)), Tags::new());
            tx.add_node(None, Tags::new());
        }
        ds
    }

    #[test]
    fn test_export_writes_pixel_attributes() {
        let ds = dataset();
        let notifier = MemoryNotifier::new();
        let overlay = overlay([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        let outcome = export(&ds, &viewport(), Some(&overlay), &notifier);

        match outcome {
            ExportOutcome::Calibrated { exported, skipped, .. } => {
                assert_eq!(exported, 1);
                assert_eq!(skipped, 1);
            }
            other => panic!("期望 Calibrated, 得到 {other:?}"),
        }
        let data = ds.read();
        let node = data.node(NodeId(1)).unwrap();
        assert_eq!(node.get(X_IMAGE_KEY), Some("50"));
        assert_eq!(node.get(Y_IMAGE_KEY), Some("55"));
        assert!(data.node(NodeId(2)).unwrap().get(X_IMAGE_KEY).is_none());
        assert!(data.has_transform_record());
    }

    #[test]
    fn test_singular_matrix_falls_back_without_writes() {
        let ds = dataset();
        let notifier = MemoryNotifier::new();
        let overlay = overlay([1.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
        let outcome = export(&ds, &viewport(), Some(&overlay), &notifier);

        assert!(matches!(
            outcome,
            ExportOutcome::Fallback {
                reason: OverlayError::NonInvertibleCalibration { .. }
            }
        ));
        let data = ds.read();
        assert!(data.nodes().all(|n| n.tags.is_empty()));
        assert!(!data.has_transform_record());
        assert_eq!(notifier.count(NoticeLevel::Warning), 1);
    }

    #[test]
    fn test_missing_overlay_falls_back() {
        let ds = dataset();
        let notifier = MemoryNotifier::new();
        let outcome = export(&ds, &viewport(), None, &notifier);
        assert!(matches!(
            outcome,
            ExportOutcome::Fallback {
                reason: OverlayError::MissingOverlay
            }
        ));
        assert!(!outcome.is_calibrated());
    }
}
