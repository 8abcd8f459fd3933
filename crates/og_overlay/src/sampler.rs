// crates/og_overlay/src/sampler.rs

//! 视口与标定采样
//!
//! 每次导出或实时编辑都重新采样，不缓存任何视图状态。

use crate::collaborators::{OverlayCalibration, Viewport};
use crate::error::{OverlayError, OverlayResult};
use og_foundation::float::is_finite_nonzero;
use og_geo::{AffineTransform, EastNorth};

/// 米数到像素比例的固定换算常数
pub const SCALE_CONSTANT: f64 = 100.0;

// ============================================================================
// 视口采样
// ============================================================================

/// 视口采样结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSample {
    /// 视图中心
    pub center: EastNorth,
    /// 每东向单位像素数
    pub pixels_per_unit_x: f64,
    /// 每北向单位像素数
    pub pixels_per_unit_y: f64,
}

/// 读取视图中心和两个轴向独立的像素密度
///
/// 密度由视口左上角与中心的投影坐标差推算。
///
/// # Errors
/// 中心非有限或任一密度为零/非有限时返回 [`OverlayError::DegenerateViewport`]
pub fn sample_viewport(viewport: &dyn Viewport) -> OverlayResult<ViewportSample> {
    let center = viewport.view_center();
    let (width, height) = viewport.size();
    let top_left = viewport.east_north_at(0.0, 0.0);

    if !center.is_finite() {
        return Err(OverlayError::degenerate_viewport("view center is not finite"));
    }

    let pixels_per_unit_x = (width / 2.0) / (center.east - top_left.east);
    let pixels_per_unit_y = (height / 2.0) / (top_left.north - center.north);

    if !is_finite_nonzero(pixels_per_unit_x) || !is_finite_nonzero(pixels_per_unit_y) {
        return Err(OverlayError::degenerate_viewport(format!(
            "pixel density ({pixels_per_unit_x}, {pixels_per_unit_y}) for size {width}x{height}"
        )));
    }

    Ok(ViewportSample {
        center,
        pixels_per_unit_x,
        pixels_per_unit_y,
    })
}

// ============================================================================
// 标定采样
// ============================================================================

/// 标定采样结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationSample {
    /// 去平移的标定矩阵
    pub matrix: AffineTransform,
    /// 锚点相对视图中心的 x 像素偏移
    pub image_offset_x: f64,
    /// 锚点相对视图中心的 y 像素偏移（向下为正）
    pub image_offset_y: f64,
    /// x 缩放修正
    pub scale_x: f64,
    /// y 缩放修正
    pub scale_y: f64,
    /// 图像初始缩放
    pub pristine_scale: f64,
    /// 图像半宽
    pub half_width: f64,
    /// 图像半高
    pub half_height: f64,
}

fn required<T>(value: Option<T>, field: &'static str) -> OverlayResult<T> {
    value.ok_or_else(|| OverlayError::calibration_unavailable(field))
}

fn required_finite(value: Option<f64>, field: &'static str) -> OverlayResult<f64> {
    value
        .filter(|v| v.is_finite())
        .ok_or_else(|| OverlayError::calibration_unavailable(field))
}

/// 读取叠加图层的标定状态
///
/// 返回的矩阵是去掉平移分量的新值，叠加图层本身不受影响。
///
/// # Errors
/// 任一标定属性缺失或非有限时返回 [`OverlayError::CalibrationUnavailable`]
pub fn sample_calibration(
    overlay: &dyn OverlayCalibration,
    view: &ViewportSample,
) -> OverlayResult<CalibrationSample> {
    let matrix = required(overlay.calibration_matrix(), "calibration_matrix")?;
    if !matrix.is_finite() {
        return Err(OverlayError::calibration_unavailable("calibration_matrix"));
    }
    let anchor = required(overlay.anchor_position(), "anchor_position")?;
    if !anchor.is_finite() {
        return Err(OverlayError::calibration_unavailable("anchor_position"));
    }
    let (image_width, image_height) = required(overlay.image_pixel_size(), "image_pixel_size")?;
    let meters_x = required_finite(overlay.meters_per_pixel_x(anchor), "meters_per_pixel_x")?;
    let meters_y = required_finite(overlay.meters_per_pixel_y(anchor), "meters_per_pixel_y")?;
    let pristine_scale = required_finite(overlay.pristine_image_scale(), "pristine_image_scale")?;

    let scale_x = SCALE_CONSTANT * meters_x / (pristine_scale * view.pixels_per_unit_x);
    let scale_y = SCALE_CONSTANT * meters_y / (pristine_scale * view.pixels_per_unit_y);
    if !is_finite_nonzero(scale_x) {
        return Err(OverlayError::calibration_unavailable("meters_per_pixel_x"));
    }
    if !is_finite_nonzero(scale_y) {
        return Err(OverlayError::calibration_unavailable("meters_per_pixel_y"));
    }

    Ok(CalibrationSample {
        matrix: matrix.without_translation(),
        image_offset_x: (anchor.east - view.center.east) * view.pixels_per_unit_x,
        image_offset_y: (view.center.north - anchor.north) * view.pixels_per_unit_y,
        scale_x,
        scale_y,
        pristine_scale,
        half_width: f64::from(image_width) / 2.0,
        half_height: f64::from(image_height) / 2.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{StaticOverlay, StaticViewport};

    fn viewport() -> StaticViewport {
        StaticViewport {
            center: EastNorth::new(500_000.0, 4_500_000.0),
            width: 800.0,
            height: 600.0,
            pixels_per_unit_x: 10.0,
            pixels_per_unit_y: 8.0,
        }
    }

    fn overlay() -> StaticOverlay {
        StaticOverlay {
            matrix: [1.0, 0.0, 0.0, 1.0, 12.0, -7.0],
            anchor: EastNorth::new(500_002.0, 4_499_999.0),
            image_width: 101,
            image_height: 80,
            meters_per_unit_x: Some(0.1),
            meters_per_unit_y: Some(0.08),
            pristine_scale: Some(1.0),
        }
    }

    #[test]
    fn test_sample_viewport_density() {
        let sample = sample_viewport(&viewport()).unwrap();
        assert!((sample.pixels_per_unit_x - 10.0).abs() < 1e-9);
        assert!((sample.pixels_per_unit_y - 8.0).abs() < 1e-9);
        assert_eq!(sample.center, EastNorth::new(500_000.0, 4_500_000.0));
    }

    #[test]
    fn test_zero_size_viewport_is_degenerate() {
        let mut vp = viewport();
        vp.width = 0.0;
        assert!(matches!(
            sample_viewport(&vp),
            Err(OverlayError::DegenerateViewport { .. })
        ));
    }

    #[test]
    fn test_sample_calibration_fields() {
        let view = sample_viewport(&viewport()).unwrap();
        let sample = sample_calibration(&overlay(), &view).unwrap();

        assert_eq!(sample.matrix.to_flat_matrix()[4], 0.0);
        assert_eq!(sample.matrix.to_flat_matrix()[5], 0.0);
        assert!((sample.image_offset_x - 20.0).abs() < 1e-6);
        assert!((sample.image_offset_y - 8.0).abs() < 1e-6);
        assert!((sample.scale_x - 1.0).abs() < 1e-9);
        assert!((sample.scale_y - 1.0).abs() < 1e-9);
        assert_eq!(sample.half_width, 50.5);
        assert_eq!(sample.half_height, 40.0);
    }

    #[test]
    fn test_overlay_matrix_is_not_mutated() {
        let overlay = overlay();
        let view = sample_viewport(&viewport()).unwrap();
        let _ = sample_calibration(&overlay, &view).unwrap();
        assert_eq!(overlay.matrix[4], 12.0);
        assert_eq!(overlay.matrix[5], -7.0);
    }

    #[test]
    fn test_missing_pristine_scale() {
        let mut overlay = overlay();
        overlay.pristine_scale = None;
        let view = sample_viewport(&viewport()).unwrap();
        match sample_calibration(&overlay, &view) {
            Err(OverlayError::CalibrationUnavailable { field }) => {
                assert_eq!(field, "pristine_image_scale")
            }
            other => panic!("期望 CalibrationUnavailable, 得到 {other:?}"),
        }
    }

    #[test]
    fn test_nan_meters_per_pixel() {
        let mut overlay = overlay();
        overlay.meters_per_unit_y = Some(f64::NAN);
        let view = sample_viewport(&viewport()).unwrap();
        assert!(sample_calibration(&overlay, &view).is_err());
    }
}
