// crates/og_overlay/src/forward.rs

//! 正向变换：投影坐标 → 叠加图像像素坐标
//!
//! 对每个点依次执行：
//!
//! 1. 相对视图中心换算为屏幕像素位移（y 轴反向）
//! 2. 乘以去平移标定矩阵的逆
//! 3. 减去锚点补偿 `offset / matrix.scale_axis`
//! 4. 乘以缩放修正
//! 5. 加上图像半宽/半高
//! 6. 向下量化到 6 位小数
//!
//! 矩阵不可逆时整批失败，不产生任何结果。

use crate::collaborators::PixelCoord;
use crate::error::{OverlayError, OverlayResult};
use crate::record::TransformParameterRecord;
use crate::sampler::{CalibrationSample, ViewportSample};
use og_foundation::float::quantize;
use og_geo::{AffineTransform, EastNorth};

/// 锚点补偿项
///
/// 对角缩放为零时（如纯交换矩阵），偏移为零则补偿为零，否则无法补偿。
pub(crate) fn anchor_compensation(offset: f64, axis_scale: f64, axis: char) -> OverlayResult<f64> {
    if axis_scale != 0.0 {
        Ok(offset / axis_scale)
    } else if offset == 0.0 {
        Ok(0.0)
    } else {
        Err(OverlayError::DegenerateAnchorScale { axis, offset })
    }
}

/// 正向变换器
///
/// 针对一份参数记录预先求逆矩阵与锚点补偿，之后逐点变换不会失败。
#[derive(Debug, Clone)]
pub struct ForwardTransformer {
    record: TransformParameterRecord,
    inverse: AffineTransform,
    compensation_x: f64,
    compensation_y: f64,
}

impl ForwardTransformer {
    /// 创建变换器
    ///
    /// # Errors
    /// - 标定矩阵奇异: [`OverlayError::NonInvertibleCalibration`]
    /// - 零对角缩放且锚点偏移非零: [`OverlayError::DegenerateAnchorScale`]
    pub fn new(record: TransformParameterRecord) -> OverlayResult<Self> {
        let matrix = record.calibration();
        let inverse = matrix
            .try_inverse()
            .map_err(|_| OverlayError::NonInvertibleCalibration {
                determinant: matrix.determinant(),
            })?;
        Ok(Self {
            record,
            inverse,
            compensation_x: anchor_compensation(record.image_offset_x, matrix.scale_x(), 'x')?,
            compensation_y: anchor_compensation(record.image_offset_y, matrix.scale_y(), 'y')?,
        })
    }

    /// 参数记录
    pub fn record(&self) -> &TransformParameterRecord {
        &self.record
    }

    /// 变换单个点
    #[must_use]
    pub fn transform(&self, point: EastNorth) -> PixelCoord {
        let r = &self.record;
        let dx = (point.east - r.view_center.east) * r.pixels_per_unit_x;
        let dy = (r.view_center.north - point.north) * r.pixels_per_unit_y;
        let (x, y) = self.inverse.apply(dx, dy);

        PixelCoord::new(
            quantize((x - self.compensation_x) * r.scale_x + r.half_width),
            quantize((y - self.compensation_y) * r.scale_y + r.half_height),
        )
    }

    /// 批量变换
    #[must_use]
    pub fn transform_all(&self, points: &[EastNorth]) -> Vec<PixelCoord> {
        points.iter().map(|p| self.transform(*p)).collect()
    }
}

/// 由两次采样构造记录并批量正向变换
///
/// # Errors
/// 见 [`ForwardTransformer::new`]；出错时不返回任何像素
pub fn forward(
    points: &[EastNorth],
    view: &ViewportSample,
    calibration: &CalibrationSample,
) -> OverlayResult<(Vec<PixelCoord>, TransformParameterRecord)> {
    let record = TransformParameterRecord::from_samples(view, calibration);
    let transformer = ForwardTransformer::new(record)?;
    Ok((transformer.transform_all(points), record))
}
