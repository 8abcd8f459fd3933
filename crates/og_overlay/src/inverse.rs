// crates/og_overlay/src/inverse.rs

//! 反向变换：叠加图像像素坐标 → 投影坐标 → 地理坐标
//!
//! 只依赖持久化的参数记录，不需要当前视图状态。

use crate::collaborators::PixelCoord;
use crate::error::{OverlayError, OverlayResult};
use crate::forward::anchor_compensation;
use crate::record::{TransformParameterRecord, X_IMAGE_KEY, Y_IMAGE_KEY};
use og_geo::{AffineTransform, EastNorth, LatLon, ZonedTransverseMercator};
use std::collections::BTreeMap;

/// 反向变换器
#[derive(Debug, Clone)]
pub struct InverseTransformer {
    record: TransformParameterRecord,
    matrix: AffineTransform,
    compensation_x: f64,
    compensation_y: f64,
}

impl InverseTransformer {
    /// 创建变换器
    ///
    /// # Errors
    /// 记录无法用于反算时返回 [`OverlayError::MalformedPersistedRecord`]；
    /// 零对角缩放且偏移非零时返回 [`OverlayError::DegenerateAnchorScale`]
    pub fn new(record: TransformParameterRecord) -> OverlayResult<Self> {
        record.validate()?;
        let matrix = record.calibration();
        Ok(Self {
            record,
            matrix,
            compensation_x: anchor_compensation(record.image_offset_x, matrix.scale_x(), 'x')?,
            compensation_y: anchor_compensation(record.image_offset_y, matrix.scale_y(), 'y')?,
        })
    }

    /// 参数记录
    pub fn record(&self) -> &TransformParameterRecord {
        &self.record
    }

    /// 像素坐标 → 投影坐标
    #[must_use]
    pub fn east_north(&self, pixel: PixelCoord) -> EastNorth {
        let r = &self.record;
        let x = (pixel.x - r.half_width) / r.scale_x + self.compensation_x;
        let y = (pixel.y - r.half_height) / r.scale_y + self.compensation_y;
        let (sx, sy) = self.matrix.apply(x, y);

        EastNorth::new(
            sx / r.pixels_per_unit_x + r.view_center.east,
            r.view_center.north - sy / r.pixels_per_unit_y,
        )
    }

    /// 像素坐标 → 地理坐标
    #[must_use]
    pub fn lat_lon(&self, pixel: PixelCoord, projection: &ZonedTransverseMercator) -> LatLon {
        projection.unproject(self.east_north(pixel))
    }
}

/// 以参数记录反算单个像素坐标
///
/// # Errors
/// 见 [`InverseTransformer::new`]
pub fn inverse(pixel: PixelCoord, record: &TransformParameterRecord) -> OverlayResult<EastNorth> {
    Ok(InverseTransformer::new(*record)?.east_north(pixel))
}

/// 从图元属性读取像素坐标对
///
/// 两个键都不存在时返回 `Ok(None)`。
///
/// # Errors
/// - 只有一个键: [`OverlayError::IncompleteAttributePair`]
/// - 值不是有限数值: [`OverlayError::InvalidPixelAttribute`]
pub fn pixel_from_attributes(tags: &BTreeMap<String, String>) -> OverlayResult<Option<PixelCoord>> {
    let parse = |key: &'static str, text: &String| -> OverlayResult<f64> {
        text.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| OverlayError::InvalidPixelAttribute {
                key,
                value: text.clone(),
            })
    };

    match (tags.get(X_IMAGE_KEY), tags.get(Y_IMAGE_KEY)) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(OverlayError::IncompleteAttributePair { missing: Y_IMAGE_KEY }),
        (None, Some(_)) => Err(OverlayError::IncompleteAttributePair { missing: X_IMAGE_KEY }),
        (Some(x), Some(y)) => Ok(Some(PixelCoord::new(
            parse(X_IMAGE_KEY, x)?,
            parse(Y_IMAGE_KEY, y)?,
        ))),
    }
}
