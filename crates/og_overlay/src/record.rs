// crates/og_overlay/src/record.rs

//! 变换参数记录
//!
//! 导出时把视口采样和标定采样合并为一组固定的标量字段，
//! 以文本属性的形式存放在数据集中唯一的载体图元上。
//! 之后无需原始视图状态即可由像素坐标反算投影坐标。
//!
//! # 持久化键
//!
//! | 键 | 字段 |
//! |----|------|
//! | `m0`..`m5` | 扁平矩阵 `[m00, m10, m01, m11, m02, m12]`（`m4`、`m5` 恒为 0） |
//! | `view_center_lon` / `view_center_lat` | 视图中心东向 / 北向投影坐标 |
//! | `pixel_per_en_x` / `pixel_per_en_y` | 每投影单位像素数 |
//! | `pic_offset_x` / `pic_offset_y` | 锚点相对视图中心的像素偏移 |
//! | `scaleX` / `scaleY` | 缩放修正 |
//! | `hw` / `hh` | 图像半宽 / 半高 |
//!
//! 载体以标记键 [`TRANSFORM_MARKER_KEY`] 识别。

use crate::error::{OverlayError, OverlayResult};
use crate::sampler::{CalibrationSample, ViewportSample};
use og_foundation::float::is_finite_nonzero;
use og_geo::{AffineTransform, EastNorth};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 载体标记键
pub const TRANSFORM_MARKER_KEY: &str = "transform matrix";

/// 载体标记值
pub const TRANSFORM_MARKER_VALUE: &str = "yes";

/// 像素 x 属性键
pub const X_IMAGE_KEY: &str = "X_image";

/// 像素 y 属性键
pub const Y_IMAGE_KEY: &str = "Y_image";

const MATRIX_KEYS: [&str; 6] = ["m0", "m1", "m2", "m3", "m4", "m5"];
const VIEW_CENTER_EAST_KEY: &str = "view_center_lon";
const VIEW_CENTER_NORTH_KEY: &str = "view_center_lat";
const PPU_X_KEY: &str = "pixel_per_en_x";
const PPU_Y_KEY: &str = "pixel_per_en_y";
const OFFSET_X_KEY: &str = "pic_offset_x";
const OFFSET_Y_KEY: &str = "pic_offset_y";
const SCALE_X_KEY: &str = "scaleX";
const SCALE_Y_KEY: &str = "scaleY";
const HALF_WIDTH_KEY: &str = "hw";
const HALF_HEIGHT_KEY: &str = "hh";

/// 全部持久化键（不含标记键）
pub const RECORD_KEYS: [&str; 16] = [
    "m0",
    "m1",
    "m2",
    "m3",
    "m4",
    "m5",
    VIEW_CENTER_EAST_KEY,
    VIEW_CENTER_NORTH_KEY,
    PPU_X_KEY,
    PPU_Y_KEY,
    OFFSET_X_KEY,
    OFFSET_Y_KEY,
    SCALE_X_KEY,
    SCALE_Y_KEY,
    HALF_WIDTH_KEY,
    HALF_HEIGHT_KEY,
];

/// 变换参数记录（每个数据集一份）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformParameterRecord {
    /// 去平移的扁平标定矩阵
    pub matrix: [f64; 6],
    /// 导出时的视图中心
    pub view_center: EastNorth,
    /// 每东向单位像素数
    pub pixels_per_unit_x: f64,
    /// 每北向单位像素数
    pub pixels_per_unit_y: f64,
    /// 锚点 x 像素偏移
    pub image_offset_x: f64,
    /// 锚点 y 像素偏移
    pub image_offset_y: f64,
    /// x 缩放修正
    pub scale_x: f64,
    /// y 缩放修正
    pub scale_y: f64,
    /// 图像半宽
    pub half_width: f64,
    /// 图像半高
    pub half_height: f64,
}

impl TransformParameterRecord {
    /// 由两次采样构造
    #[must_use]
    pub fn from_samples(view: &ViewportSample, calibration: &CalibrationSample) -> Self {
        Self {
            matrix: calibration.matrix.without_translation().to_flat_matrix(),
            view_center: view.center,
            pixels_per_unit_x: view.pixels_per_unit_x,
            pixels_per_unit_y: view.pixels_per_unit_y,
            image_offset_x: calibration.image_offset_x,
            image_offset_y: calibration.image_offset_y,
            scale_x: calibration.scale_x,
            scale_y: calibration.scale_y,
            half_width: calibration.half_width,
            half_height: calibration.half_height,
        }
    }

    /// 标定矩阵（线性部分）
    #[must_use]
    pub fn calibration(&self) -> AffineTransform {
        AffineTransform::from_flat_matrix(self.matrix).without_translation()
    }

    /// 检查记录能否用于反算
    ///
    /// # Errors
    /// 字段非有限、密度或缩放为零时返回
    /// [`OverlayError::MalformedPersistedRecord`]
    pub fn validate(&self) -> OverlayResult<()> {
        for (key, value) in self.fields() {
            if !value.is_finite() {
                return Err(OverlayError::malformed_record(key));
            }
        }
        for (key, value) in [
            (PPU_X_KEY, self.pixels_per_unit_x),
            (PPU_Y_KEY, self.pixels_per_unit_y),
            (SCALE_X_KEY, self.scale_x),
            (SCALE_Y_KEY, self.scale_y),
        ] {
            if !is_finite_nonzero(value) {
                return Err(OverlayError::malformed_record(key));
            }
        }
        Ok(())
    }

    /// 按持久化键顺序列出 (键, 值)
    fn fields(&self) -> [(&'static str, f64); 16] {
        let m = self.matrix;
        [
            (MATRIX_KEYS[0], m[0]),
            (MATRIX_KEYS[1], m[1]),
            (MATRIX_KEYS[2], m[2]),
            (MATRIX_KEYS[3], m[3]),
            (MATRIX_KEYS[4], m[4]),
            (MATRIX_KEYS[5], m[5]),
            (VIEW_CENTER_EAST_KEY, self.view_center.east),
            (VIEW_CENTER_NORTH_KEY, self.view_center.north),
            (PPU_X_KEY, self.pixels_per_unit_x),
            (PPU_Y_KEY, self.pixels_per_unit_y),
            (OFFSET_X_KEY, self.image_offset_x),
            (OFFSET_Y_KEY, self.image_offset_y),
            (SCALE_X_KEY, self.scale_x),
            (SCALE_Y_KEY, self.scale_y),
            (HALF_WIDTH_KEY, self.half_width),
            (HALF_HEIGHT_KEY, self.half_height),
        ]
    }

    /// 序列化为属性（含标记键）
    #[must_use]
    pub fn to_attributes(&self) -> BTreeMap<String, String> {
        let mut tags: BTreeMap<String, String> = self
            .fields()
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.to_string()))
            .collect();
        tags.insert(
            TRANSFORM_MARKER_KEY.to_string(),
            TRANSFORM_MARKER_VALUE.to_string(),
        );
        tags
    }

    /// 从属性解析
    ///
    /// `m4`/`m5` 非零的记录照常接受，平移分量在解析时清零。
    ///
    /// # Errors
    /// 任一键缺失、无法解析为有限数值或记录无法用于反算时返回
    /// [`OverlayError::MalformedPersistedRecord`]，其中注明出错的键
    pub fn from_attributes(tags: &BTreeMap<String, String>) -> OverlayResult<Self> {
        let get = |key: &'static str| -> OverlayResult<f64> {
            tags.get(key)
                .and_then(|text| text.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .ok_or_else(|| OverlayError::malformed_record(key))
        };

        let mut matrix = [0.0; 6];
        for (slot, key) in matrix.iter_mut().zip(MATRIX_KEYS) {
            *slot = get(key)?;
        }
        if matrix[4] != 0.0 || matrix[5] != 0.0 {
            tracing::debug!(
                "Transform record translation ({}, {}) stripped",
                matrix[4],
                matrix[5]
            );
            matrix[4] = 0.0;
            matrix[5] = 0.0;
        }

        let record = Self {
            matrix,
            view_center: EastNorth::new(get(VIEW_CENTER_EAST_KEY)?, get(VIEW_CENTER_NORTH_KEY)?),
            pixels_per_unit_x: get(PPU_X_KEY)?,
            pixels_per_unit_y: get(PPU_Y_KEY)?,
            image_offset_x: get(OFFSET_X_KEY)?,
            image_offset_y: get(OFFSET_Y_KEY)?,
            scale_x: get(SCALE_X_KEY)?,
            scale_y: get(SCALE_Y_KEY)?,
            half_width: get(HALF_WIDTH_KEY)?,
            half_height: get(HALF_HEIGHT_KEY)?,
        };
        record.validate()?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> TransformParameterRecord {
        TransformParameterRecord {
            matrix: [0.9, 0.1, -0.1, 0.9, 0.0, 0.0],
            view_center: EastNorth::new(500_123.25, 4_500_456.5),
            pixels_per_unit_x: 12.5,
            pixels_per_unit_y: 12.25,
            image_offset_x: -31.75,
            image_offset_y: 18.0,
            scale_x: 0.8,
            scale_y: 0.8125,
            half_width: 640.0,
            half_height: 360.5,
        }
    }

    #[test]
    fn test_attributes_contain_every_key_and_marker() {
        let tags = sample_record().to_attributes();
        for key in RECORD_KEYS {
            assert!(tags.contains_key(key), "缺少键 {key}");
        }
        assert_eq!(tags.get(TRANSFORM_MARKER_KEY).map(String::as_str), Some("yes"));
        assert_eq!(tags.len(), RECORD_KEYS.len() + 1);
    }

    #[test]
    fn test_parse_written_attributes() {
        let record = sample_record();
        let parsed = TransformParameterRecord::from_attributes(&record.to_attributes()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_missing_scale_y_is_malformed() {
        let mut tags = sample_record().to_attributes();
        tags.remove("scaleY");
        match TransformParameterRecord::from_attributes(&tags) {
            Err(OverlayError::MalformedPersistedRecord { key }) => assert_eq!(key, "scaleY"),
            other => panic!("期望 MalformedPersistedRecord, 得到 {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_value_is_malformed() {
        let mut tags = sample_record().to_attributes();
        tags.insert("hw".to_string(), "wide".to_string());
        assert!(matches!(
            TransformParameterRecord::from_attributes(&tags),
            Err(OverlayError::MalformedPersistedRecord { key }) if key == "hw"
        ));
    }

    #[test]
    fn test_zero_scale_is_malformed() {
        let mut tags = sample_record().to_attributes();
        tags.insert("scaleX".to_string(), "0".to_string());
        assert!(TransformParameterRecord::from_attributes(&tags).is_err());
    }

    #[test]
    fn test_persisted_translation_is_stripped() {
        let mut tags = sample_record().to_attributes();
        tags.insert("m4".to_string(), "12.5".to_string());
        tags.insert("m5".to_string(), "-3".to_string());
        let parsed = TransformParameterRecord::from_attributes(&tags).unwrap();
        assert_eq!(parsed, sample_record());

        let mut record = sample_record();
        record.matrix[5] = 3.0;
        assert!(record.validate().is_ok());
        assert_eq!(record.calibration().to_flat_matrix()[5], 0.0);
    }

    #[test]
    fn test_from_samples_strips_translation() {
        let view = ViewportSample {
            center: EastNorth::new(10.0, 20.0),
            pixels_per_unit_x: 2.0,
            pixels_per_unit_y: 3.0,
        };
        let calibration = CalibrationSample {
            matrix: AffineTransform::from_flat_matrix([1.0, 0.0, 0.0, 1.0, 7.0, 9.0]),
            image_offset_x: 1.0,
            image_offset_y: 2.0,
            scale_x: 1.0,
            scale_y: 1.0,
            pristine_scale: 1.0,
            half_width: 5.0,
            half_height: 5.0,
        };
        let record = TransformParameterRecord::from_samples(&view, &calibration);
        assert_eq!(record.matrix[4], 0.0);
        assert_eq!(record.matrix[5], 0.0);
    }
}
