// crates/og_overlay/src/error.rs

//! 叠加图层标定错误类型
//!
//! 导出、导入与实时编辑在操作边界恢复这些错误：
//! 导出回退为不写像素属性，导入保留解析时的坐标，实时编辑静默忽略。

use thiserror::Error;

/// 标定模块结果类型
pub type OverlayResult<T> = Result<T, OverlayError>;

/// 叠加图层标定错误
#[derive(Debug, Error)]
pub enum OverlayError {
    /// 标定矩阵奇异
    #[error("calibration matrix is not invertible (determinant {determinant:e})")]
    NonInvertibleCalibration {
        /// 去平移后矩阵的行列式
        determinant: f64,
    },

    /// 没有活动的叠加图层
    #[error("no active image overlay")]
    MissingOverlay,

    /// 标定属性无法获取
    #[error("calibration field '{field}' is unavailable")]
    CalibrationUnavailable {
        /// 属性名
        field: &'static str,
    },

    /// 视口像素密度退化
    #[error("viewport is degenerate: {reason}")]
    DegenerateViewport {
        /// 原因
        reason: String,
    },

    /// 锚点补偿所用的矩阵对角缩放为零且偏移非零
    #[error("anchor offset {offset} cannot be compensated on axis {axis} with zero matrix scale")]
    DegenerateAnchorScale {
        /// 轴（x 或 y）
        axis: char,
        /// 像素偏移
        offset: f64,
    },

    /// 持久化的参数记录字段缺失或无法解析
    #[error("persisted transform record is malformed at key '{key}'")]
    MalformedPersistedRecord {
        /// 出错的键
        key: String,
    },

    /// 数据集中没有参数记录
    #[error("dataset carries no transform record")]
    MissingTransformRecord,

    /// 像素属性对不完整
    #[error("pixel attribute pair is incomplete: '{missing}' is missing")]
    IncompleteAttributePair {
        /// 缺失的键
        missing: &'static str,
    },

    /// 像素属性无法解析
    #[error("pixel attribute '{key}' has non-numeric value '{value}'")]
    InvalidPixelAttribute {
        /// 键
        key: &'static str,
        /// 原始文本
        value: String,
    },

    /// 图元不存在
    #[error("primitive not found: {0}")]
    PrimitiveNotFound(String),

    /// CSV 读取错误
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON 序列化错误
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// 便捷构造函数
// ============================================================================

impl OverlayError {
    /// 创建参数记录损坏错误
    #[inline]
    pub fn malformed_record(key: impl Into<String>) -> Self {
        Self::MalformedPersistedRecord { key: key.into() }
    }

    /// 创建标定属性不可用错误
    #[inline]
    pub fn calibration_unavailable(field: &'static str) -> Self {
        Self::CalibrationUnavailable { field }
    }

    /// 创建视口退化错误
    #[inline]
    pub fn degenerate_viewport(reason: impl Into<String>) -> Self {
        Self::DegenerateViewport {
            reason: reason.into(),
        }
    }

    /// 是否属于标定/记录类错误（在操作边界以回退方式恢复）
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NonInvertibleCalibration { .. }
                | Self::MissingOverlay
                | Self::CalibrationUnavailable { .. }
                | Self::DegenerateViewport { .. }
                | Self::DegenerateAnchorScale { .. }
                | Self::MalformedPersistedRecord { .. }
                | Self::MissingTransformRecord
                | Self::IncompleteAttributePair { .. }
                | Self::InvalidPixelAttribute { .. }
        )
    }
}
