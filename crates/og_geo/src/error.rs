// crates/og_geo/src/error.rs
//! 地理空间处理错误类型
//!
//! 包含投影转换、坐标范围与仿射变换相关的错误。

use thiserror::Error;

/// Geo 模块结果类型
pub type GeoResult<T> = Result<T, GeoError>;

/// 地理空间处理错误
#[derive(Error, Debug)]
pub enum GeoError {
    /// 坐标超出有效范围
    #[error("{coord_type} 超出范围: {value:.6} (允许范围: {min} 到 {max})")]
    CoordinateOutOfRange {
        /// 坐标类型（如"纬度"、"经度"）
        coord_type: &'static str,
        /// 实际值
        value: f64,
        /// 最小允许值
        min: f64,
        /// 最大允许值
        max: f64,
    },

    /// 投影转换失败
    #[error("投影转换失败: {operation}: {message}")]
    ProjectionFailed {
        /// 操作类型（如"正向投影"、"逆向投影"）
        operation: &'static str,
        /// 错误详情
        message: String,
    },

    /// 仿射变换矩阵奇异（不可逆）
    #[error("仿射变换矩阵奇异（行列式 {determinant:e} 接近零）")]
    SingularTransform {
        /// 行列式
        determinant: f64,
    },
}

// ============================================================================
// 便捷构造函数
// ============================================================================

impl GeoError {
    /// 创建坐标越界错误
    #[inline]
    pub fn coordinate_out_of_range(
        coord_type: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Self {
        Self::CoordinateOutOfRange {
            coord_type,
            value,
            min,
            max,
        }
    }

    /// 创建投影转换失败错误
    #[inline]
    pub fn projection_failed(operation: &'static str, message: impl Into<String>) -> Self {
        Self::ProjectionFailed {
            operation,
            message: message.into(),
        }
    }

    /// 创建奇异变换错误
    #[inline]
    pub fn singular_transform(determinant: f64) -> Self {
        Self::SingularTransform { determinant }
    }

    /// 验证坐标范围
    #[inline]
    pub fn check_coordinate(
        coord_type: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<(), Self> {
        if !(min..=max).contains(&value) {
            Err(Self::coordinate_out_of_range(coord_type, value, min, max))
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_out_of_range_error() {
        let err = GeoError::coordinate_out_of_range("纬度", 95.5, -90.0, 90.0);
        let msg = format!("{}", err);
        assert!(msg.contains("纬度"));
        assert!(msg.contains("95.5"));
    }

    #[test]
    fn test_singular_transform_error() {
        let err = GeoError::singular_transform(0.0);
        assert!(matches!(err, GeoError::SingularTransform { .. }));
        assert!(err.to_string().contains("奇异"));
    }

    #[test]
    fn test_check_coordinate() {
        assert!(GeoError::check_coordinate("经度", 120.0, -180.0, 180.0).is_ok());
        assert!(GeoError::check_coordinate("经度", 200.0, -180.0, 180.0).is_err());
        assert!(GeoError::check_coordinate("经度", f64::NAN, -180.0, 180.0).is_err());
    }
}
