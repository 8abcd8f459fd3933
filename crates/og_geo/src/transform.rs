// crates/og_geo/src/transform.rs
//! 二维仿射变换
//!
//! 叠加图层的标定矩阵以 `[m00, m10, m01, m11, m02, m12]` 的扁平顺序持久化，
//! 即先按列存放线性部分，最后两项为平移量。
//!
//! # 示例
//!
//! ```
//! use og_geo::transform::AffineTransform;
//!
//! let m = AffineTransform::from_flat_matrix([2.0, 0.0, 0.0, 2.0, 10.0, 20.0]);
//! assert_eq!(m.apply(1.0, 1.0), (12.0, 22.0));
//!
//! let linear = m.without_translation();
//! assert_eq!(linear.to_flat_matrix()[4], 0.0);
//! assert_eq!(m.c, 10.0); // 原值不变
//! ```

use crate::error::{GeoError, GeoResult};
use serde::{Deserialize, Serialize};

/// 行列式绝对值低于此阈值视为奇异
pub const SINGULAR_EPSILON: f64 = 1e-15;

// ============================================================================
// 仿射变换矩阵
// ============================================================================

/// 仿射变换矩阵
///
/// 变换公式：
/// - x' = a*x + b*y + c
/// - y' = d*x + e*y + f
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    /// x 方向缩放系数 (m00)
    pub a: f64,
    /// x 方向倾斜系数 (m01)
    pub b: f64,
    /// x 平移量 (m02)
    pub c: f64,
    /// y 方向倾斜系数 (m10)
    pub d: f64,
    /// y 方向缩放系数 (m11)
    pub e: f64,
    /// y 平移量 (m12)
    pub f: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    /// 恒等变换
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 1.0,
            f: 0.0,
        }
    }

    /// 仅含线性部分的变换
    #[must_use]
    pub const fn linear(a: f64, b: f64, d: f64, e: f64) -> Self {
        Self {
            a,
            b,
            c: 0.0,
            d,
            e,
            f: 0.0,
        }
    }

    /// 从扁平矩阵创建
    ///
    /// 顺序: `[m00, m10, m01, m11, m02, m12]`
    #[must_use]
    pub const fn from_flat_matrix(m: [f64; 6]) -> Self {
        Self {
            a: m[0],
            d: m[1],
            b: m[2],
            e: m[3],
            c: m[4],
            f: m[5],
        }
    }

    /// 转换为扁平矩阵
    #[must_use]
    pub const fn to_flat_matrix(&self) -> [f64; 6] {
        [self.a, self.d, self.b, self.e, self.c, self.f]
    }

    /// 去掉平移分量，返回新的变换
    #[must_use]
    pub const fn without_translation(&self) -> Self {
        Self::linear(self.a, self.b, self.d, self.e)
    }

    /// x 轴缩放 (m00)
    #[inline]
    #[must_use]
    pub fn scale_x(&self) -> f64 {
        self.a
    }

    /// y 轴缩放 (m11)
    #[inline]
    #[must_use]
    pub fn scale_y(&self) -> f64 {
        self.e
    }

    /// 应用正向变换
    #[inline]
    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.b * y + self.c,
            self.d * x + self.e * y + self.f,
        )
    }

    /// 计算逆变换，奇异时返回错误
    ///
    /// # Errors
    /// 行列式为零、接近零或非有限时返回 [`GeoError::SingularTransform`]
    pub fn try_inverse(&self) -> GeoResult<Self> {
        let det = self.determinant();
        if !(det.abs() >= SINGULAR_EPSILON) || !det.is_finite() {
            return Err(GeoError::singular_transform(det));
        }
        let inv_det = 1.0 / det;
        Ok(Self {
            a: self.e * inv_det,
            b: -self.b * inv_det,
            c: (self.b * self.f - self.c * self.e) * inv_det,
            d: -self.d * inv_det,
            e: self.a * inv_det,
            f: (self.c * self.d - self.a * self.f) * inv_det,
        })
    }

    /// 获取变换的行列式
    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.a * self.e - self.b * self.d
    }

    /// 所有系数均为有限值
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.to_flat_matrix().iter().all(|v| v.is_finite())
    }
}

// ============================================================================
// 测试
// ============================================================================
