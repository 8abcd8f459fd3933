// crates/og_foundation/src/float.rs

//! 数值常量与浮点工具
//!
//! 提供像素坐标量化与有限性检查。
//!
//! # 量化
//!
//! 导出的像素坐标统一保留 6 位小数，采用向下取整：
//! `floor(v × 10⁶) / 10⁶`。与网格点仅差几个 ULP 的值被吸附到该网格点，
//! 因此 `quantize(quantize(v)) == quantize(v)` 对所有有限值成立。
//!
//! ```
//! use og_foundation::float::quantize;
//!
//! assert_eq!(quantize(1.234_567_89), 1.234_567);
//! assert_eq!(quantize(-0.000_000_4), -0.000_001);
//! ```

// ============================================================================
// 数值常量
// ============================================================================

/// 量化倍率（6 位小数）
pub const QUANTIZATION_SCALE: f64 = 1e6;

/// 量化步长
pub const QUANTIZATION_STEP: f64 = 1.0 / QUANTIZATION_SCALE;

/// 吸附到网格点的相对容差（以机器精度为单位）
const SNAP_ULPS: f64 = 4.0;

// ============================================================================
// 量化
// ============================================================================

/// 将值向下量化到 6 位小数
///
/// 非有限值原样返回。
#[inline]
#[must_use]
pub fn quantize(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scaled = value * QUANTIZATION_SCALE;
    let nearest = scaled.round();
    let tolerance = SNAP_ULPS * f64::EPSILON * nearest.abs().max(1.0);
    let steps = if (scaled - nearest).abs() <= tolerance {
        nearest
    } else {
        scaled.floor()
    };
    steps / QUANTIZATION_SCALE
}

// ============================================================================
// 检查
// ============================================================================

/// 有限且非零
#[inline]
#[must_use]
pub fn is_finite_nonzero(value: f64) -> bool {
    value.is_finite() && value != 0.0
}
