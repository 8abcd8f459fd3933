// crates/og_geo/src/projection/math_utils.rs

//! 投影计算用的数学工具

/// 保留符号的反双曲正切
///
/// 依据浮点数的符号位而不是数值比较来判断符号，
/// 因此 `atanh_signed(-0.0)` 返回 `-0.0`。
///
/// ```
/// use og_geo::projection::atanh_signed;
///
/// assert_eq!(atanh_signed(-0.0).to_bits(), (-0.0_f64).to_bits());
/// assert!((atanh_signed(0.5) - 0.5_f64.atanh()).abs() < 1e-15);
/// ```
#[inline]
#[must_use]
pub fn atanh_signed(x: f64) -> f64 {
    let (a, mult) = if x.is_sign_negative() {
        (x.abs(), -0.5)
    } else {
        (x, 0.5)
    };
    mult * ((1.0 + a) / (1.0 - a)).ln()
}

/// Krüger 级数的 x 分量：Σ cⱼ·cos(2jξ)·sinh(2jη)
#[inline]
pub(crate) fn series_cos_sinh(coeffs: &[f64; 5], xi: f64, eta: f64) -> f64 {
    coeffs
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let k = 2.0 * (i + 1) as f64;
            c * (k * xi).cos() * (k * eta).sinh()
        })
        .sum()
}

/// Krüger 级数的 y 分量：Σ cⱼ·sin(2jξ)·cosh(2jη)
#[inline]
pub(crate) fn series_sin_cosh(coeffs: &[f64; 5], xi: f64, eta: f64) -> f64 {
    coeffs
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let k = 2.0 * (i + 1) as f64;
            c * (k * xi).sin() * (k * eta).cosh()
        })
        .sum()
}

/// 纬度回算级数：Σ cⱼ·sin(2jχ)
#[inline]
pub(crate) fn series_sin(coeffs: &[f64; 5], chi: f64) -> f64 {
    coeffs
        .iter()
        .enumerate()
        .map(|(i, c)| c * (2.0 * (i + 1) as f64 * chi).sin())
        .sum()
}
