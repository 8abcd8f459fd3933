// crates/og_geo/src/ellipsoid.rs
//! 椭球体定义
//!
//! 提供地球椭球体参数以及横轴墨卡托 5 阶级数所需的派生系数。
//!
//! # 示例
//!
//! ```
//! use og_geo::ellipsoid::Ellipsoid;
//!
//! let wgs84 = Ellipsoid::WGS84;
//! assert!((wgs84.n() - wgs84.f / (2.0 - wgs84.f)).abs() < 1e-18);
//! ```

use serde::{Deserialize, Serialize};

/// 地球椭球体
///
/// 以长半轴 `a` 与扁率 `f` 定义，其余参数按需派生。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// 长半轴 (m)
    pub a: f64,
    /// 扁率 (flattening)
    pub f: f64,
}

impl Ellipsoid {
    // ========================================================================
    // 预定义椭球体
    // ========================================================================

    /// WGS84 椭球体 (GPS 标准)
    ///
    /// - 长半轴: 6378137.0 m
    /// - 扁率: 1/298.257223563
    pub const WGS84: Self = Self {
        a: 6_378_137.0,
        f: 1.0 / 298.257_223_563,
    };

    /// GRS80 椭球体
    ///
    /// - 长半轴: 6378137.0 m
    /// - 扁率: 1/298.257222101
    pub const GRS80: Self = Self {
        a: 6_378_137.0,
        f: 1.0 / 298.257_222_101,
    };

    // ========================================================================
    // 构造方法
    // ========================================================================

    /// 从长半轴和扁率创建椭球体
    #[must_use]
    pub const fn new(a: f64, f: f64) -> Self {
        Self { a, f }
    }

    /// 参数是否可用于投影计算
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.a.is_finite() && self.a > 0.0 && self.f.is_finite() && (0.0..1.0).contains(&self.f)
    }

    // ========================================================================
    // 派生参数
    // ========================================================================

    /// 短半轴 b = a(1-f)
    #[inline]
    #[must_use]
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// 第一偏心率的平方 e² = 2f - f²
    #[inline]
    #[must_use]
    pub fn e2(&self) -> f64 {
        2.0 * self.f - self.f * self.f
    }

    /// 第三扁率 n = f / (2 - f)
    #[inline]
    #[must_use]
    pub fn n(&self) -> f64 {
        self.f / (2.0 - self.f)
    }

    // ========================================================================
    // Krüger 5 阶级数系数
    // ========================================================================

    /// 正向投影 α 系数（5 阶）
    #[must_use]
    pub fn krueger_alpha(&self) -> [f64; 5] {
        let [n, n2, n3, n4, n5] = self.n_powers();
        [
            n / 2.0 - (2.0 / 3.0) * n2 + (5.0 / 16.0) * n3 + (41.0 / 180.0) * n4
                - (127.0 / 288.0) * n5,
            (13.0 / 48.0) * n2 - (3.0 / 5.0) * n3 + (557.0 / 1440.0) * n4
                + (281.0 / 630.0) * n5,
            (61.0 / 240.0) * n3 - (103.0 / 140.0) * n4 + (15061.0 / 26880.0) * n5,
            (49561.0 / 161280.0) * n4 - (179.0 / 168.0) * n5,
            (34729.0 / 80640.0) * n5,
        ]
    }

    /// 逆向投影 β 系数（5 阶）
    #[must_use]
    pub fn krueger_beta(&self) -> [f64; 5] {
        let [n, n2, n3, n4, n5] = self.n_powers();
        [
            n / 2.0 - (2.0 / 3.0) * n2 + (37.0 / 96.0) * n3 - (1.0 / 360.0) * n4
                - (81.0 / 512.0) * n5,
            (1.0 / 48.0) * n2 + (1.0 / 15.0) * n3 - (437.0 / 1440.0) * n4
                + (46.0 / 105.0) * n5,
            (17.0 / 480.0) * n3 - (37.0 / 840.0) * n4 - (209.0 / 4480.0) * n5,
            (4397.0 / 161280.0) * n4 - (11.0 / 504.0) * n5,
            (4583.0 / 161280.0) * n5,
        ]
    }

    /// 共形纬度回算 δ 系数（5 阶）
    #[must_use]
    pub fn krueger_delta(&self) -> [f64; 5] {
        let [n, n2, n3, n4, n5] = self.n_powers();
        [
            2.0 * n - (2.0 / 3.0) * n2 - 2.0 * n3 + (116.0 / 45.0) * n4 + (26.0 / 45.0) * n5,
            (7.0 / 3.0) * n2 - (8.0 / 5.0) * n3 - (227.0 / 45.0) * n4 + (2704.0 / 315.0) * n5,
            (56.0 / 15.0) * n3 - (136.0 / 35.0) * n4 - (1262.0 / 105.0) * n5,
            (4279.0 / 630.0) * n4 - (332.0 / 35.0) * n5,
            (4174.0 / 315.0) * n5,
        ]
    }

    /// 子午线弧长系数 A₀ = 1 + n²/4 + n⁴/64
    #[must_use]
    pub fn rectifying_factor(&self) -> f64 {
        let [_, n2, _, n4, _] = self.n_powers();
        1.0 + n2 / 4.0 + n4 / 64.0
    }

    /// 缩放常数 Ā = k₀·a / (1+n) · A₀
    #[must_use]
    pub fn scaled_rectifying_radius(&self, k0: f64) -> f64 {
        k0 * self.a / (1.0 + self.n()) * self.rectifying_factor()
    }

    fn n_powers(&self) -> [f64; 5] {
        let n = self.n();
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        [n, n2, n3, n4, n4 * n]
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}

impl std::fmt::Display for Ellipsoid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ellipsoid(a={}, f=1/{:.9})", self.a, 1.0 / self.f)
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wgs84_parameters() {
        let e = Ellipsoid::WGS84;

        assert!((e.a - 6_378_137.0).abs() < 1e-6);
        // 短半轴标准值约 6356752.314245
        assert!((e.b() - 6_356_752.314_245).abs() < 0.001);
        assert!((e.e2() - 0.006_694_379_990_14).abs() < 1e-12);
        assert!(e.is_valid());
    }

    #[test]
    fn test_krueger_coefficients() {
        let e = Ellipsoid::WGS84;
        let alpha = e.krueger_alpha();
        let beta = e.krueger_beta();
        let delta = e.krueger_delta();

        for i in 0..5 {
            assert!(alpha[i].abs() < 1.0);
            assert!(beta[i].abs() < 1.0);
            assert!(delta[i].abs() < 1.0);
        }
        // 高阶系数应该更小
        assert!(alpha[4].abs() < alpha[0].abs());
        assert!(beta[4].abs() < beta[0].abs());
        assert!(delta[4].abs() < delta[0].abs());
        // α₁ ≈ β₁ ≈ n/2
        assert!((alpha[0] - e.n() / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_scaled_rectifying_radius() {
        let e = Ellipsoid::WGS84;
        // UTM 的 k₀·A 约为 6364902.166 m
        let am = e.scaled_rectifying_radius(0.9996);
        assert!((am - 6_364_902.166).abs() < 0.01, "Ā = {am}");
    }

    #[test]
    fn test_invalid_ellipsoid() {
        assert!(!Ellipsoid::new(0.0, 0.003).is_valid());
        assert!(!Ellipsoid::new(6_378_137.0, 1.5).is_valid());
        assert!(!Ellipsoid::new(f64::NAN, 0.003).is_valid());
    }
}
