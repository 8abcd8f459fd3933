// crates/og_geo/src/projection/zoned_tm.rs

//! 分带横轴墨卡托投影（Krüger 5 阶级数）
//!
//! 按 6° 分带确定中央经线，纬度原点为赤道，比例因子 `k₀ = 0.9996`。
//!
//! # 分带与假偏移
//!
//! - 中央经线 `λ₀ = trunc(lon / 6) * 6 + 3`，向零截断，
//!   因此 (-6°, 0°) 内的经度与 [0°, 6°) 共用 3° 中央经线。
//! - 假东 `E₀`：南半球（`lat < 0`）为 0，否则为 500 000 m。
//! - 假北 `N₀`：西经（`lon < 0`）为 10 000 000 m，否则为 0。
//!   假北由经度符号而非纬度符号决定，已有数据依赖此行为。
//!
//! 正向公式采用 Krüger α 级数，逆向采用 β/δ 级数（日本国土地理院形式）。
//!
//! # 示例
//!
//! ```
//! use og_geo::projection::{project, ZonedTransverseMercator};
//!
//! let en = project(0.0, 3.0);
//! assert!((en.east - 500_000.0).abs() < 1e-9);
//! assert!(en.north.abs() < 1e-9);
//! ```

use super::math_utils::{atanh_signed, series_cos_sinh, series_sin, series_sin_cosh};
use crate::ellipsoid::Ellipsoid;
use crate::error::{GeoError, GeoResult};
use crate::geometry::{EastNorth, LatLon};
use serde::{Deserialize, Serialize};

// ============================================================================
// 常量
// ============================================================================

/// 比例因子
pub const SCALE_FACTOR: f64 = 0.9996;

/// 分带宽度（度）
pub const ZONE_WIDTH_DEG: f64 = 6.0;

/// 北半球假东 (m)
pub const FALSE_EASTING: f64 = 500_000.0;

/// 西经假北 (m)
pub const FALSE_NORTHING: f64 = 10_000_000.0;

// ============================================================================
// 分带参数
// ============================================================================

/// 分带参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneParams {
    /// 中央经线（度）
    pub central_meridian: f64,
    /// 假东 (m)
    pub false_easting: f64,
    /// 假北 (m)
    pub false_northing: f64,
    /// 比例因子
    pub scale_factor: f64,
}

impl ZoneParams {
    /// 由坐标确定分带参数
    #[must_use]
    pub fn for_coordinate(lat: f64, lon: f64) -> Self {
        Self {
            central_meridian: (lon / ZONE_WIDTH_DEG).trunc() * ZONE_WIDTH_DEG + 3.0,
            false_easting: if lat < 0.0 { 0.0 } else { FALSE_EASTING },
            false_northing: if lon < 0.0 { FALSE_NORTHING } else { 0.0 },
            scale_factor: SCALE_FACTOR,
        }
    }
}

// ============================================================================
// 投影器
// ============================================================================

/// 固定分带的横轴墨卡托投影
///
/// 预计算级数系数，同一数据集内的所有点共用一个分带，
/// 保证正反投影一致。
#[derive(Debug, Clone)]
pub struct ZonedTransverseMercator {
    ellipsoid: Ellipsoid,
    zone: ZoneParams,
    /// 缩放常数 Ā = k₀·a/(1+n)·A₀
    am: f64,
    /// 2√n / (1+n)
    conformal_factor: f64,
    alpha: [f64; 5],
    beta: [f64; 5],
    delta: [f64; 5],
}

impl ZonedTransverseMercator {
    /// 以给定分带参数创建
    #[must_use]
    pub fn new(ellipsoid: Ellipsoid, zone: ZoneParams) -> Self {
        let n = ellipsoid.n();
        Self {
            ellipsoid,
            zone,
            am: ellipsoid.scaled_rectifying_radius(zone.scale_factor),
            conformal_factor: 2.0 * n.sqrt() / (1.0 + n),
            alpha: ellipsoid.krueger_alpha(),
            beta: ellipsoid.krueger_beta(),
            delta: ellipsoid.krueger_delta(),
        }
    }

    /// 以参考坐标所在分带创建
    #[must_use]
    pub fn for_reference(ellipsoid: Ellipsoid, reference: LatLon) -> Self {
        Self::new(ellipsoid, ZoneParams::for_coordinate(reference.lat, reference.lon))
    }

    /// 椭球体
    #[must_use]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// 分带参数
    #[must_use]
    pub fn zone(&self) -> &ZoneParams {
        &self.zone
    }

    /// 正向投影：地理坐标（度）→ 投影坐标
    #[must_use]
    pub fn project(&self, lat: f64, lon: f64) -> EastNorth {
        let sin_phi = lat.to_radians().sin();
        let dl = (lon - self.zone.central_meridian).to_radians();
        let c = self.conformal_factor;

        let t = (atanh_signed(sin_phi) - c * atanh_signed(c * sin_phi)).sinh();
        let xi = (t / dl.cos()).atan();
        let eta = atanh_signed(dl.sin() / (1.0 + t * t).sqrt());

        EastNorth::new(
            self.zone.false_easting + self.am * (eta + series_cos_sinh(&self.alpha, xi, eta)),
            self.zone.false_northing + self.am * (xi + series_sin_cosh(&self.alpha, xi, eta)),
        )
    }

    /// 带范围检查的正向投影
    ///
    /// # Errors
    /// 纬度或经度超出有效范围时返回错误
    pub fn try_project(&self, coord: LatLon) -> GeoResult<EastNorth> {
        GeoError::check_coordinate("纬度", coord.lat, -90.0, 90.0)?;
        GeoError::check_coordinate("经度", coord.lon, -180.0, 180.0)?;
        let en = self.project(coord.lat, coord.lon);
        if en.is_finite() {
            Ok(en)
        } else {
            Err(GeoError::projection_failed("正向投影", format!("{coord:?} 结果非有限")))
        }
    }

    /// 逆向投影：投影坐标 → 地理坐标（度）
    #[must_use]
    pub fn unproject(&self, en: EastNorth) -> LatLon {
        let xi = (en.north - self.zone.false_northing) / self.am;
        let eta = (en.east - self.zone.false_easting) / self.am;

        let xi_p = xi - series_sin_cosh(&self.beta, xi, eta);
        let eta_p = eta - series_cos_sinh(&self.beta, xi, eta);

        let chi = (xi_p.sin() / eta_p.cosh()).asin();
        let phi = chi + series_sin(&self.delta, chi);
        let dl = eta_p.sinh().atan2(xi_p.cos());

        LatLon::new(phi.to_degrees(), self.zone.central_meridian + dl.to_degrees())
    }
}

// ============================================================================
// 逐点自动分带
// ============================================================================

/// WGS84 椭球下逐点分带的正向投影
///
/// 每个点按自身经纬度选择分带与假偏移。
#[must_use]
pub fn project(lat: f64, lon: f64) -> EastNorth {
    project_with(&Ellipsoid::WGS84, lat, lon)
}

/// 指定椭球的逐点分带正向投影
#[must_use]
pub fn project_with(ellipsoid: &Ellipsoid, lat: f64, lon: f64) -> EastNorth {
    ZonedTransverseMercator::new(*ellipsoid, ZoneParams::for_coordinate(lat, lon)).project(lat, lon)
}
