// crates/og_geo/src/geometry.rs
//! 坐标类型定义
//!
//! - [`EastNorth`]: 投影平面坐标（东向、北向，单位为投影单位）
//! - [`LatLon`]: 地理坐标（度）

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

// ============================================================================
// EastNorth - 投影坐标
// ============================================================================

/// 投影平面坐标
///
/// ```
/// use og_geo::geometry::EastNorth;
///
/// let a = EastNorth::new(500_000.0, 4_500_000.0);
/// let b = a + EastNorth::new(1.0, -2.0);
/// assert_eq!(b.north, 4_499_998.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EastNorth {
    /// 东向坐标
    pub east: f64,
    /// 北向坐标
    pub north: f64,
}

impl EastNorth {
    /// 创建投影坐标
    #[inline]
    #[must_use]
    pub const fn new(east: f64, north: f64) -> Self {
        Self { east, north }
    }

    /// 两个分量均为有限值
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.east.is_finite() && self.north.is_finite()
    }

    /// 欧几里得距离
    #[inline]
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.east - other.east).hypot(self.north - other.north)
    }
}

impl Add for EastNorth {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.east + rhs.east, self.north + rhs.north)
    }
}

impl Sub for EastNorth {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.east - rhs.east, self.north - rhs.north)
    }
}

// ============================================================================
// LatLon - 地理坐标
// ============================================================================

/// 地理坐标（度）
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// 纬度 [-90, 90]
    pub lat: f64,
    /// 经度 [-180, 180]
    pub lon: f64,
}

impl LatLon {
    /// 创建地理坐标
    #[inline]
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// 坐标是否在有效范围内
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }
}
