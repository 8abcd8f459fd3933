// crates/og_geo/src/projection/mod.rs

//! 投影转换
//!
//! 提供分带横轴墨卡托投影（地理坐标 ⇄ 投影平面坐标），
//! 由椭球常数参数化。
//!
//! # 示例
//!
//! ```
//! use og_geo::ellipsoid::Ellipsoid;
//! use og_geo::geometry::LatLon;
//! use og_geo::projection::ZonedTransverseMercator;
//!
//! let proj = ZonedTransverseMercator::for_reference(Ellipsoid::WGS84, LatLon::new(30.0, 121.9));
//! let en = proj.project(30.0, 121.9);
//! let back = proj.unproject(en);
//! assert!((back.lat - 30.0).abs() < 1e-8);
//! ```

mod math_utils;
mod zoned_tm;

pub use math_utils::atanh_signed;
pub use zoned_tm::{
    project, project_with, ZoneParams, ZonedTransverseMercator, FALSE_EASTING, FALSE_NORTHING,
    SCALE_FACTOR, ZONE_WIDTH_DEG,
};
