// crates/og_geo/src/lib.rs
//! OverlayGeo 地理空间处理模块
//!
//! 提供椭球体参数、坐标类型、分带横轴墨卡托投影和二维仿射变换。
//!
//! # 模块
//!
//! - `ellipsoid`: 椭球体与级数系数
//! - `geometry`: 坐标类型 (EastNorth, LatLon)
//! - `projection`: 分带横轴墨卡托投影
//! - `transform`: 仿射变换（标定矩阵）
//!
//! # 示例
//!
//! ```
//! use og_geo::prelude::*;
//!
//! let en = project(29.887703, 121.880356);
//! assert!((en.east - 391_888.064).abs() < 0.01);
//!
//! let m = AffineTransform::from_flat_matrix([1.0, 0.0, 0.0, 1.0, 5.0, 5.0]);
//! assert_eq!(m.without_translation(), AffineTransform::identity());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod ellipsoid;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod transform;

/// 预导入模块
pub mod prelude {
    pub use crate::ellipsoid::Ellipsoid;
    pub use crate::geometry::{EastNorth, LatLon};
    pub use crate::projection::{project, ZoneParams, ZonedTransverseMercator};
    pub use crate::transform::AffineTransform;
}

// 重导出常用类型
pub use ellipsoid::Ellipsoid;
pub use error::{GeoError, GeoResult};
pub use geometry::{EastNorth, LatLon};
pub use projection::{project, ZonedTransverseMercator};
pub use transform::AffineTransform;
