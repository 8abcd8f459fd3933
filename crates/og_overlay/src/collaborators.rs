// crates/og_overlay/src/collaborators.rs

//! 外部协作方接口
//!
//! 地图视口与图像叠加图层由宿主程序提供，本 crate 仅通过下列 trait 访问。
//! 所有查询都可能返回 `None`，表示宿主无法提供该属性。

use og_geo::{AffineTransform, EastNorth};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 图像像素坐标（原点在图像左上角，y 向下）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelCoord {
    /// x 像素
    pub x: f64,
    /// y 像素
    pub y: f64,
}

impl PixelCoord {
    /// 创建像素坐标
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// 地图视口
pub trait Viewport: Send + Sync {
    /// 视图中心的投影坐标
    fn view_center(&self) -> EastNorth;

    /// 屏幕像素 (x, y) 处的投影坐标，(0, 0) 为左上角
    fn east_north_at(&self, x: f64, y: f64) -> EastNorth;

    /// 视口尺寸（宽, 高），单位为屏幕像素
    fn size(&self) -> (f64, f64);
}

/// 已标定的图像叠加图层
pub trait OverlayCalibration: Send + Sync {
    /// 当前标定矩阵（可能含平移）
    fn calibration_matrix(&self) -> Option<AffineTransform>;

    /// 叠加图层锚点的投影坐标
    fn anchor_position(&self) -> Option<EastNorth>;

    /// 图像尺寸（宽, 高），单位为像素
    fn image_pixel_size(&self) -> Option<(u32, u32)>;

    /// 在给定位置每个东向投影单位对应的米数
    fn meters_per_pixel_x(&self, at: EastNorth) -> Option<f64>;

    /// 在给定位置每个北向投影单位对应的米数
    fn meters_per_pixel_y(&self, at: EastNorth) -> Option<f64>;

    /// 图像初始缩放
    fn pristine_image_scale(&self) -> Option<f64>;
}

/// 提供当前活动叠加图层
pub trait OverlaySource: Send + Sync {
    /// 当前活动的叠加图层，没有时返回 `None`
    fn active_overlay(&self) -> Option<Arc<dyn OverlayCalibration>>;
}
