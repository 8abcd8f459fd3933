// crates/og_overlay/src/scene.rs

//! 静态场景
//!
//! 以可序列化的快照描述一个视口和一个可选的叠加图层，
//! 供命令行工具和测试在没有交互式地图的情况下驱动标定流程。
//!
//! ```json
//! {
//!   "viewport": { "center": { "east": 500000.0, "north": 4500000.0 },
//!                 "width": 800.0, "height": 600.0,
//!                 "pixels_per_unit_x": 10.0, "pixels_per_unit_y": 10.0 },
//!   "overlay": { "matrix": [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
//!                "anchor": { "east": 500000.0, "north": 4500000.0 },
//!                "image_width": 100, "image_height": 100,
//!                "meters_per_unit_x": 0.1, "meters_per_unit_y": 0.1,
//!                "pristine_scale": 1.0 }
//! }
//! ```

use crate::collaborators::{OverlayCalibration, OverlaySource, Viewport};
use crate::error::OverlayResult;
use og_geo::{AffineTransform, EastNorth};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// 静态视口
// ============================================================================

/// 固定中心和像素密度的视口
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticViewport {
    /// 视图中心
    pub center: EastNorth,
    /// 宽度（像素）
    pub width: f64,
    /// 高度（像素）
    pub height: f64,
    /// 每东向单位像素数
    pub pixels_per_unit_x: f64,
    /// 每北向单位像素数
    pub pixels_per_unit_y: f64,
}

impl Viewport for StaticViewport {
    fn view_center(&self) -> EastNorth {
        self.center
    }

    fn east_north_at(&self, x: f64, y: f64) -> EastNorth {
        EastNorth::new(
            self.center.east + (x - self.width / 2.0) / self.pixels_per_unit_x,
            self.center.north - (y - self.height / 2.0) / self.pixels_per_unit_y,
        )
    }

    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

// ============================================================================
// 静态叠加图层
// ============================================================================

/// 固定标定参数的叠加图层
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticOverlay {
    /// 扁平标定矩阵 `[m00, m10, m01, m11, m02, m12]`
    pub matrix: [f64; 6],
    /// 锚点
    pub anchor: EastNorth,
    /// 图像宽度
    pub image_width: u32,
    /// 图像高度
    pub image_height: u32,
    /// 每东向单位米数
    #[serde(default)]
    pub meters_per_unit_x: Option<f64>,
    /// 每北向单位米数
    #[serde(default)]
    pub meters_per_unit_y: Option<f64>,
    /// 初始缩放
    #[serde(default)]
    pub pristine_scale: Option<f64>,
}

impl OverlayCalibration for StaticOverlay {
    fn calibration_matrix(&self) -> Option<AffineTransform> {
        Some(AffineTransform::from_flat_matrix(self.matrix))
    }

    fn anchor_position(&self) -> Option<EastNorth> {
        Some(self.anchor)
    }

    fn image_pixel_size(&self) -> Option<(u32, u32)> {
        Some((self.image_width, self.image_height))
    }

    fn meters_per_pixel_x(&self, _at: EastNorth) -> Option<f64> {
        self.meters_per_unit_x
    }

    fn meters_per_pixel_y(&self, _at: EastNorth) -> Option<f64> {
        self.meters_per_unit_y
    }

    fn pristine_image_scale(&self) -> Option<f64> {
        self.pristine_scale
    }
}

// ============================================================================
// 场景快照
// ============================================================================

/// 视口 + 可选叠加图层
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// 视口
    pub viewport: StaticViewport,
    /// 叠加图层
    #[serde(default)]
    pub overlay: Option<StaticOverlay>,
}

impl SceneSnapshot {
    /// 从 JSON 文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> OverlayResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 当前叠加图层的借用
    pub fn overlay(&self) -> Option<&dyn OverlayCalibration> {
        self.overlay.as_ref().map(|o| o as &dyn OverlayCalibration)
    }
}

// ============================================================================
// 可变共享场景
// ============================================================================

/// 可在运行中修改的共享场景
///
/// 实时编辑在执行时重新采样，修改场景即可模拟用户平移视图或调整标定。
#[derive(Debug)]
pub struct SharedScene {
    inner: RwLock<SceneSnapshot>,
}

impl SharedScene {
    /// 包装快照
    pub fn new(snapshot: SceneSnapshot) -> Arc<Self> {
        Arc::new(Self {
            inner: RwLock::new(snapshot),
        })
    }

    /// 修改场景
    pub fn update<F: FnOnce(&mut SceneSnapshot)>(&self, f: F) {
        f(&mut self.inner.write());
    }

    /// 当前快照的副本
    pub fn snapshot(&self) -> SceneSnapshot {
        self.inner.read().clone()
    }
}

impl Viewport for SharedScene {
    fn view_center(&self) -> EastNorth {
        self.inner.read().viewport.view_center()
    }

    fn east_north_at(&self, x: f64, y: f64) -> EastNorth {
        self.inner.read().viewport.east_north_at(x, y)
    }

    fn size(&self) -> (f64, f64) {
        self.inner.read().viewport.size()
    }
}

impl OverlaySource for SharedScene {
    fn active_overlay(&self) -> Option<Arc<dyn OverlayCalibration>> {
        self.inner
            .read()
            .overlay
            .clone()
            .map(|o| Arc::new(o) as Arc<dyn OverlayCalibration>)
    }
}
