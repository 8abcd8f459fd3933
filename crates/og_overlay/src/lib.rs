// crates/og_overlay/src/lib.rs

//! OverlayGeo 叠加图层标定模块
//!
//! 在地图数据集与已标定的底图图像之间换算坐标，并把换算参数
//! 持久化到数据集中，使保存后的文件可以脱离原始视图状态还原坐标。
//!
//! # 模块结构
//!
//! - [`collaborators`]: 视口与叠加图层接口
//! - [`sampler`]: 视口与标定采样
//! - [`record`]: 变换参数记录
//! - [`forward`] / [`inverse`]: 正向与反向变换
//! - [`dataset`]: 数据集与事件
//! - [`export`] / [`document`]: 导出、文档读写与导入
//! - [`live_edit`]: 实时编辑同步
//! - [`capture`]: CSV 采集
//! - [`scene`]: 静态视口与叠加图层
//! - [`notify`]: 被动通知
//!
//! # 示例
//!
//! ```rust,ignore
//! use og_overlay::{export_document, LogNotifier, SceneSnapshot};
//!
//! let scene = SceneSnapshot::from_file("scene.json")?;
//! let (dataset, _) = og_overlay::import_document("map.json", &LogNotifier)?;
//! export_document(&dataset, &scene.viewport, scene.overlay(), "out.json", &LogNotifier)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod capture;
pub mod collaborators;
pub mod dataset;
pub mod document;
pub mod error;
pub mod export;
pub mod forward;
pub mod inverse;
pub mod live_edit;
pub mod notify;
pub mod record;
pub mod sampler;
pub mod scene;

// 重导出核心类型
pub use capture::{capture, capture_file, CaptureKind, CaptureOutcome};
pub use collaborators::{OverlayCalibration, OverlaySource, PixelCoord, Viewport};
pub use dataset::{ChangeOrigin, DataSet, DataSetEvent, DataSetListener, NodeId, Subscription, WayId};
pub use document::{export_document, import_document, save_document, Document, ImportSummary};
pub use error::{OverlayError, OverlayResult};
pub use export::{export, ExportOutcome};
pub use forward::{forward, ForwardTransformer};
pub use inverse::{inverse, InverseTransformer};
pub use live_edit::{EditSession, LiveEditReconciler};
pub use notify::{LogNotifier, MemoryNotifier, NoticeLevel, Notifier};
pub use record::TransformParameterRecord;
pub use sampler::{sample_calibration, sample_viewport, CalibrationSample, ViewportSample};
pub use scene::{SceneSnapshot, SharedScene, StaticOverlay, StaticViewport};
