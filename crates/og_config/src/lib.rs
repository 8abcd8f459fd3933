// crates/og_config/src/lib.rs

//! OverlayGeo Config Layer
//!
//! 配置层，提供投影分带、CSV 采集与日志配置。
//!
//! # 模块概览
//!
//! - [`overlay_config`]: OverlayConfig 配置结构
//! - [`error`]: 配置错误类型

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod overlay_config;

// 重导出核心类型
pub use error::ConfigError;
pub use overlay_config::{CaptureConfig, LoggingConfig, OverlayConfig, ProjectionConfig};
