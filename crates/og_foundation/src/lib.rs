// crates/og_foundation/src/lib.rs

//! OverlayGeo Foundation Layer
//!
//! 基础层，提供整个项目共享的数值工具。
//!
//! # 模块概览
//!
//! - [`float`]: 量化与浮点检查
//!
//! # 示例
//!
//! ```
//! use og_foundation::quantize;
//!
//! assert_eq!(quantize(50.000_000_7), 50.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod float;

// 重导出常用类型
pub use float::{quantize, QUANTIZATION_STEP};
