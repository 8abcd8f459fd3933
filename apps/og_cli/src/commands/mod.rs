// apps/og_cli/src/commands/mod.rs

//! 子命令

pub mod capture;
pub mod export;
pub mod import;
pub mod project;

use anyhow::{Context, Result};
use og_config::OverlayConfig;
use std::path::Path;

/// 加载配置，未指定时使用默认值
pub fn load_config(path: Option<&Path>) -> Result<OverlayConfig> {
    match path {
        Some(p) => OverlayConfig::from_file(p)
            .with_context(|| format!("无法加载配置文件: {}", p.display())),
        None => Ok(OverlayConfig::default()),
    }
}
