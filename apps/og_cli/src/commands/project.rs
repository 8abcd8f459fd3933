// apps/og_cli/src/commands/project.rs

//! 投影命令

use super::load_config;
use anyhow::{Context, Result};
use clap::Args;
use og_geo::LatLon;
use std::path::PathBuf;

/// 投影参数
#[derive(Args)]
pub struct ProjectArgs {
    /// 纬度（度）
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// 经度（度）
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// 配置文件路径（指定时使用配置中的参考分带）
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// 执行投影命令
pub fn execute(args: ProjectArgs) -> Result<()> {
    let en = match &args.config {
        Some(path) => {
            let config = load_config(Some(path))?;
            config
                .projection
                .build()
                .try_project(LatLon::new(args.lat, args.lon))
                .context("投影失败")?
        }
        None => og_geo::projection::project(args.lat, args.lon),
    };

    println!("{:.6} {:.6}", en.east, en.north);
    Ok(())
}
