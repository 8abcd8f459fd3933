// apps/og_cli/src/main.rs

//! OverlayGeo 命令行界面
//!
//! 在地图文档与已标定底图之间换算坐标：投影、导出像素坐标、
//! 由像素坐标导入以及从 CSV 采集。

mod commands;

use clap::{Parser, Subcommand};
use og_config::OverlayConfig;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// OverlayGeo 叠加图层标定命令行工具
#[derive(Parser)]
#[command(name = "og_cli")]
#[command(author = "OverlayGeo Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Image overlay calibration and coordinate round-trip tool", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，未指定时取配置文件中的 logging.level
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 经纬度投影为东北坐标
    Project(commands::project::ProjectArgs),
    /// 导出像素坐标
    Export(commands::export::ExportArgs),
    /// 导入文档并由像素坐标还原位置
    Import(commands::import::ImportArgs),
    /// 从 CSV 采集节点
    Capture(commands::capture::CaptureArgs),
}

impl Commands {
    /// 子命令指定的配置文件
    fn config_path(&self) -> Option<&Path> {
        match self {
            Self::Project(args) => args.config.as_deref(),
            Self::Capture(args) => args.config.as_deref(),
            Self::Export(_) | Self::Import(_) => None,
        }
    }
}

impl Cli {
    /// 日志级别：命令行优先，其次配置文件，默认 info
    ///
    /// 配置文件无法加载时在这里忽略，由子命令报告错误。
    fn resolve_log_level(&self) -> String {
        if let Some(level) = &self.log_level {
            return level.clone();
        }
        self.command
            .config_path()
            .and_then(|p| OverlayConfig::from_file(p).ok())
            .map(|config| config.logging.level)
            .unwrap_or_else(|| "info".to_string())
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = parse_level(&cli.resolve_log_level());

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 执行命令
    match cli.command {
        Commands::Project(args) => commands::project::execute(args),
        Commands::Export(args) => commands::export::execute(args),
        Commands::Import(args) => commands::import::execute(args),
        Commands::Capture(args) => commands::capture::execute(args),
    }
}
