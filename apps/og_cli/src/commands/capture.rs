// apps/og_cli/src/commands/capture.rs

//! CSV 采集命令

use super::load_config;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use og_overlay::{capture_file, import_document, save_document, CaptureKind, LogNotifier};
use std::path::PathBuf;

/// 采集类型
#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    /// AMR 目标点 (x,y,angle)
    Goal,
    /// PGV 磁带 (start_x,start_y,start_pgv,end_x,end_y,end_pgv)
    Tape,
}

impl From<KindArg> for CaptureKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Goal => CaptureKind::AmrGoal,
            KindArg::Tape => CaptureKind::PgvTape,
        }
    }
}

/// 采集参数
#[derive(Args)]
pub struct CaptureArgs {
    /// 输入文档（须含参数记录）
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// CSV 文件
    #[arg(long)]
    pub csv: PathBuf,

    /// 采集类型
    #[arg(short, long, value_enum)]
    pub kind: KindArg,

    /// 输出文档
    #[arg(short, long)]
    pub output: PathBuf,

    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// 执行采集命令
pub fn execute(args: CaptureArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let (dataset, _) = import_document(&args.dataset, &LogNotifier)
        .with_context(|| format!("无法读取文档: {}", args.dataset.display()))?;

    let outcome = capture_file(
        &dataset,
        args.kind.into(),
        &args.csv,
        &config.capture,
        &LogNotifier,
    )
    .with_context(|| format!("采集失败: {}", args.csv.display()))?;

    save_document(&dataset, &args.output)
        .with_context(|| format!("无法写入文档: {}", args.output.display()))?;

    println!(
        "rows: {}, skipped: {}, nodes: {}, ways: {}",
        outcome.rows, outcome.skipped, outcome.nodes, outcome.ways
    );
    Ok(())
}
