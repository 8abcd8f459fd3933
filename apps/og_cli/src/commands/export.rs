// apps/og_cli/src/commands/export.rs

//! 导出命令
//!
//! 读取文档和场景描述，为全部节点写入像素坐标后保存。

use anyhow::{Context, Result};
use clap::Args;
use og_overlay::{export_document, import_document, ExportOutcome, LogNotifier, SceneSnapshot};
use std::path::PathBuf;
use tracing::info;

/// 导出参数
#[derive(Args)]
pub struct ExportArgs {
    /// 输入文档
    #[arg(short, long)]
    pub dataset: PathBuf,

    /// 场景描述（视口与叠加图层）
    #[arg(short, long)]
    pub scene: PathBuf,

    /// 输出文档
    #[arg(short, long)]
    pub output: PathBuf,
}

/// 执行导出命令
pub fn execute(args: ExportArgs) -> Result<()> {
    let (dataset, _) = import_document(&args.dataset, &LogNotifier)
        .with_context(|| format!("无法读取文档: {}", args.dataset.display()))?;
    let scene = SceneSnapshot::from_file(&args.scene)
        .with_context(|| format!("无法读取场景: {}", args.scene.display()))?;

    let outcome = export_document(
        &dataset,
        &scene.viewport,
        scene.overlay(),
        &args.output,
        &LogNotifier,
    )
    .with_context(|| format!("无法写入文档: {}", args.output.display()))?;

    match outcome {
        ExportOutcome::Calibrated { exported, skipped, .. } => {
            info!("Exported {} nodes ({} skipped)", exported, skipped);
            println!("calibrated: {exported} nodes, {skipped} skipped");
        }
        ExportOutcome::Fallback { reason } => {
            println!("fallback: {reason}");
        }
    }
    Ok(())
}
