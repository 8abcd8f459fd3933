// apps/og_cli/src/commands/import.rs

//! 导入命令

use anyhow::{Context, Result};
use clap::Args;
use og_overlay::{import_document, save_document, LogNotifier};
use std::path::PathBuf;

/// 导入参数
#[derive(Args)]
pub struct ImportArgs {
    /// 输入文档
    #[arg(short, long)]
    pub input: PathBuf,

    /// 输出文档（写入还原后的经纬度）
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// 执行导入命令
pub fn execute(args: ImportArgs) -> Result<()> {
    let (dataset, summary) = import_document(&args.input, &LogNotifier)
        .with_context(|| format!("无法读取文档: {}", args.input.display()))?;

    println!("nodes:      {}", summary.nodes);
    println!("ways:       {}", summary.ways);
    println!("record:     {}", if summary.has_record { "yes" } else { "no" });
    println!("converted:  {}", summary.converted);
    println!("unresolved: {}", summary.unresolved);
    if summary.discarded_carriers > 0 {
        println!("discarded:  {}", summary.discarded_carriers);
    }

    if let Some(output) = &args.output {
        save_document(&dataset, output)
            .with_context(|| format!("无法写入文档: {}", output.display()))?;
    }
    Ok(())
}
