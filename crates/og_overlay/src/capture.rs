// crates/og_overlay/src/capture.rs

//! CSV 采集
//!
//! 从 CSV 读取图像像素坐标，经数据集中保存的参数记录反算为投影坐标，
//! 批量生成节点和路径：
//!
//! - AMR 目标点：`x,y,angle`，生成目标节点、朝向节点和 `goal_pose` 路径
//! - PGV 磁带：`start_x,start_y,start_pgv,end_x,end_y,end_pgv`，
//!   生成两端节点和 `agv_pose` 路径
//!
//! 列数不足或无法解析的行被跳过。

use crate::collaborators::PixelCoord;
use crate::dataset::{ChangeOrigin, DataSet, Tags};
use crate::error::OverlayResult;
use crate::inverse::InverseTransformer;
use crate::notify::{NoticeLevel, Notifier};
use crate::record::{X_IMAGE_KEY, Y_IMAGE_KEY};
use og_config::CaptureConfig;
use og_geo::EastNorth;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const LINE_INFO_KEY: &str = "line_info";
const GOAL_ID_KEY: &str = "goal_id";
const AGV_NODE_ID_KEY: &str = "agv_node_id";
const AGV_LINE_START_OFFSET_KEY: &str = "agv_line_start_offset";
const AGV_LINE_END_OFFSET_KEY: &str = "agv_line_end_offset";

/// 采集类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    /// AMR 目标点
    AmrGoal,
    /// PGV 磁带
    PgvTape,
}

impl CaptureKind {
    fn columns(self) -> usize {
        match self {
            Self::AmrGoal => 3,
            Self::PgvTape => 6,
        }
    }
}

/// 采集结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureOutcome {
    /// 有效行数
    pub rows: usize,
    /// 跳过的行数
    pub skipped: usize,
    /// 新增节点数
    pub nodes: usize,
    /// 新增路径数
    pub ways: usize,
}

// ============================================================================
// CSV 读取
// ============================================================================

/// 读取数值行
///
/// 返回每行前 `columns` 个数值，以及被跳过的行数。
fn read_rows<R: Read>(
    reader: R,
    columns: usize,
    config: &CaptureConfig,
) -> OverlayResult<(Vec<Vec<f64>>, usize)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(config.has_header)
        .delimiter(config.delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    let mut skipped = 0;

    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result?;
        let values: Option<Vec<f64>> = (record.len() >= columns)
            .then(|| {
                record
                    .iter()
                    .take(columns)
                    .map(|v| v.parse::<f64>().ok().filter(|f| f.is_finite()))
                    .collect()
            })
            .flatten();

        match values {
            Some(v) => rows.push(v),
            None => {
                tracing::debug!("CSV row {} skipped", row_idx + 1);
                skipped += 1;
            }
        }
    }

    Ok((rows, skipped))
}

fn pixel_tags(pixel: PixelCoord) -> Tags {
    Tags::from([
        (X_IMAGE_KEY.to_string(), pixel.x.to_string()),
        (Y_IMAGE_KEY.to_string(), pixel.y.to_string()),
    ])
}

// ============================================================================
// 采集
// ============================================================================

/// 从 CSV 数据采集
///
/// # Errors
/// - 数据集没有参数记录: [`crate::OverlayError::MissingTransformRecord`]
/// - 参数记录损坏: [`crate::OverlayError::MalformedPersistedRecord`]
/// - CSV 格式错误: [`crate::OverlayError::Csv`]
pub fn capture<R: Read>(
    dataset: &DataSet,
    kind: CaptureKind,
    reader: R,
    config: &CaptureConfig,
    notifier: &dyn Notifier,
) -> OverlayResult<CaptureOutcome> {
    let transformer = InverseTransformer::new(dataset.read().transform_record()?)?;
    let (rows, skipped) = read_rows(reader, kind.columns(), config)?;

    let mut outcome = CaptureOutcome {
        rows: rows.len(),
        skipped,
        ..Default::default()
    };
    if rows.is_empty() {
        notifier.notify(NoticeLevel::Warning, "No data found.");
        return Ok(outcome);
    }

    let mut tx = dataset.begin_update(ChangeOrigin::Batch);
    match kind {
        CaptureKind::AmrGoal => {
            let mut goal_id = tx.max_way_tag_id(GOAL_ID_KEY);
            for row in &rows {
                let pixel = PixelCoord::new(row[0], row[1]);
                let angle = row[2];
                let start = transformer.east_north(pixel);
                let heading = start
                    + EastNorth::new(
                        config.goal_heading_length * angle.cos(),
                        -config.goal_heading_length * angle.sin(),
                    );

                let a = tx.add_node(Some(start), pixel_tags(pixel));
                let b = tx.add_node(Some(heading), Tags::new());
                goal_id += 1;
                tx.add_way(
                    vec![a, b],
                    Tags::from([
                        (LINE_INFO_KEY.to_string(), "goal_pose".to_string()),
                        (GOAL_ID_KEY.to_string(), goal_id.to_string()),
                    ]),
                )?;
                outcome.nodes += 2;
                outcome.ways += 1;
            }
        }
        CaptureKind::PgvTape => {
            let mut agv_node_id = tx.max_node_tag_id(AGV_NODE_ID_KEY);
            for row in &rows {
                let mut ends = Vec::with_capacity(2);
                for pixel in [PixelCoord::new(row[0], row[1]), PixelCoord::new(row[3], row[4])] {
                    agv_node_id += 1;
                    let mut tags = pixel_tags(pixel);
                    tags.insert(AGV_NODE_ID_KEY.to_string(), agv_node_id.to_string());
                    ends.push(tx.add_node(Some(transformer.east_north(pixel)), tags));
                }
                tx.add_way(
                    ends,
                    Tags::from([
                        (LINE_INFO_KEY.to_string(), "agv_pose".to_string()),
                        (AGV_LINE_START_OFFSET_KEY.to_string(), row[2].to_string()),
                        (AGV_LINE_END_OFFSET_KEY.to_string(), row[5].to_string()),
                    ]),
                )?;
                outcome.nodes += 2;
                outcome.ways += 1;
            }
        }
    }
    drop(tx);

    tracing::info!(
        "Captured {:?}: {} rows, {} skipped",
        kind,
        outcome.rows,
        outcome.skipped
    );
    Ok(outcome)
}

/// 从 CSV 文件采集
///
/// # Errors
/// 见 [`capture`]；另有文件打开失败时的 IO 错误
pub fn capture_file<P: AsRef<Path>>(
    dataset: &DataSet,
    kind: CaptureKind,
    path: P,
    config: &CaptureConfig,
    notifier: &dyn Notifier,
) -> OverlayResult<CaptureOutcome> {
    let file = File::open(path.as_ref())?;
    capture(dataset, kind, file, config, notifier)
}
