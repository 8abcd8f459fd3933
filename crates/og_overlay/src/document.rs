// crates/og_overlay/src/document.rs

//! 数据集文档的读写
//!
//! 文档为 JSON 格式：
//!
//! ```json
//! {
//!   "projection": { "reference_lat": 35.0, "reference_lon": 139.0 },
//!   "nodes": [ { "id": 1, "lat": 35.0, "lon": 139.0, "tags": {} },
//!              { "id": 2, "tags": { "X_image": "12.5", "Y_image": "40" } } ],
//!   "ways":  [ { "id": 1, "nodes": [1, 2], "tags": {} } ]
//! }
//! ```
//!
//! 缺少 `lat`/`lon` 的节点在导入时由像素属性和参数记录反算坐标。

use crate::collaborators::{OverlayCalibration, Viewport};
use crate::dataset::{ChangeOrigin, DataSet, Node, NodeId, Tags, Way, WayId};
use crate::error::{OverlayError, OverlayResult};
use crate::export::{export, ExportOutcome};
use crate::inverse::{pixel_from_attributes, InverseTransformer};
use crate::notify::{NoticeLevel, Notifier};
use crate::record::{TransformParameterRecord, TRANSFORM_MARKER_KEY};
use og_config::ProjectionConfig;
use og_geo::EastNorth;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 文档中的节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeEntry {
    /// ID
    pub id: NodeId,
    /// 纬度（度）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// 经度（度）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    /// 属性
    #[serde(default)]
    pub tags: Tags,
}

/// 文档中的路径
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WayEntry {
    /// ID
    pub id: WayId,
    /// 节点序列
    #[serde(default)]
    pub nodes: Vec<NodeId>,
    /// 属性
    #[serde(default)]
    pub tags: Tags,
}

/// 数据集文档
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// 投影配置
    #[serde(default)]
    pub projection: ProjectionConfig,
    /// 节点
    #[serde(default)]
    pub nodes: Vec<NodeEntry>,
    /// 路径
    #[serde(default)]
    pub ways: Vec<WayEntry>,
}

impl Document {
    /// 从文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> OverlayResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 保存到文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> OverlayResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// 由数据集生成，坐标换算为经纬度
    pub fn from_dataset(dataset: &DataSet) -> Self {
        let projection = dataset.projection();
        let data = dataset.read();

        let nodes = data
            .nodes()
            .map(|n| {
                let ll = n.coord.map(|c| projection.unproject(c));
                NodeEntry {
                    id: n.id,
                    lat: ll.map(|l| l.lat),
                    lon: ll.map(|l| l.lon),
                    tags: n.tags.clone(),
                }
            })
            .collect();
        let ways = data
            .ways()
            .map(|w| WayEntry {
                id: w.id,
                nodes: w.nodes.clone(),
                tags: w.tags.clone(),
            })
            .collect();

        Self {
            projection: dataset.projection_config().clone(),
            nodes,
            ways,
        }
    }

    /// 参数记录载体（ID 最小的带标记键路径，与数据集的选择一致）
    pub fn transform_record_entry(&self) -> Option<&WayEntry> {
        self.ways
            .iter()
            .filter(|w| w.tags.contains_key(TRANSFORM_MARKER_KEY))
            .min_by_key(|w| w.id)
    }
}

/// 导入统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// 节点总数
    pub nodes: usize,
    /// 导入的路径数
    pub ways: usize,
    /// 被丢弃的重复参数记录载体数
    pub discarded_carriers: usize,
    /// 由像素属性反算坐标的节点数
    pub converted: usize,
    /// 反算失败、坐标保持未设置的节点数
    pub unresolved: usize,
    /// 是否找到可用的参数记录
    pub has_record: bool,
}

/// 把数据集保存为文档
pub fn save_document<P: AsRef<Path>>(dataset: &DataSet, path: P) -> OverlayResult<()> {
    Document::from_dataset(dataset).save(path.as_ref())?;
    tracing::info!("Document saved: {}", path.as_ref().display());
    Ok(())
}

/// 导入文档文件
///
/// # Errors
/// 仅 IO 与 JSON 解析错误向上传播；标定相关问题通过 `notifier` 报告
pub fn import_document<P: AsRef<Path>>(
    path: P,
    notifier: &dyn Notifier,
) -> OverlayResult<(DataSet, ImportSummary)> {
    let document = Document::load(path.as_ref())?;
    let result = build_dataset(document, notifier)?;
    tracing::info!(
        "Document imported: {} ({} nodes, {} converted)",
        path.as_ref().display(),
        result.1.nodes,
        result.1.converted
    );
    Ok(result)
}

/// 导出并保存
///
/// 标定不可用时仍会保存，只是不写入像素属性。
pub fn export_document<P: AsRef<Path>>(
    dataset: &DataSet,
    viewport: &dyn Viewport,
    overlay: Option<&dyn OverlayCalibration>,
    path: P,
    notifier: &dyn Notifier,
) -> OverlayResult<ExportOutcome> {
    let outcome = export(dataset, viewport, overlay, notifier);
    save_document(dataset, path)?;
    Ok(outcome)
}

/// 由文档构建数据集
///
/// 先定位并解析参数记录，再逐个构建节点。文档含多个参数记录载体时
/// 只保留 [`Document::transform_record_entry`] 选中的一个。
///
/// # Errors
/// 路径引用了不存在的节点时返回 [`OverlayError::PrimitiveNotFound`]
pub fn build_dataset(
    document: Document,
    notifier: &dyn Notifier,
) -> OverlayResult<(DataSet, ImportSummary)> {
    let carrier = document.transform_record_entry().map(|w| w.id);
    let transformer = match document.transform_record_entry() {
        None => None,
        Some(way) => match TransformParameterRecord::from_attributes(&way.tags)
            .and_then(InverseTransformer::new)
        {
            Ok(t) => Some(t),
            Err(e) => {
                tracing::warn!("Transform record ignored: {}", e);
                notifier.notify(NoticeLevel::Warning, &format!("Transform record ignored: {e}"));
                None
            }
        },
    };

    let dataset = DataSet::new(document.projection.clone());
    let projection = dataset.projection().clone();
    let mut summary = ImportSummary {
        nodes: document.nodes.len(),
        has_record: transformer.is_some(),
        ..Default::default()
    };

    {
        let mut tx = dataset.begin_update(ChangeOrigin::Batch);

        for entry in document.nodes {
            let coord = match (entry.lat, entry.lon) {
                (Some(lat), Some(lon)) => Some(projection.project(lat, lon)),
                _ => match resolve_from_pixels(&entry, transformer.as_ref()) {
                    Ok(Some(en)) => {
                        summary.converted += 1;
                        Some(en)
                    }
                    Ok(None) => None,
                    Err(e) => {
                        tracing::debug!("Node {} left unset: {}", entry.id, e);
                        summary.unresolved += 1;
                        None
                    }
                },
            };
            tx.insert_node(Node {
                id: entry.id,
                coord,
                tags: entry.tags,
            });
        }

        for entry in document.ways {
            if entry.tags.contains_key(TRANSFORM_MARKER_KEY) && Some(entry.id) != carrier {
                tracing::debug!("Duplicate transform record carrier {} dropped", entry.id);
                summary.discarded_carriers += 1;
                continue;
            }
            tx.insert_way(Way {
                id: entry.id,
                nodes: entry.nodes,
                tags: entry.tags,
            })?;
            summary.ways += 1;
        }
    }

    if summary.discarded_carriers > 0 {
        notifier.notify(
            NoticeLevel::Warning,
            &format!(
                "{} duplicate transform records were discarded",
                summary.discarded_carriers
            ),
        );
    }

    if summary.unresolved > 0 {
        notifier.notify(
            NoticeLevel::Warning,
            &format!(
                "{} nodes could not be placed from image coordinates",
                summary.unresolved
            ),
        );
    }

    Ok((dataset, summary))
}

fn resolve_from_pixels(
    entry: &NodeEntry,
    transformer: Option<&InverseTransformer>,
) -> OverlayResult<Option<EastNorth>> {
    let Some(pixel) = pixel_from_attributes(&entry.tags)? else {
        return Ok(None);
    };
    let transformer = transformer.ok_or(OverlayError::MissingTransformRecord)?;
    Ok(Some(transformer.east_north(pixel)))
}
