// crates/og_overlay/src/dataset/mod.rs

//! 数据集
//!
//! 节点与路径的内存存储。所有修改都经由 [`DataSet::begin_update`]
//! 返回的 [`UpdateGuard`] 进行；守卫持有写锁，期间产生的事件排队，
//! 守卫析构时先释放写锁再分发事件，监听器因此可以直接读取数据集。

pub mod events;
pub mod primitives;

pub use events::{
    ChangeOrigin, DataSetEvent, DataSetListener, EventDispatcher, FnListener, LoggingListener,
    Subscription,
};
pub use primitives::{Node, NodeId, PrimitiveId, Tags, Way, WayId};

use crate::error::{OverlayError, OverlayResult};
use crate::record::{TransformParameterRecord, TRANSFORM_MARKER_KEY};
use og_config::ProjectionConfig;
use og_geo::{EastNorth, ZonedTransverseMercator};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

// ============================================================================
// 存储
// ============================================================================

/// 数据集内容
#[derive(Debug, Default)]
pub struct DataSetInner {
    nodes: BTreeMap<NodeId, Node>,
    ways: BTreeMap<WayId, Way>,
    next_node_id: i64,
    next_way_id: i64,
}

impl DataSetInner {
    /// 全部节点（按 ID 升序）
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// 全部路径（按 ID 升序）
    pub fn ways(&self) -> impl Iterator<Item = &Way> {
        self.ways.values()
    }

    /// 查找节点
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// 查找路径
    pub fn way(&self, id: WayId) -> Option<&Way> {
        self.ways.get(&id)
    }

    /// 节点数量
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 路径数量
    pub fn way_count(&self) -> usize {
        self.ways.len()
    }

    /// 参数记录载体（带标记键的路径）
    pub fn transform_record_way(&self) -> Option<&Way> {
        self.ways.values().find(|w| w.has_key(TRANSFORM_MARKER_KEY))
    }

    /// 是否携带参数记录
    pub fn has_transform_record(&self) -> bool {
        self.transform_record_way().is_some()
    }

    /// 解析参数记录
    ///
    /// # Errors
    /// - 没有载体: [`OverlayError::MissingTransformRecord`]
    /// - 载体字段损坏: [`OverlayError::MalformedPersistedRecord`]
    pub fn transform_record(&self) -> OverlayResult<TransformParameterRecord> {
        let way = self
            .transform_record_way()
            .ok_or(OverlayError::MissingTransformRecord)?;
        TransformParameterRecord::from_attributes(&way.tags)
    }

    /// 节点属性 `key` 的最大整数值，没有时为 -1
    ///
    /// 非整数值被忽略。
    pub fn max_node_tag_id(&self, key: &str) -> i64 {
        max_tag_id(self.nodes.values().map(|n| n.get(key)))
    }

    /// 路径属性 `key` 的最大整数值，没有时为 -1
    pub fn max_way_tag_id(&self, key: &str) -> i64 {
        max_tag_id(self.ways.values().map(|w| w.get(key)))
    }
}

fn max_tag_id<'a>(values: impl Iterator<Item = Option<&'a str>>) -> i64 {
    values
        .flatten()
        .filter_map(|v| v.trim().parse::<i64>().ok())
        .fold(-1, i64::max)
}

// ============================================================================
// 数据集
// ============================================================================

/// 数据集
///
/// 坐标统一使用由参考坐标决定的单一分带投影。
#[derive(Debug)]
pub struct DataSet {
    inner: RwLock<DataSetInner>,
    events: Arc<EventDispatcher>,
    projection_config: ProjectionConfig,
    projection: ZonedTransverseMercator,
}

impl DataSet {
    /// 创建空数据集
    pub fn new(projection_config: ProjectionConfig) -> Self {
        let projection = projection_config.build();
        Self {
            inner: RwLock::new(DataSetInner {
                next_node_id: 1,
                next_way_id: 1,
                ..Default::default()
            }),
            events: Arc::new(EventDispatcher::new()),
            projection_config,
            projection,
        }
    }

    /// 投影配置
    pub fn projection_config(&self) -> &ProjectionConfig {
        &self.projection_config
    }

    /// 数据集投影
    pub fn projection(&self) -> &ZonedTransverseMercator {
        &self.projection
    }

    /// 共享读取
    pub fn read(&self) -> RwLockReadGuard<'_, DataSetInner> {
        self.inner.read()
    }

    /// 开始一次修改
    ///
    /// 守卫析构前其它线程无法读写；事件在锁释放后分发。
    pub fn begin_update(&self, origin: ChangeOrigin) -> UpdateGuard<'_> {
        UpdateGuard {
            data: self.inner.write(),
            flush: EventFlush {
                dispatcher: Arc::clone(&self.events),
                origin,
                pending: Vec::new(),
            },
        }
    }

    /// 注册监听器
    pub fn subscribe(&self, listener: Arc<dyn DataSetListener>) -> Subscription {
        Subscription::attach(&self.events, listener)
    }

    /// 监听器数量
    pub fn listener_count(&self) -> usize {
        self.events.listener_count()
    }
}

// ============================================================================
// 修改守卫
// ============================================================================

struct EventFlush {
    dispatcher: Arc<EventDispatcher>,
    origin: ChangeOrigin,
    pending: Vec<DataSetEvent>,
}

impl Drop for EventFlush {
    fn drop(&mut self) {
        for event in self.pending.drain(..) {
            self.dispatcher.emit(&event);
        }
    }
}

/// 数据集修改守卫
///
/// 字段按声明顺序析构：先释放写锁，再分发排队的事件。
pub struct UpdateGuard<'a> {
    data: RwLockWriteGuard<'a, DataSetInner>,
    flush: EventFlush,
}

impl Deref for UpdateGuard<'_> {
    type Target = DataSetInner;

    fn deref(&self) -> &DataSetInner {
        &self.data
    }
}

impl UpdateGuard<'_> {
    /// 本次修改的来源
    pub fn origin(&self) -> ChangeOrigin {
        self.flush.origin
    }

    /// 已排队的事件数量
    pub fn pending_events(&self) -> usize {
        self.flush.pending.len()
    }

    /// 添加节点
    pub fn add_node(&mut self, coord: Option<EastNorth>, tags: Tags) -> NodeId {
        let id = NodeId(self.data.next_node_id);
        self.data.next_node_id += 1;
        self.data.nodes.insert(id, Node { id, coord, tags });
        self.push_added(PrimitiveId::Node(id));
        id
    }

    /// 以指定 ID 插入节点（用于从文件加载）
    pub fn insert_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.data.next_node_id = self.data.next_node_id.max(id.0 + 1);
        self.data.nodes.insert(id, node);
        self.push_added(PrimitiveId::Node(id));
        id
    }

    /// 添加路径
    ///
    /// # Errors
    /// 引用的节点不存在时返回 [`OverlayError::PrimitiveNotFound`]
    pub fn add_way(&mut self, nodes: Vec<NodeId>, tags: Tags) -> OverlayResult<WayId> {
        self.check_nodes(&nodes)?;
        let id = WayId(self.data.next_way_id);
        self.data.next_way_id += 1;
        self.data.ways.insert(id, Way { id, nodes, tags });
        self.push_added(PrimitiveId::Way(id));
        Ok(id)
    }

    /// 以指定 ID 插入路径
    ///
    /// # Errors
    /// 引用的节点不存在时返回 [`OverlayError::PrimitiveNotFound`]
    pub fn insert_way(&mut self, way: Way) -> OverlayResult<WayId> {
        self.check_nodes(&way.nodes)?;
        let id = way.id;
        self.data.next_way_id = self.data.next_way_id.max(id.0 + 1);
        self.data.ways.insert(id, way);
        self.push_added(PrimitiveId::Way(id));
        Ok(id)
    }

    /// 移动节点
    ///
    /// # Errors
    /// 节点不存在时返回 [`OverlayError::PrimitiveNotFound`]
    pub fn set_node_coord(&mut self, id: NodeId, coord: EastNorth) -> OverlayResult<()> {
        let node = self
            .data
            .nodes
            .get_mut(&id)
            .ok_or_else(|| OverlayError::PrimitiveNotFound(id.to_string()))?;
        let from = node.coord.replace(coord);
        let origin = self.flush.origin;
        self.flush.pending.push(DataSetEvent::NodeMoved {
            node: id,
            from,
            to: coord,
            origin,
        });
        Ok(())
    }

    /// 设置单个节点属性
    ///
    /// # Errors
    /// 节点不存在时返回 [`OverlayError::PrimitiveNotFound`]
    pub fn put_node_tag(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> OverlayResult<()> {
        let (key, value) = (key.into(), value.into());
        self.modify_node_tags(id, |tags| {
            tags.insert(key, value);
        })
    }

    /// 批量设置节点属性
    ///
    /// # Errors
    /// 节点不存在时返回 [`OverlayError::PrimitiveNotFound`]
    pub fn set_node_tags<I, K, V>(&mut self, id: NodeId, entries: I) -> OverlayResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries: Vec<(String, String)> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.modify_node_tags(id, |tags| tags.extend(entries))
    }

    /// 写入参数记录
    ///
    /// 已有载体时覆盖 ID 最小的载体属性并删除其余载体，
    /// 否则新建一条不含节点的载体路径。写入后数据集中恰有一个载体。
    pub fn upsert_transform_record(&mut self, record: &TransformParameterRecord) -> WayId {
        let attributes = record.to_attributes();
        let carriers: Vec<WayId> = self
            .data
            .ways
            .values()
            .filter(|w| w.has_key(TRANSFORM_MARKER_KEY))
            .map(|w| w.id)
            .collect();

        let Some((&id, duplicates)) = carriers.split_first() else {
            let id = WayId(self.data.next_way_id);
            self.data.next_way_id += 1;
            self.data.ways.insert(
                id,
                Way {
                    id,
                    nodes: Vec::new(),
                    tags: attributes,
                },
            );
            self.push_added(PrimitiveId::Way(id));
            return id;
        };

        if !duplicates.is_empty() {
            for dup in duplicates {
                self.data.ways.remove(dup);
            }
            tracing::warn!("Removed {} duplicate transform record carriers", duplicates.len());
            let origin = self.flush.origin;
            self.flush.pending.push(DataSetEvent::PrimitivesRemoved {
                primitives: duplicates.iter().copied().map(PrimitiveId::Way).collect(),
                origin,
            });
        }

        if let Some(way) = self.data.ways.get_mut(&id) {
            if way.tags != attributes {
                let original = std::mem::replace(&mut way.tags, attributes);
                let current = way.tags.clone();
                let origin = self.flush.origin;
                self.flush.pending.push(DataSetEvent::TagsChanged {
                    primitive: PrimitiveId::Way(id),
                    original,
                    current,
                    origin,
                });
            }
        }
        id
    }

    fn modify_node_tags<F: FnOnce(&mut Tags)>(&mut self, id: NodeId, f: F) -> OverlayResult<()> {
        let node = self
            .data
            .nodes
            .get_mut(&id)
            .ok_or_else(|| OverlayError::PrimitiveNotFound(id.to_string()))?;
        let original = node.tags.clone();
        f(&mut node.tags);
        if node.tags != original {
            let current = node.tags.clone();
            let origin = self.flush.origin;
            self.flush.pending.push(DataSetEvent::TagsChanged {
                primitive: PrimitiveId::Node(id),
                original,
                current,
                origin,
            });
        }
        Ok(())
    }

    fn check_nodes(&self, nodes: &[NodeId]) -> OverlayResult<()> {
        match nodes.iter().find(|id| !self.data.nodes.contains_key(id)) {
            Some(missing) => Err(OverlayError::PrimitiveNotFound(missing.to_string())),
            None => Ok(()),
        }
    }

    fn push_added(&mut self, primitive: PrimitiveId) {
        let origin = self.flush.origin;
        // 相邻的添加合并为一个事件
        if let Some(DataSetEvent::PrimitivesAdded { primitives, origin: o }) =
            self.flush.pending.last_mut()
        {
            if *o == origin {
                primitives.push(primitive);
                return;
            }
        }
        self.flush.pending.push(DataSetEvent::PrimitivesAdded {
            primitives: vec![primitive],
            origin,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TRANSFORM_MARKER_VALUE;
    use parking_lot::Mutex;

    fn dataset() -> DataSet {
        DataSet::new(ProjectionConfig::default())
    }

    fn record(scale: f64) -> TransformParameterRecord {
        TransformParameterRecord {
            matrix: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
            view_center: EastNorth::new(500_000.0, 0.0),
            pixels_per_unit_x: 1.0,
            pixels_per_unit_y: 1.0,
            image_offset_x: 0.0,
            image_offset_y: 0.0,
            scale_x: scale,
            scale_y: scale,
            half_width: 10.0,
            half_height: 10.0,
        }
    }

    #[test]
    fn test_add_and_query() {
        let ds = dataset();
        let (a, b) = {
            let mut tx = ds.begin_update(ChangeOrigin::User);
            let a = tx.add_node(Some(EastNorth::new(1.0, 2.0)), Tags::new());
            let b = tx.add_node(None, Tags::new());
            tx.add_way(vec![a, b], Tags::new()).unwrap();
            (a, b)
        };
        let data = ds.read();
        assert_eq!(data.node_count(), 2);
        assert_eq!(data.way_count(), 1);
        assert_eq!(data.node(a).and_then(|n| n.coord), Some(EastNorth::new(1.0, 2.0)));
        assert!(data.node(b).and_then(|n| n.coord).is_none());
    }

    #[test]
    fn test_add_way_with_unknown_node() {
        let ds = dataset();
        let mut tx = ds.begin_update(ChangeOrigin::User);
        assert!(matches!(
            tx.add_way(vec![NodeId(42)], Tags::new()),
            Err(OverlayError::PrimitiveNotFound(_))
        ));
    }

    #[test]
    fn test_events_dispatched_after_lock_release() {
        let ds = Arc::new(dataset());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (ds_clone, seen_clone) = (Arc::clone(&ds), Arc::clone(&seen));
        let _sub = ds.subscribe(Arc::new(FnListener::new("reader", move |event| {
            // 锁已释放时才能拿到读锁
            let readable = ds_clone.inner.try_read().is_some();
            seen_clone.lock().push((event.name(), readable));
        })));

        {
            let mut tx = ds.begin_update(ChangeOrigin::User);
            let id = tx.add_node(None, Tags::new());
            tx.put_node_tag(id, "X_image", "1").unwrap();
            tx.set_node_coord(id, EastNorth::new(3.0, 4.0)).unwrap();
            assert!(seen.lock().is_empty());
        }

        let seen = seen.lock();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].0, "PrimitivesAdded");
        assert_eq!(seen[1].0, "TagsChanged");
        assert_eq!(seen[2].0, "NodeMoved");
        assert!(seen.iter().all(|(_, readable)| *readable));
    }

    #[test]
    fn test_unchanged_tags_emit_nothing() {
        let ds = dataset();
        let mut tx = ds.begin_update(ChangeOrigin::Batch);
        let id = tx.add_node(None, Tags::from([("k".to_string(), "v".to_string())]));
        let before = tx.pending_events();
        tx.put_node_tag(id, "k", "v").unwrap();
        assert_eq!(tx.pending_events(), before);
    }

    #[test]
    fn test_transform_record_singleton() {
        let ds = dataset();
        {
            let mut tx = ds.begin_update(ChangeOrigin::Batch);
            let first = tx.upsert_transform_record(&record(1.0));
            let second = tx.upsert_transform_record(&record(2.0));
            assert_eq!(first, second);
        }
        let data = ds.read();
        assert_eq!(data.ways().filter(|w| w.has_key(TRANSFORM_MARKER_KEY)).count(), 1);
        let way = data.transform_record_way().unwrap();
        assert_eq!(way.get(TRANSFORM_MARKER_KEY), Some(TRANSFORM_MARKER_VALUE));
        assert_eq!(data.transform_record().unwrap().scale_x, 2.0);
    }

    #[test]
    fn test_upsert_collapses_duplicate_carriers() {
        let ds = dataset();
        {
            let mut tx = ds.begin_update(ChangeOrigin::Batch);
            for (id, scale) in [(3, 3.0), (8, 8.0)] {
                tx.insert_way(Way {
                    id: WayId(id),
                    nodes: Vec::new(),
                    tags: record(scale).to_attributes(),
                })
                .unwrap();
            }
        }

        let removed = Arc::new(Mutex::new(Vec::new()));
        let removed_clone = Arc::clone(&removed);
        let _sub = ds.subscribe(Arc::new(FnListener::new("removed", move |event| {
            if let DataSetEvent::PrimitivesRemoved { primitives, .. } = event {
                removed_clone.lock().extend(primitives.iter().copied());
            }
        })));

        let kept = ds
            .begin_update(ChangeOrigin::Batch)
            .upsert_transform_record(&record(2.0));
        assert_eq!(kept, WayId(3));
        assert_eq!(*removed.lock(), vec![PrimitiveId::Way(WayId(8))]);

        let data = ds.read();
        assert_eq!(data.ways().filter(|w| w.has_key(TRANSFORM_MARKER_KEY)).count(), 1);
        assert_eq!(data.transform_record().unwrap().scale_x, 2.0);
    }

    #[test]
    fn test_missing_transform_record() {
        let ds = dataset();
        assert!(!ds.read().has_transform_record());
        assert!(matches!(
            ds.read().transform_record(),
            Err(OverlayError::MissingTransformRecord)
        ));
    }

    #[test]
    fn test_max_tag_id() {
        let ds = dataset();
        {
            let mut tx = ds.begin_update(ChangeOrigin::Batch);
            for value in ["3", "x", "11", " 7 "] {
                tx.add_node(None, Tags::from([("agv_node_id".to_string(), value.to_string())]));
            }
            tx.add_node(None, Tags::new());
        }
        let data = ds.read();
        assert_eq!(data.max_node_tag_id("agv_node_id"), 11);
        assert_eq!(data.max_node_tag_id("other"), -1);
        assert_eq!(data.max_way_tag_id("agv_node_id"), -1);
    }

    #[test]
    fn test_insert_keeps_id_allocation_monotonic() {
        let ds = dataset();
        let mut tx = ds.begin_update(ChangeOrigin::Batch);
        tx.insert_node(Node {
            id: NodeId(10),
            coord: None,
            tags: Tags::new(),
        });
        assert_eq!(tx.add_node(None, Tags::new()), NodeId(11));
    }
}
