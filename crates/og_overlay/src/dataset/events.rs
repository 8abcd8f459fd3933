// crates/og_overlay/src/dataset/events.rs

//! 数据集事件系统
//!
//! 提供数据集变更事件的定义、监听器接口和分发机制。
//! 监听器以 [`Subscription`] 句柄注册，句柄析构时自动注销。

use super::primitives::{NodeId, PrimitiveId, Tags};
use og_geo::EastNorth;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// 变更来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// 用户直接编辑
    User,
    /// 批量操作（导出、导入、采集）
    Batch,
    /// 实时编辑同步
    LiveEdit,
}

/// 数据集事件
#[derive(Debug, Clone)]
pub enum DataSetEvent {
    /// 属性已变更
    TagsChanged {
        /// 图元
        primitive: PrimitiveId,
        /// 变更前属性
        original: Tags,
        /// 变更后属性
        current: Tags,
        /// 来源
        origin: ChangeOrigin,
    },
    /// 节点已移动
    NodeMoved {
        /// 节点
        node: NodeId,
        /// 原坐标
        from: Option<EastNorth>,
        /// 新坐标
        to: EastNorth,
        /// 来源
        origin: ChangeOrigin,
    },
    /// 图元已添加
    PrimitivesAdded {
        /// 新图元
        primitives: Vec<PrimitiveId>,
        /// 来源
        origin: ChangeOrigin,
    },
    /// 图元已删除
    PrimitivesRemoved {
        /// 被删除的图元
        primitives: Vec<PrimitiveId>,
        /// 来源
        origin: ChangeOrigin,
    },
}

impl DataSetEvent {
    /// 获取事件名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::TagsChanged { .. } => "TagsChanged",
            Self::NodeMoved { .. } => "NodeMoved",
            Self::PrimitivesAdded { .. } => "PrimitivesAdded",
            Self::PrimitivesRemoved { .. } => "PrimitivesRemoved",
        }
    }

    /// 变更来源
    pub fn origin(&self) -> ChangeOrigin {
        match self {
            Self::TagsChanged { origin, .. }
            | Self::NodeMoved { origin, .. }
            | Self::PrimitivesAdded { origin, .. }
            | Self::PrimitivesRemoved { origin, .. } => *origin,
        }
    }
}

/// 事件监听器trait
pub trait DataSetListener: Send + Sync {
    /// 处理事件
    fn on_event(&self, event: &DataSetEvent);

    /// 获取监听器名称 (用于调试)
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// 函数式事件监听器
pub struct FnListener<F>
where
    F: Fn(&DataSetEvent) + Send + Sync,
{
    name: String,
    handler: F,
}

impl<F> FnListener<F>
where
    F: Fn(&DataSetEvent) + Send + Sync,
{
    /// 创建函数式监听器
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> DataSetListener for FnListener<F>
where
    F: Fn(&DataSetEvent) + Send + Sync,
{
    fn on_event(&self, event: &DataSetEvent) {
        (self.handler)(event);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// 日志事件监听器
pub struct LoggingListener {
    prefix: String,
}

impl LoggingListener {
    /// 创建日志监听器
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl DataSetListener for LoggingListener {
    fn on_event(&self, event: &DataSetEvent) {
        match event {
            DataSetEvent::TagsChanged { primitive, current, origin, .. } => {
                tracing::debug!("{}: {} tags changed ({} keys, {:?})", self.prefix, primitive, current.len(), origin);
            }
            DataSetEvent::NodeMoved { node, to, origin, .. } => {
                tracing::debug!("{}: {} moved to ({:.3}, {:.3}) ({:?})", self.prefix, node, to.east, to.north, origin);
            }
            DataSetEvent::PrimitivesAdded { primitives, origin } => {
                tracing::debug!("{}: {} primitives added ({:?})", self.prefix, primitives.len(), origin);
            }
            DataSetEvent::PrimitivesRemoved { primitives, origin } => {
                tracing::debug!("{}: {} primitives removed ({:?})", self.prefix, primitives.len(), origin);
            }
        }
    }

    fn name(&self) -> &str {
        "LoggingListener"
    }
}

/// 事件分发器
#[derive(Default)]
pub struct EventDispatcher {
    listeners: RwLock<Vec<Arc<dyn DataSetListener>>>,
}

impl EventDispatcher {
    /// 创建新的事件分发器
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// 添加监听器
    pub fn add_listener(&self, listener: Arc<dyn DataSetListener>) {
        let name = listener.name().to_string();
        self.listeners.write().push(listener);
        tracing::debug!("Added dataset listener: {}", name);
    }

    /// 移除监听器
    pub fn remove_listener(&self, listener: &Arc<dyn DataSetListener>) {
        self.listeners
            .write()
            .retain(|l| !Arc::ptr_eq(l, listener));
        tracing::debug!("Removed dataset listener: {}", listener.name());
    }

    /// 分发事件
    ///
    /// 先复制监听器列表，监听器内部可以安全地注册或注销。
    pub fn emit(&self, event: &DataSetEvent) {
        let listeners: Vec<_> = self.listeners.read().clone();

        tracing::trace!("Emitting event: {}", event.name());

        for listener in &listeners {
            listener.on_event(event);
        }
    }

    /// 获取监听器数量
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listener_count", &self.listener_count())
            .finish()
    }
}

/// 监听器订阅句柄
///
/// 析构或调用 [`Subscription::detach`] 时注销监听器。
#[must_use = "dropping a Subscription detaches its listener"]
pub struct Subscription {
    dispatcher: Weak<EventDispatcher>,
    listener: Arc<dyn DataSetListener>,
}

impl Subscription {
    pub(crate) fn attach(dispatcher: &Arc<EventDispatcher>, listener: Arc<dyn DataSetListener>) -> Self {
        dispatcher.add_listener(Arc::clone(&listener));
        Self {
            dispatcher: Arc::downgrade(dispatcher),
            listener,
        }
    }

    /// 显式注销
    pub fn detach(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(dispatcher) = self.dispatcher.upgrade() {
            dispatcher.remove_listener(&self.listener);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("listener", &self.listener.name())
            .finish()
    }
}
