// crates/og_overlay/src/live_edit.rs

//! 实时编辑同步
//!
//! 用户手工修改节点的 `X_image`/`Y_image` 后，按当前视口和叠加图层
//! 重新采样并反算，把节点移动到对应的投影坐标。
//!
//! 事件回调只登记待移动的节点；同一节点在执行前的多次修改只保留最后一次，
//! 最后一次无效时该节点不移动。
//! 宿主在合适的时机调用 [`LiveEditReconciler::flush`] 执行移动。

use crate::collaborators::{OverlaySource, PixelCoord, Viewport};
use crate::dataset::{
    ChangeOrigin, DataSet, DataSetEvent, DataSetListener, NodeId, PrimitiveId, Subscription,
};
use crate::error::{OverlayError, OverlayResult};
use crate::inverse::{pixel_from_attributes, InverseTransformer};
use crate::record::{TransformParameterRecord, X_IMAGE_KEY, Y_IMAGE_KEY};
use crate::sampler::{sample_calibration, sample_viewport};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// 实时编辑同步器
pub struct LiveEditReconciler {
    viewport: Arc<dyn Viewport>,
    overlays: Arc<dyn OverlaySource>,
    pending: Mutex<HashMap<NodeId, PixelCoord>>,
}

impl LiveEditReconciler {
    /// 创建同步器
    pub fn new(viewport: Arc<dyn Viewport>, overlays: Arc<dyn OverlaySource>) -> Arc<Self> {
        Arc::new(Self {
            viewport,
            overlays,
            pending: Mutex::new(HashMap::new()),
        })
    }

    /// 待移动的节点数量
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// 执行所有待移动节点的位置更新
    ///
    /// 返回实际移动的节点数。没有叠加图层或标定不可用时什么都不做。
    pub fn flush(&self, dataset: &DataSet) -> usize {
        let pending: Vec<(NodeId, PixelCoord)> = self.pending.lock().drain().collect();
        if pending.is_empty() {
            return 0;
        }

        match self.apply(dataset, &pending) {
            Ok(moved) => {
                tracing::debug!("Live edit moved {} nodes", moved);
                moved
            }
            Err(e) if e.is_recoverable() => {
                tracing::debug!("Live edit skipped {} nodes: {}", pending.len(), e);
                0
            }
            Err(e) => {
                tracing::warn!("Live edit failed for {} nodes: {}", pending.len(), e);
                0
            }
        }
    }

    fn current_transformer(&self) -> OverlayResult<InverseTransformer> {
        let overlay = self
            .overlays
            .active_overlay()
            .ok_or(OverlayError::MissingOverlay)?;
        let view = sample_viewport(self.viewport.as_ref())?;
        let calibration = sample_calibration(overlay.as_ref(), &view)?;
        InverseTransformer::new(TransformParameterRecord::from_samples(&view, &calibration))
    }

    fn apply(&self, dataset: &DataSet, pending: &[(NodeId, PixelCoord)]) -> OverlayResult<usize> {
        let transformer = self.current_transformer()?;

        let mut tx = dataset.begin_update(ChangeOrigin::LiveEdit);
        let mut moved = 0;
        for (id, pixel) in pending {
            // 执行前已被删除的节点直接忽略
            if tx.node(*id).is_none() {
                continue;
            }
            tx.set_node_coord(*id, transformer.east_north(*pixel))?;
            moved += 1;
        }
        Ok(moved)
    }
}

impl DataSetListener for LiveEditReconciler {
    fn on_event(&self, event: &DataSetEvent) {
        let DataSetEvent::TagsChanged {
            primitive: PrimitiveId::Node(id),
            original,
            current,
            origin: ChangeOrigin::User,
        } = event
        else {
            return;
        };

        let changed = [X_IMAGE_KEY, Y_IMAGE_KEY]
            .iter()
            .any(|k| original.get(*k) != current.get(*k));
        if !changed {
            return;
        }

        // 最后一次修改无效时撤销之前登记的移动
        match pixel_from_attributes(current) {
            Ok(Some(pixel)) => {
                tracing::trace!("Live edit scheduled for {} at ({}, {})", id, pixel.x, pixel.y);
                self.pending.lock().insert(*id, pixel);
            }
            Ok(None) => {
                self.pending.lock().remove(id);
            }
            Err(e) => {
                tracing::trace!("Live edit ignored for {}: {}", id, e);
                self.pending.lock().remove(id);
            }
        }
    }

    fn name(&self) -> &str {
        "LiveEditReconciler"
    }
}

/// 编辑会话
///
/// 打开时注册同步器，关闭或析构时注销。
pub struct EditSession {
    reconciler: Arc<LiveEditReconciler>,
    subscription: Subscription,
}

impl EditSession {
    /// 打开会话
    pub fn open(dataset: &DataSet, reconciler: Arc<LiveEditReconciler>) -> Self {
        let subscription = dataset.subscribe(reconciler.clone());
        tracing::debug!("Edit session opened");
        Self {
            reconciler,
            subscription,
        }
    }

    /// 同步器
    pub fn reconciler(&self) -> &Arc<LiveEditReconciler> {
        &self.reconciler
    }

    /// 执行待移动节点的位置更新
    pub fn flush(&self, dataset: &DataSet) -> usize {
        self.reconciler.flush(dataset)
    }

    /// 关闭会话
    pub fn close(self) {
        self.subscription.detach();
        tracing::debug!("Edit session closed");
    }
}
