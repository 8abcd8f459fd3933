// crates/og_overlay/src/notify.rs

//! 被动通知
//!
//! 导出、导入和采集在回退时向用户发出提示，提示从不中断操作。

use parking_lot::Mutex;

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// 信息
    Info,
    /// 警告
    Warning,
    /// 错误
    Error,
}

/// 通知接收方
pub trait Notifier: Send + Sync {
    /// 发出一条通知
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// 转发到 tracing 的通知接收方
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info => tracing::info!("{}", message),
            NoticeLevel::Warning => tracing::warn!("{}", message),
            NoticeLevel::Error => tracing::error!("{}", message),
        }
    }
}

/// 记录所有通知的接收方
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl MemoryNotifier {
    /// 创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 已收到的通知
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().clone()
    }

    /// 某级别的通知数量
    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices.lock().iter().filter(|(l, _)| *l == level).count()
    }

    /// 是否有包含给定文本的通知
    pub fn contains(&self, needle: &str) -> bool {
        self.notices.lock().iter().any(|(_, m)| m.contains(needle))
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices.lock().push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier() {
        let notifier = MemoryNotifier::new();
        notifier.notify(NoticeLevel::Warning, "no overlay");
        notifier.notify(NoticeLevel::Info, "done");
        assert_eq!(notifier.count(NoticeLevel::Warning), 1);
        assert!(notifier.contains("overlay"));
        assert_eq!(notifier.notices().len(), 2);
    }
}
