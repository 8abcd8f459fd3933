// crates/og_overlay/src/dataset/primitives.rs

//! 图元：节点与路径

use og_geo::EastNorth;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 属性表
pub type Tags = BTreeMap<String, String>;

/// 节点 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

/// 路径 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WayId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl fmt::Display for WayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// 任意图元 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveId {
    /// 节点
    Node(NodeId),
    /// 路径
    Way(WayId),
}

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => id.fmt(f),
            Self::Way(id) => id.fmt(f),
        }
    }
}

/// 节点
///
/// `coord` 为 `None` 表示坐标未设置（例如刚从文件解析、尚未换算）。
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// ID
    pub id: NodeId,
    /// 投影坐标
    pub coord: Option<EastNorth>,
    /// 属性
    pub tags: Tags,
}

impl Node {
    /// 读取属性
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// 路径
#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    /// ID
    pub id: WayId,
    /// 节点序列
    pub nodes: Vec<NodeId>,
    /// 属性
    pub tags: Tags,
}

impl Way {
    /// 读取属性
    pub fn get(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// 是否含有某个键
    pub fn has_key(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }
}
