//! 图实体：顶点、边与遍历方向
//!
//! 顶点与边都以记录 ID 作为身份，相等性与哈希只看 ID，
//! 便于在匹配环境中做一致性校验和去重。

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::core::value::Value;

/// 顶点记录 ID
pub type VertexId = u64;
/// 边记录 ID
pub type EdgeId = u64;

/// 属性集合，按键有序
pub type Properties = BTreeMap<String, Value>;

/// 边的遍历方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Out,
    In,
    Both,
}

impl Direction {
    /// 反向遍历时使用的方向
    pub fn reverse(self) -> Self {
        match self {
            Direction::Out => Direction::In,
            Direction::In => Direction::Out,
            Direction::Both => Direction::Both,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Out => write!(f, "out"),
            Direction::In => write!(f, "in"),
            Direction::Both => write!(f, "both"),
        }
    }
}

/// 顶点
#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: VertexId,
    pub class: String,
    pub properties: Properties,
}

impl Vertex {
    pub fn new(id: VertexId, class: impl Into<String>, properties: Properties) -> Self {
        Self {
            id,
            class: class.into(),
            properties,
        }
    }

    /// 读取属性，`@rid` 与 `@class` 为记录属性
    pub fn get_property(&self, name: &str) -> Value {
        match name {
            "@rid" => Value::String(self.rid()),
            "@class" => Value::String(self.class.clone()),
            _ => self.properties.get(name).cloned().unwrap_or(Value::Null),
        }
    }

    /// 形如 `#12` 的记录标识
    pub fn rid(&self) -> String {
        format!("#{}", self.id)
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Vertex {}

impl Hash for Vertex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// 边
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub label: String,
    pub src: VertexId,
    pub dst: VertexId,
    pub properties: Properties,
}

impl Edge {
    pub fn new(
        id: EdgeId,
        label: impl Into<String>,
        src: VertexId,
        dst: VertexId,
        properties: Properties,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            src,
            dst,
            properties,
        }
    }

    pub fn get_property(&self, name: &str) -> Value {
        match name {
            "@rid" => Value::String(self.rid()),
            "@class" => Value::String(self.label.clone()),
            "out" => Value::Int(self.src as i64),
            "in" => Value::Int(self.dst as i64),
            _ => self.properties.get(name).cloned().unwrap_or(Value::Null),
        }
    }

    pub fn rid(&self) -> String {
        format!("#e{}", self.id)
    }

    /// 给定一端顶点，返回另一端
    pub fn other_end(&self, vertex: VertexId) -> VertexId {
        if self.src == vertex {
            self.dst
        } else {
            self.src
        }
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
