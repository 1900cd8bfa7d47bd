//! 值类型定义
//!
//! `Value` 是表达式求值、环境绑定和结果投影共用的动态值。
//! 图实体以 `Arc` 共享，环境扩展时只复制指针。

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::vertex_edge_path::{Edge, Vertex};

/// 动态值
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Vertex(Arc<Vertex>),
    Edge(Arc<Edge>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// 是否为图实体（顶点或边）
    pub fn is_entity(&self) -> bool {
        matches!(self, Value::Vertex(_) | Value::Edge(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// 数值视图，整数提升为浮点
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vertex(&self) -> Option<&Arc<Vertex>> {
        match self {
            Value::Vertex(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Arc<Edge>> {
        match self {
            Value::Edge(e) => Some(e),
            _ => None,
        }
    }

    /// SQL 三值逻辑下的真值判断：只有 `true` 为真
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOL",
            Value::Int(_) => "INT",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::List(_) => "LIST",
            Value::Map(_) => "MAP",
            Value::Vertex(_) => "VERTEX",
            Value::Edge(_) => "EDGE",
        }
    }

    /// 读取属性：实体读记录属性，映射读键，其余返回空值
    pub fn property(&self, name: &str) -> Value {
        match self {
            Value::Vertex(v) => v.get_property(name),
            Value::Edge(e) => e.get_property(name),
            Value::Map(m) => m.get(name).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// 实体身份键，用于集合语义的去重
    pub fn entity_key(&self) -> Option<EntityKey> {
        match self {
            Value::Vertex(v) => Some(EntityKey::Vertex(v.id)),
            Value::Edge(e) => Some(EntityKey::Edge(e.id)),
            _ => None,
        }
    }
}

/// 实体身份
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    Vertex(u64),
    Edge(u64),
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Arc<Vertex>> for Value {
    fn from(v: Arc<Vertex>) -> Self {
        Value::Vertex(v)
    }
}

impl From<Arc<Edge>> for Value {
    fn from(e: Arc<Edge>) -> Self {
        Value::Edge(e)
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Value::List(list)
    }
}
