//! 值与 JSON 之间的转换
//!
//! 图快照加载与命令行输出都走这里

use super::types::Value;
use crate::core::vertex_edge_path::{Edge, Vertex};
use serde_json::{Map as JsonMap, Number, Value as JsonValue};
use std::collections::BTreeMap;

impl Value {
    /// 转换为 JSON，实体输出 `@rid`、`@class` 和全部属性
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::Number((*i).into()),
            Value::Float(f) => Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::List(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(map) => JsonValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<JsonMap<_, _>>(),
            ),
            Value::Vertex(v) => vertex_to_json(v),
            Value::Edge(e) => edge_to_json(e),
        }
    }

    /// 从 JSON 构造值，对象映射为 `Map`
    pub fn from_json(json: &JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(items) => Value::List(items.iter().map(Value::from_json).collect()),
            JsonValue::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect::<BTreeMap<_, _>>(),
            ),
        }
    }
}

fn vertex_to_json(v: &Vertex) -> JsonValue {
    let mut obj = JsonMap::new();
    obj.insert("@rid".to_string(), JsonValue::String(v.rid()));
    obj.insert("@class".to_string(), JsonValue::String(v.class.clone()));
    for (k, val) in &v.properties {
        obj.insert(k.clone(), val.to_json());
    }
    JsonValue::Object(obj)
}

fn edge_to_json(e: &Edge) -> JsonValue {
    let mut obj = JsonMap::new();
    obj.insert("@rid".to_string(), JsonValue::String(e.rid()));
    obj.insert("@class".to_string(), JsonValue::String(e.label.clone()));
    obj.insert("out".to_string(), JsonValue::String(format!("#{}", e.src)));
    obj.insert("in".to_string(), JsonValue::String(format!("#{}", e.dst)));
    for (k, val) in &e.properties {
        obj.insert(k.clone(), val.to_json());
    }
    JsonValue::Object(obj)
}
