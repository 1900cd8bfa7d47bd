//! 图快照
//!
//! JSON 格式的图数据，用于命令行工具和测试装载 `MemoryGraphStore`：
//!
//! ```json
//! {
//!   "classes":  [{"name": "Person"}, {"name": "Friend", "kind": "edge"}],
//!   "vertices": [{"key": "n1", "class": "Person", "properties": {"name": "n1"}}],
//!   "edges":    [{"label": "Friend", "from": "n1", "to": "n2"}]
//! }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::memory_storage::{ClassKind, MemoryGraphStore};
use crate::core::{Properties, StorageError, StorageResult, Value, VertexId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub classes: Vec<ClassSpec>,
    #[serde(default)]
    pub vertices: Vec<VertexSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSpec {
    pub name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub kind: ClassKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexSpec {
    /// 快照内唯一的键，边通过它引用端点
    pub key: String,
    pub class: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub label: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

fn to_properties(map: &serde_json::Map<String, serde_json::Value>) -> Properties {
    map.iter()
        .map(|(k, v)| (k.clone(), Value::from_json(v)))
        .collect()
}

impl MemoryGraphStore {
    /// 从快照构建存储；类需按父类在前的顺序声明
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> StorageResult<Self> {
        let store = MemoryGraphStore::new();
        for class in &snapshot.classes {
            match class.kind {
                ClassKind::Vertex => {
                    store.create_vertex_class(&class.name, class.superclass.as_deref())?
                }
                ClassKind::Edge => {
                    store.create_edge_class(&class.name, class.superclass.as_deref())?
                }
            }
        }

        let mut keys: HashMap<&str, VertexId> = HashMap::new();
        for vertex in &snapshot.vertices {
            if keys.contains_key(vertex.key.as_str()) {
                return Err(StorageError::AlreadyExists(format!("顶点键 {}", vertex.key)));
            }
            let id = store.add_vertex(&vertex.class, to_properties(&vertex.properties))?;
            keys.insert(vertex.key.as_str(), id);
        }

        for edge in &snapshot.edges {
            let resolve = |key: &str| {
                keys.get(key)
                    .copied()
                    .ok_or_else(|| StorageError::NotFound(format!("顶点键 {}", key)))
            };
            let src = resolve(&edge.from)?;
            let dst = resolve(&edge.to)?;
            store.add_edge(&edge.label, src, dst, to_properties(&edge.properties))?;
        }

        log::debug!(
            "图快照装载完成: {} 个顶点, {} 条边",
            store.vertex_count(),
            store.edge_count()
        );
        Ok(store)
    }

    pub fn from_json_str(json: &str) -> StorageResult<Self> {
        let snapshot: GraphSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(&snapshot)
    }

    pub fn load_json_file<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Direction;
    use crate::storage::GraphStore;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "classes": [
            {"name": "Person"},
            {"name": "Employee", "superclass": "Person"},
            {"name": "Friend", "kind": "edge"}
        ],
        "vertices": [
            {"key": "a", "class": "Person", "properties": {"name": "a", "age": 30}},
            {"key": "b", "class": "Employee", "properties": {"name": "b"}}
        ],
        "edges": [
            {"label": "Friend", "from": "a", "to": "b", "properties": {"since": 2020}}
        ]
    }"#;

    #[test]
    fn test_load_snapshot() {
        let store = MemoryGraphStore::from_json_str(SAMPLE).expect("Failed to load snapshot");
        assert_eq!(store.vertex_count(), 2);
        assert_eq!(store.edge_count(), 1);

        let people = store
            .entities_of_class(Some("Person"), true)
            .expect("scan Person");
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].get_property("age"), Value::Int(30));

        let friends = store
            .edges(people[0].id, &[], Direction::Out)
            .expect("out edges");
        assert_eq!(friends[0].0.get_property("since"), Value::Int(2020));
    }

    #[test]
    fn test_unknown_vertex_key() {
        let json = r#"{"vertices": [{"key": "a", "class": "V"}],
                       "edges": [{"label": "E", "from": "a", "to": "zz"}]}"#;
        let err = MemoryGraphStore::from_json_str(json).expect_err("must fail on unknown key");
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn test_duplicate_vertex_key() {
        let json = r#"{"vertices": [{"key": "a", "class": "V"}, {"key": "a", "class": "V"}]}"#;
        let err = MemoryGraphStore::from_json_str(json).expect_err("must fail on duplicate key");
        assert!(matches!(err, StorageError::AlreadyExists(_)));
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temporary file");
        file.write_all(SAMPLE.as_bytes())
            .expect("Failed to write snapshot");
        let store = MemoryGraphStore::load_json_file(file.path()).expect("Failed to load file");
        assert_eq!(store.vertex_count(), 2);
    }

    #[test]
    fn test_malformed_json() {
        let err = MemoryGraphStore::from_json_str("{ not json").expect_err("must fail");
        assert!(matches!(err, StorageError::DeserializeError(_)));
    }
}
