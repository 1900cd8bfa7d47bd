use super::GraphStore;
use crate::core::{
    Direction, Edge, EdgeId, Properties, StorageError, StorageResult, Vertex, VertexId,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// 类的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Vertex,
    Edge,
}

#[derive(Debug, Clone)]
struct ClassDef {
    superclass: Option<String>,
    kind: ClassKind,
}

#[derive(Debug, Default)]
struct GraphData {
    classes: HashMap<String, ClassDef>,
    vertices: BTreeMap<VertexId, Arc<Vertex>>,
    edges: BTreeMap<EdgeId, Arc<Edge>>,
    out_edges: HashMap<VertexId, Vec<EdgeId>>,
    in_edges: HashMap<VertexId, Vec<EdgeId>>,
    next_vertex_id: VertexId,
    next_edge_id: EdgeId,
}

impl GraphData {
    fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        let mut current = Some(class);
        // 继承链长度不会超过类的数量，超过即说明存在环
        let mut remaining = self.classes.len() + 1;
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            if remaining == 0 {
                return false;
            }
            remaining -= 1;
            current = self
                .classes
                .get(name)
                .and_then(|def| def.superclass.as_deref());
        }
        false
    }

    fn label_matches(&self, label: &str, labels: &[String]) -> bool {
        labels.is_empty() || labels.iter().any(|l| self.is_subclass_of(label, l))
    }

    fn define_class(
        &mut self,
        name: &str,
        superclass: Option<&str>,
        kind: ClassKind,
    ) -> StorageResult<()> {
        if self.classes.contains_key(name) {
            return Err(StorageError::AlreadyExists(format!("类 {}", name)));
        }
        if let Some(parent) = superclass {
            match self.classes.get(parent) {
                None => return Err(StorageError::NotFound(format!("父类 {}", parent))),
                Some(def) if def.kind != kind => {
                    return Err(StorageError::InvalidInput(format!(
                        "类 {} 与父类 {} 的种类不一致",
                        name, parent
                    )))
                }
                Some(_) => {}
            }
        }
        self.classes.insert(
            name.to_string(),
            ClassDef {
                superclass: superclass.map(str::to_string),
                kind,
            },
        );
        Ok(())
    }

    fn ensure_class(&mut self, name: &str, kind: ClassKind) -> StorageResult<()> {
        match self.classes.get(name) {
            Some(def) if def.kind != kind => Err(StorageError::InvalidInput(format!(
                "类 {} 不是{}类",
                name,
                if kind == ClassKind::Vertex { "顶点" } else { "边" }
            ))),
            Some(_) => Ok(()),
            None => self.define_class(name, None, kind),
        }
    }

    fn neighbor(&self, id: VertexId) -> StorageResult<Arc<Vertex>> {
        self.vertices
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("顶点 #{}", id)))
    }

    fn edge(&self, id: EdgeId) -> StorageResult<&Arc<Edge>> {
        self.edges
            .get(&id)
            .ok_or_else(|| StorageError::NotFound(format!("边 #e{}", id)))
    }
}

/// 内存图存储
///
/// 读写锁保护全部数据，读操作之间互不阻塞。
/// 顶点与边的 ID 按插入顺序递增，遍历顺序稳定。
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    data: RwLock<GraphData>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 定义顶点类
    pub fn create_vertex_class(&self, name: &str, superclass: Option<&str>) -> StorageResult<()> {
        self.data
            .write()
            .define_class(name, superclass, ClassKind::Vertex)
    }

    /// 定义边类
    pub fn create_edge_class(&self, name: &str, superclass: Option<&str>) -> StorageResult<()> {
        self.data
            .write()
            .define_class(name, superclass, ClassKind::Edge)
    }

    /// 插入顶点，未定义的类自动注册为根类
    pub fn add_vertex(&self, class: &str, properties: Properties) -> StorageResult<VertexId> {
        let mut data = self.data.write();
        data.ensure_class(class, ClassKind::Vertex)?;
        let id = data.next_vertex_id;
        data.next_vertex_id += 1;
        data.vertices
            .insert(id, Arc::new(Vertex::new(id, class, properties)));
        Ok(id)
    }

    /// 插入边，两端顶点必须存在
    pub fn add_edge(
        &self,
        label: &str,
        src: VertexId,
        dst: VertexId,
        properties: Properties,
    ) -> StorageResult<EdgeId> {
        let mut data = self.data.write();
        for endpoint in [src, dst] {
            if !data.vertices.contains_key(&endpoint) {
                return Err(StorageError::NotFound(format!("顶点 #{}", endpoint)));
            }
        }
        data.ensure_class(label, ClassKind::Edge)?;
        let id = data.next_edge_id;
        data.next_edge_id += 1;
        data.edges
            .insert(id, Arc::new(Edge::new(id, label, src, dst, properties)));
        data.out_edges.entry(src).or_default().push(id);
        data.in_edges.entry(dst).or_default().push(id);
        Ok(id)
    }

    pub fn vertex_count(&self) -> usize {
        self.data.read().vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.data.read().edges.len()
    }
}

impl GraphStore for MemoryGraphStore {
    fn entities_of_class(
        &self,
        class: Option<&str>,
        polymorphic: bool,
    ) -> StorageResult<Vec<Arc<Vertex>>> {
        let data = self.data.read();
        let Some(class) = class else {
            return Ok(data.vertices.values().cloned().collect());
        };
        if !data.classes.contains_key(class) {
            // 未定义的类没有实例
            return Ok(Vec::new());
        }
        Ok(data
            .vertices
            .values()
            .filter(|v| {
                if polymorphic {
                    data.is_subclass_of(&v.class, class)
                } else {
                    v.class == class
                }
            })
            .cloned()
            .collect())
    }

    fn edges(
        &self,
        vertex: VertexId,
        labels: &[String],
        direction: Direction,
    ) -> StorageResult<Vec<(Arc<Edge>, Arc<Vertex>)>> {
        let data = self.data.read();
        let mut result = Vec::new();

        if matches!(direction, Direction::Out | Direction::Both) {
            for edge_id in data.out_edges.get(&vertex).into_iter().flatten() {
                let edge = data.edge(*edge_id)?;
                if data.label_matches(&edge.label, labels) {
                    result.push((edge.clone(), data.neighbor(edge.dst)?));
                }
            }
        }
        if matches!(direction, Direction::In | Direction::Both) {
            for edge_id in data.in_edges.get(&vertex).into_iter().flatten() {
                let edge = data.edge(*edge_id)?;
                if data.label_matches(&edge.label, labels) {
                    result.push((edge.clone(), data.neighbor(edge.src)?));
                }
            }
        }
        Ok(result)
    }

    fn vertex(&self, id: VertexId) -> StorageResult<Option<Arc<Vertex>>> {
        Ok(self.data.read().vertices.get(&id).cloned())
    }

    fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        self.data.read().is_subclass_of(class, ancestor)
    }

    fn has_class(&self, name: &str) -> bool {
        self.data.read().classes.contains_key(name)
    }
}
