//! 集成测试共享工具模块
//!
//! 提供测试图、引擎构造和结果断言，供所有集成测试使用

#![allow(dead_code)]

pub mod assertions;
pub mod data_fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use graphdb_match::config::QueryConfig;
use graphdb_match::core::{Direction, Edge, StorageResult, Vertex, VertexId};
use graphdb_match::{GraphStore, MatchEngine, MemoryGraphStore};

/// 用默认查询配置创建引擎
pub fn engine_for(store: MemoryGraphStore) -> MatchEngine {
    MatchEngine::new(Arc::new(store), QueryConfig::default()).expect("Failed to create engine")
}

/// 统计存储访问次数的包装器，用于验证惰性执行
pub struct CountingStore {
    inner: MemoryGraphStore,
    scans: AtomicUsize,
    expansions: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: MemoryGraphStore) -> Self {
        Self {
            inner,
            scans: AtomicUsize::new(0),
            expansions: AtomicUsize::new(0),
        }
    }

    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn expansions(&self) -> usize {
        self.expansions.load(Ordering::SeqCst)
    }
}

impl GraphStore for CountingStore {
    fn entities_of_class(
        &self,
        class: Option<&str>,
        polymorphic: bool,
    ) -> StorageResult<Vec<Arc<Vertex>>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.entities_of_class(class, polymorphic)
    }

    fn edges(
        &self,
        vertex: VertexId,
        labels: &[String],
        direction: Direction,
    ) -> StorageResult<Vec<(Arc<Edge>, Arc<Vertex>)>> {
        self.expansions.fetch_add(1, Ordering::SeqCst);
        self.inner.edges(vertex, labels, direction)
    }

    fn vertex(&self, id: VertexId) -> StorageResult<Option<Arc<Vertex>>> {
        self.inner.vertex(id)
    }

    fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool {
        self.inner.is_subclass_of(class, ancestor)
    }

    fn has_class(&self, name: &str) -> bool {
        self.inner.has_class(name)
    }
}
