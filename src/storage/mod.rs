//! 存储层
//!
//! 匹配引擎只依赖只读的 `GraphStore` 接口；`MemoryGraphStore`
//! 是随库提供的内存实现，可从 JSON 快照装载。

pub mod memory_storage;
pub mod snapshot;
pub mod storage_engine;

pub use memory_storage::{ClassKind, MemoryGraphStore};
pub use snapshot::{ClassSpec, EdgeSpec, GraphSnapshot, VertexSpec};
pub use storage_engine::GraphStore;
