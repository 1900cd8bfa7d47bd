use std::sync::Arc;

use crate::core::{Direction, Edge, StorageResult, Vertex, VertexId};

/// 只读图存储接口
///
/// 匹配执行器只通过该接口访问数据：按类（多态）枚举顶点，
/// 按标签与方向遍历邻接边。返回顺序即插入顺序，执行结果的枚举顺序依赖于此。
pub trait GraphStore: Send + Sync {
    /// 按类枚举顶点；`class` 为空时返回全部顶点，`polymorphic` 为真时包含子类
    fn entities_of_class(
        &self,
        class: Option<&str>,
        polymorphic: bool,
    ) -> StorageResult<Vec<Arc<Vertex>>>;

    /// 遍历顶点的邻接边，返回 (边, 邻居) 对
    ///
    /// `labels` 为空表示不限标签，否则按边类多态匹配任一标签；
    /// `Both` 先返回出边再返回入边，自环在两个方向各返回一次
    fn edges(
        &self,
        vertex: VertexId,
        labels: &[String],
        direction: Direction,
    ) -> StorageResult<Vec<(Arc<Edge>, Arc<Vertex>)>>;

    /// 按 ID 查找顶点
    fn vertex(&self, id: VertexId) -> StorageResult<Option<Arc<Vertex>>>;

    /// `class` 是否为 `ancestor` 或其子类
    fn is_subclass_of(&self, class: &str, ancestor: &str) -> bool;

    /// 类是否已定义（顶点类或边类）
    fn has_class(&self, name: &str) -> bool;
}
