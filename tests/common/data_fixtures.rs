//! 测试数据生成模块
//!
//! 提供各集成测试使用的小型图

use graphdb_match::core::{Properties, Value, VertexId};
use graphdb_match::MemoryGraphStore;

fn named(name: &str) -> Properties {
    let mut props = Properties::new();
    props.insert("name".to_string(), Value::String(name.to_string()));
    props
}

fn numbered(uid: i64) -> Properties {
    let mut props = Properties::new();
    props.insert("uid".to_string(), Value::Int(uid));
    props
}

fn link(store: &MemoryGraphStore, label: &str, ids: &[VertexId], edges: &[(usize, usize)]) {
    for &(from, to) in edges {
        store
            .add_edge(label, ids[from], ids[to], Properties::new())
            .expect("Failed to add edge");
    }
}

/// 朋友图：Person n1..n6，有向 Friend 边
/// n1→n2, n1→n3, n2→n4, n4→n5, n4→n6
pub fn friend_graph() -> MemoryGraphStore {
    let store = MemoryGraphStore::new();
    store
        .create_vertex_class("Person", None)
        .expect("Failed to create class");
    store
        .create_edge_class("Friend", None)
        .expect("Failed to create class");
    let ids: Vec<VertexId> = (1..=6)
        .map(|i| {
            store
                .add_vertex("Person", named(&format!("n{}", i)))
                .expect("Failed to add vertex")
        })
        .collect();
    link(&store, "Friend", &ids, &[(0, 1), (0, 2), (1, 3), (3, 4), (3, 5)]);
    store
}

/// 组织结构：部门 a ← b ← c ← d（ParentDepartment 由子指向父），
/// ma 管理 a，mc 管理 c；p1 在 d，p2 在 c，p3 在 b，p4 在 a
pub fn org_chart() -> MemoryGraphStore {
    let store = MemoryGraphStore::new();
    store
        .create_vertex_class("Department", None)
        .expect("Failed to create class");
    store
        .create_vertex_class("Employee", None)
        .expect("Failed to create class");
    store
        .create_vertex_class("Manager", Some("Employee"))
        .expect("Failed to create class");

    let depts: Vec<VertexId> = ["a", "b", "c", "d"]
        .iter()
        .map(|n| store.add_vertex("Department", named(n)).expect("Failed to add vertex"))
        .collect();
    link(&store, "ParentDepartment", &depts, &[(1, 0), (2, 1), (3, 2)]);

    let ma = store.add_vertex("Manager", named("ma")).expect("Failed to add vertex");
    let mc = store.add_vertex("Manager", named("mc")).expect("Failed to add vertex");
    store
        .add_edge("ManagerOf", ma, depts[0], Properties::new())
        .expect("Failed to add edge");
    store
        .add_edge("ManagerOf", mc, depts[2], Properties::new())
        .expect("Failed to add edge");

    for (name, dept) in [("p1", 3), ("p2", 2), ("p3", 1), ("p4", 0)] {
        let id = store.add_vertex("Employee", named(name)).expect("Failed to add vertex");
        store
            .add_edge("WorksAt", id, depts[dept], Properties::new())
            .expect("Failed to add edge");
    }
    store
}

/// 三角形图：TriangleV uid 0..9，有向 TriangleE 边
pub fn triangle_graph() -> MemoryGraphStore {
    let store = MemoryGraphStore::new();
    let ids: Vec<VertexId> = (0..10)
        .map(|i| store.add_vertex("TriangleV", numbered(i)).expect("Failed to add vertex"))
        .collect();
    link(
        &store,
        "TriangleE",
        &ids,
        &[
            (0, 1),
            (0, 2),
            (1, 2),
            (1, 3),
            (2, 4),
            (3, 4),
            (3, 5),
            (4, 0),
            (4, 7),
            (6, 7),
            (7, 8),
            (7, 9),
            (8, 9),
            (9, 1),
            (8, 3),
            (8, 4),
        ],
    );
    store
}

/// 菱形图：0→1, 0→2, 1→3, 2→3
pub fn diamond_graph() -> MemoryGraphStore {
    let store = MemoryGraphStore::new();
    let ids: Vec<VertexId> = (0..4)
        .map(|i| store.add_vertex("DiamondV", numbered(i)).expect("Failed to add vertex"))
        .collect();
    link(&store, "DiamondE", &ids, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
    store
}

/// 链式图 a→b→c，用于 NOT 模式；`shortcut` 为真时追加 a→c
pub fn chain_graph(shortcut: bool) -> MemoryGraphStore {
    let store = MemoryGraphStore::new();
    let ids: Vec<VertexId> = ["a", "b", "c"]
        .iter()
        .map(|n| store.add_vertex("V", named(n)).expect("Failed to add vertex"))
        .collect();
    link(&store, "link", &ids, &[(0, 1), (1, 2)]);
    if shortcut {
        link(&store, "link", &ids, &[(0, 2)]);
    }
    store
}

/// 朋友图的 JSON 快照
pub const FRIEND_SNAPSHOT: &str = r#"{
  "classes": [
    {"name": "Person"},
    {"name": "Friend", "kind": "edge"}
  ],
  "vertices": [
    {"key": "n1", "class": "Person", "properties": {"name": "n1"}},
    {"key": "n2", "class": "Person", "properties": {"name": "n2"}},
    {"key": "n3", "class": "Person", "properties": {"name": "n3"}}
  ],
  "edges": [
    {"label": "Friend", "from": "n1", "to": "n2"},
    {"label": "Friend", "from": "n2", "to": "n3", "properties": {"since": 2020}}
  ]
}"#;
