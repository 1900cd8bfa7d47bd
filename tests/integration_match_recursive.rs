//! 递归遍历集成测试
//!
//! 测试范围：
//! - while / maxDepth 控制的深度优先展开
//! - $depth、depthAlias 与 pathAlias
//! - 箭头量词 * + {n} {m,n}
//! - 环路终止、多路径到达同一顶点
//! - 组织结构与三角形等典型查询

mod common;

use common::assertions::*;
use common::data_fixtures::*;
use common::engine_for;
use graphdb_match::core::Value;

const FROM_N1: &str = "MATCH {class: Person, where: (name = 'n1')}.out('Friend')";

fn friends_from_n1(filter: &str) -> Vec<String> {
    let engine = engine_for(friend_graph());
    let query = format!("{}{{as: f, {}}} RETURN f.name", FROM_N1, filter);
    column_strings(&run(&engine, &query), "f.name")
}

// ==================== while 与 maxDepth ====================

#[test]
fn test_while_depth_limit_includes_origin() {
    assert_eq!(friends_from_n1("while: ($depth < 1)"), vec!["n1", "n2", "n3"]);
}

#[test]
fn test_while_with_depth_where() {
    assert_eq!(
        friends_from_n1("while: ($depth < 2), where: ($depth = 1)"),
        vec!["n2", "n3"]
    );
}

#[test]
fn test_while_true_visits_in_depth_first_order() {
    assert_eq!(
        friends_from_n1("while: (true)"),
        vec!["n1", "n2", "n4", "n5", "n6", "n3"]
    );
}

#[test]
fn test_max_depth() {
    assert_eq!(friends_from_n1("maxDepth: 0"), vec!["n1"]);
    assert_eq!(friends_from_n1("maxDepth: 1"), vec!["n1", "n2", "n3"]);
    assert_eq!(
        friends_from_n1("maxDepth: 1, where: ($depth > 0)"),
        vec!["n2", "n3"]
    );
}

#[test]
fn test_while_false_emits_only_origin() {
    assert_eq!(friends_from_n1("while: (false)"), vec!["n1"]);
}

// ==================== depthAlias 与 pathAlias ====================

#[test]
fn test_depth_alias() {
    let engine = engine_for(friend_graph());
    let query = format!("{}{{as: f, while: (true), depthAlias: d}} RETURN f.name, d", FROM_N1);
    let rows = run(&engine, &query);
    assert_eq!(column_ints(&rows, "d"), vec![0, 1, 2, 3, 3, 1]);
}

#[test]
fn test_path_alias_lengths() {
    let engine = engine_for(friend_graph());
    let query = format!(
        "{}{{as: f, while: (true), pathAlias: p}} RETURN f.name, p.size() AS len",
        FROM_N1
    );
    let rows = run(&engine, &query);
    assert_eq!(column_ints(&rows, "len"), vec![1, 2, 3, 4, 4, 2]);
}

#[test]
fn test_path_alias_holds_vertices_in_order() {
    let engine = engine_for(friend_graph());
    let query = format!(
        "{}{{as: f, while: (true), where: (name = 'n5'), pathAlias: p}} RETURN p",
        FROM_N1
    );
    let rows = run(&engine, &query);
    assert_count(&rows, 1, "结果行");
    let Some(Value::List(path)) = rows[0].get("p") else {
        panic!("p 应该是列表: {:?}", rows[0]);
    };
    let names: Vec<Value> = path.iter().map(|v| v.property("name")).collect();
    assert_eq!(
        names,
        vec![
            Value::from("n1"),
            Value::from("n2"),
            Value::from("n4"),
            Value::from("n5")
        ]
    );
}

// ==================== 箭头量词 ====================

#[test]
fn test_arrow_exact_repetition() {
    let engine = engine_for(friend_graph());
    let rows = run(
        &engine,
        "MATCH {class: Person, as: a, where: (name = 'n1')}-Friend{2}->{as: b} RETURN b.name",
    );
    assert_eq!(column_strings(&rows, "b.name"), vec!["n4"]);
}

#[test]
fn test_arrow_bounded_range() {
    let engine = engine_for(friend_graph());
    let rows = run(
        &engine,
        "MATCH {class: Person, as: a, where: (name = 'n1')}-Friend{1,3}->{as: b} RETURN b.name",
    );
    assert_eq!(
        column_strings(&rows, "b.name"),
        vec!["n2", "n4", "n5", "n6", "n3"]
    );
}

#[test]
fn test_arrow_star_and_plus() {
    let engine = engine_for(friend_graph());
    let star = run(
        &engine,
        "MATCH {class: Person, as: a, where: (name = 'n1')}-Friend*->{as: b} RETURN b.name",
    );
    assert_count(&star, 6, "结果行");
    assert_eq!(column_strings(&star, "b.name")[0], "n1");

    let plus = run(
        &engine,
        "MATCH {class: Person, as: a, where: (name = 'n1')}-Friend+->{as: b} RETURN b.name",
    );
    assert_eq!(
        column_strings(&plus, "b.name"),
        vec!["n2", "n4", "n5", "n6", "n3"]
    );
}

// ==================== 环路与多路径 ====================

#[test]
fn test_cycle_terminates() {
    let engine = engine_for(triangle_graph());
    let rows = run(
        &engine,
        "MATCH {class: TriangleV, as: a, where: (uid = 0)}.out('TriangleE'){as: b, while: (true)} RETURN DISTINCT b.uid",
    );
    assert_count(&rows, 9, "不同顶点");
}

#[test]
fn test_cycle_path_elements() {
    let engine = engine_for(triangle_graph());
    let rows = run(
        &engine,
        "MATCH {class: TriangleV, as: a, where: (uid = 0)}.out('TriangleE'){as: b, while: (true)} RETURN $pathElements",
    );
    assert_count(&rows, 9, "路径元素");
    assert!(rows.iter().all(|r| r.is_element()));
}

#[test]
fn test_diamond_reaches_sink_twice() {
    let engine = engine_for(diamond_graph());
    let query = "MATCH {class: DiamondV, as: a, where: (uid = 0)}.out('DiamondE'){as: b, while: (true)}";

    let rows = run(&engine, &format!("{} RETURN b.uid", query));
    assert_eq!(column_ints(&rows, "b.uid"), vec![0, 1, 3, 2, 3]);

    let distinct = run(&engine, &format!("{} RETURN DISTINCT b.uid", query));
    assert_eq!(column_ints(&distinct, "b.uid"), vec![0, 1, 3, 2]);

    let elements = run(&engine, &format!("{} RETURN $pathElements", query));
    assert_count(&elements, 4, "路径元素");
}

// ==================== 典型查询 ====================

#[test]
fn test_department_manager_lookup() {
    let engine = engine_for(org_chart());
    let rows = run(
        &engine,
        "MATCH {class: Employee, as: e, where: (name = 'p1')}.out('WorksAt'){}.out('ParentDepartment'){while: (in('ManagerOf').size() == 0), where: (in('ManagerOf').size() > 0)}.in('ManagerOf'){as: manager} RETURN manager.name",
    );
    assert_eq!(column_strings(&rows, "manager.name"), vec!["mc"]);
}

#[test]
fn test_manager_for_every_employee() {
    let engine = engine_for(org_chart());
    let rows = run(
        &engine,
        "MATCH {class: Employee, as: e}.out('WorksAt'){}.out('ParentDepartment'){while: (in('ManagerOf').size() == 0), where: (in('ManagerOf').size() > 0)}.in('ManagerOf'){as: manager} RETURN e.name, manager.name",
    );
    assert_eq!(
        column_strings(&rows, "e.name"),
        vec!["p1", "p2", "p3", "p4"]
    );
    assert_eq!(
        column_strings(&rows, "manager.name"),
        vec!["mc", "mc", "ma", "ma"]
    );
}

#[test]
fn test_triangles() {
    let engine = engine_for(triangle_graph());
    let rows = run(
        &engine,
        "MATCH {class: TriangleV, as: a}.out('TriangleE'){as: b}.out('TriangleE'){as: c}, {as: a}.out('TriangleE'){as: c} RETURN a.uid, b.uid, c.uid",
    );
    assert_eq!(column_ints(&rows, "a.uid"), vec![0, 7, 8]);
    assert_eq!(column_ints(&rows, "b.uid"), vec![1, 8, 3]);
    assert_eq!(column_ints(&rows, "c.uid"), vec![2, 9, 4]);
}

#[test]
fn test_matched_comparison_between_vertices() {
    let engine = engine_for(triangle_graph());
    let rows = run(
        &engine,
        "MATCH {class: TriangleV, as: a}.out('TriangleE'){as: b, where: (uid > $matched.a.uid)} RETURN a.uid, b.uid",
    );
    assert_count(&rows, 12, "结果行");
}
