//! 错误处理集成测试
//!
//! 测试范围：
//! - 语法错误
//! - 模式编译错误（未知别名、非法量词、自引用、不相连的 NOT）
//! - 执行期表达式错误与超时，出错后结果流终止

mod common;

use std::time::Duration;

use common::assertions::*;
use common::data_fixtures::*;
use common::engine_for;
use graphdb_match::core::{DBError, QueryError};
use graphdb_match::query::executor::match_path::Deadline;

fn query_error(engine: &graphdb_match::MatchEngine, query: &str) -> DBError {
    engine
        .query(query)
        .expect_err(&format!("查询应该失败: {}", query))
}

// ==================== 语法错误 ====================

#[test]
fn test_syntax_error_reports_position() {
    let engine = engine_for(friend_graph());
    let err = query_error(&engine, "MATCH {class: Person as: a} RETURN a");
    assert!(matches!(err, DBError::Query(QueryError::ParseError(_))));
    assert!(err.to_string().contains("行 1"));
}

#[test]
fn test_unknown_filter_key() {
    let engine = engine_for(friend_graph());
    assert_err_with(
        engine.query("MATCH {klass: Person, as: a} RETURN a"),
        "klass",
    );
}

#[test]
fn test_missing_return() {
    let engine = engine_for(friend_graph());
    let err = query_error(&engine, "MATCH {class: Person, as: a}");
    assert!(matches!(err, DBError::Query(QueryError::ParseError(_))));
}

// ==================== 模式编译错误 ====================

#[test]
fn test_unknown_return_alias() {
    let engine = engine_for(friend_graph());
    let err = query_error(&engine, "MATCH {class: Person, as: a} RETURN b");
    assert!(err.is_invalid_pattern());
}

#[test]
fn test_inverted_quantifier_range() {
    let engine = engine_for(friend_graph());
    let err = query_error(
        &engine,
        "MATCH {class: Person, as: a}-Friend{3,1}->{as: b} RETURN a",
    );
    assert!(err.is_invalid_pattern());
}

#[test]
fn test_self_reference_in_where() {
    let engine = engine_for(friend_graph());
    let err = query_error(
        &engine,
        "MATCH {class: Person, as: a, where: ($matched.a.name = 'n1')} RETURN a",
    );
    assert!(err.is_invalid_pattern());
}

#[test]
fn test_negative_pattern_without_shared_alias() {
    let engine = engine_for(friend_graph());
    let err = query_error(
        &engine,
        "MATCH {class: Person, as: a}, NOT {as: x}.out('Friend'){as: y} RETURN a",
    );
    assert!(err.is_invalid_pattern());
}

#[test]
fn test_group_by_with_pseudo_target() {
    let engine = engine_for(friend_graph());
    let err = query_error(&engine, "MATCH {class: Person, as: a} RETURN $matches GROUP BY a");
    assert!(matches!(err, DBError::Query(QueryError::ExecutionError(_))));
}

#[test]
fn test_failed_compilation_not_cached() {
    let engine = engine_for(friend_graph());
    let _ = engine.query("MATCH {class: Person, as: a} RETURN b");
    assert_eq!(engine.cache_stats().inserts, 0);
}

// ==================== 执行期错误 ====================

#[test]
fn test_unknown_function_aborts_match() {
    let engine = engine_for(friend_graph());
    let err = query_error(
        &engine,
        "MATCH {class: Person, as: a, where: (nosuchfn(name))} RETURN a",
    );
    assert!(matches!(err, DBError::Query(QueryError::CommandExecution(_))));
}

#[test]
fn test_error_after_partial_results_fuses_stream() {
    let engine = engine_for(triangle_graph());
    let mut stream = engine
        .execute("MATCH {class: TriangleV, as: v, where: (10 / (uid - 3) < 0)} RETURN v.uid")
        .expect("Failed to execute");

    let mut uids = Vec::new();
    let mut error = None;
    for item in stream.by_ref() {
        match item {
            Ok(row) => uids.push(row.get("v.uid").and_then(|v| v.as_int()).expect("整数列")),
            Err(e) => {
                error = Some(e);
                break;
            }
        }
    }
    assert_eq!(uids, vec![0, 1, 2]);
    let error = error.expect("应该遇到除零错误");
    assert!(matches!(error, DBError::Query(QueryError::CommandExecution(_))));
    assert!(stream.next().is_none());
}

#[test]
fn test_expired_deadline_times_out() {
    let engine = engine_for(friend_graph());
    let compiled = engine
        .prepare("MATCH {class: Person, as: a}.out('Friend'){as: b, while: (true)} RETURN b")
        .expect("Failed to prepare");
    let mut stream = engine
        .execute_with_deadline(&compiled, Deadline::after(Duration::ZERO))
        .expect("Failed to execute");
    let err = stream
        .next()
        .expect("应该产出一个结果")
        .expect_err("应该超时");
    assert!(err.is_timeout());
    assert!(stream.next().is_none());
}

#[test]
fn test_generous_deadline_completes() {
    let engine = engine_for(friend_graph());
    let compiled = engine
        .prepare("MATCH {class: Person, as: a}.out('Friend'){as: b, while: (true)} RETURN b")
        .expect("Failed to prepare");
    let rows = engine
        .execute_with_deadline(&compiled, Deadline::after(Duration::from_secs(30)))
        .expect("Failed to execute")
        .collect::<Result<Vec<_>, _>>()
        .expect("Failed to collect rows");
    assert!(!rows.is_empty());
}
