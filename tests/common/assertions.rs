//! 自定义断言辅助模块
//!
//! 提供结果行的取值与常用断言

use graphdb_match::core::Value;
use graphdb_match::{MatchEngine, Row};

/// 执行查询，失败时带上查询文本
pub fn run(engine: &MatchEngine, query: &str) -> Vec<Row> {
    engine
        .query(query)
        .unwrap_or_else(|e| panic!("查询失败 '{}': {}", query, e))
}

/// 取某列的字符串值；实体取其 `name` 属性，null 记为 "null"
pub fn column_strings(rows: &[Row], column: &str) -> Vec<String> {
    rows.iter()
        .map(|row| match row.get(column) {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => "null".to_string(),
            Some(entity @ (Value::Vertex(_) | Value::Edge(_))) => match entity.property("name") {
                Value::String(s) => s,
                other => format!("{:?}", other),
            },
            Some(other) => format!("{:?}", other),
        })
        .collect()
}

/// 取某列的整数值
pub fn column_ints(rows: &[Row], column: &str) -> Vec<i64> {
    rows.iter()
        .map(|row| {
            row.get(column)
                .and_then(|v| v.as_int())
                .unwrap_or_else(|| panic!("列 {} 不是整数: {:?}", column, row))
        })
        .collect()
}

/// 实体行的某个属性
pub fn element_strings(rows: &[Row], property: &str) -> Vec<String> {
    rows.iter()
        .map(|row| {
            let element = row.element.as_ref().expect("应该是实体行");
            match element.property(property) {
                Value::String(s) => s,
                other => format!("{:?}", other),
            }
        })
        .collect()
}

/// 断言集合包含指定数量的元素
pub fn assert_count<T>(collection: &[T], expected: usize, item_name: &str) {
    assert_eq!(
        collection.len(),
        expected,
        "{}数量不匹配: 期望 {}, 实际 {}",
        item_name,
        expected,
        collection.len()
    );
}

/// 断言结果失败并匹配错误消息
pub fn assert_err_with<T: std::fmt::Debug, E: std::fmt::Display>(result: Result<T, E>, expected_msg: &str) {
    let err = result.expect_err("操作应该失败");
    let err_str = err.to_string();
    assert!(
        err_str.contains(expected_msg),
        "错误消息应包含 '{}', 实际是 '{}'",
        expected_msg,
        err_str
    );
}

/// 忽略顺序比较
pub fn assert_same_set(mut actual: Vec<String>, expected: &[&str]) {
    let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    actual.sort();
    expected.sort();
    assert_eq!(actual, expected);
}
