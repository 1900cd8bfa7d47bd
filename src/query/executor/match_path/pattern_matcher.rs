//! 模式过滤
//!
//! 在部分绑定的环境上检查节点与边的类过滤、`where` 条件和 `while` 条件。
//! 表达式求值失败转换为 `CommandExecution`，由执行器中止整个匹配。

use std::sync::Arc;

use crate::core::error::{DBResult, QueryError};
use crate::core::types::expression::Expression;
use crate::core::{Edge, Value};
use crate::expression::{ExpressionContext, ExpressionEvaluator};
use crate::query::executor::match_path::deadline::Deadline;
use crate::query::executor::match_path::environment::Environment;
use crate::query::planner::match_planning::{EdgePattern, NodePattern};
use crate::storage::GraphStore;

/// 裸标识符的解析方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierScope {
    /// 过滤条件中：`$currentMatch` 的属性
    CurrentRecord,
    /// 投影中：环境里的别名
    Alias,
}

/// 匹配过程中的表达式上下文
///
/// 上下文变量：`$currentMatch`（别名 `$current`）、`$depth`、`$matched`
pub struct MatchEvalContext<'a> {
    store: &'a dyn GraphStore,
    env: &'a Environment,
    current: Option<&'a Value>,
    depth: Option<u32>,
    scope: IdentifierScope,
}

impl<'a> MatchEvalContext<'a> {
    pub fn for_record(
        store: &'a dyn GraphStore,
        env: &'a Environment,
        current: &'a Value,
        depth: u32,
    ) -> Self {
        Self {
            store,
            env,
            current: Some(current),
            depth: Some(depth),
            scope: IdentifierScope::CurrentRecord,
        }
    }

    pub fn for_aliases(store: &'a dyn GraphStore, env: &'a Environment) -> Self {
        Self {
            store,
            env,
            current: None,
            depth: None,
            scope: IdentifierScope::Alias,
        }
    }
}

impl ExpressionContext for MatchEvalContext<'_> {
    fn get_variable(&self, name: &str) -> Option<Value> {
        match self.scope {
            IdentifierScope::CurrentRecord => self.current.map(|v| v.property(name)),
            IdentifierScope::Alias => self.env.get(name).cloned(),
        }
    }

    fn get_context_variable(&self, name: &str) -> Option<Value> {
        match name {
            "currentMatch" | "current" => self.current.cloned(),
            "depth" => self.depth.map(|d| Value::Int(d as i64)),
            "matched" => Some(Value::Map(self.env.to_map())),
            _ => None,
        }
    }

    fn graph(&self) -> Option<&dyn GraphStore> {
        Some(self.store)
    }
}

/// 过滤器与执行上下文：图存储加截止时间
#[derive(Clone)]
pub struct PatternMatcher {
    store: Arc<dyn GraphStore>,
    deadline: Deadline,
}

impl PatternMatcher {
    pub fn new(store: Arc<dyn GraphStore>, deadline: Deadline) -> Self {
        Self { store, deadline }
    }

    pub fn store(&self) -> &dyn GraphStore {
        self.store.as_ref()
    }

    pub fn check_deadline(&self) -> DBResult<()> {
        self.deadline.check()
    }

    /// 节点候选是否满足 rid、类过滤与 where 条件；null 从不匹配
    pub fn node_matches(
        &self,
        node: &NodePattern,
        candidate: &Value,
        env: &Environment,
        depth: u32,
    ) -> DBResult<bool> {
        let Value::Vertex(vertex) = candidate else {
            return Ok(false);
        };
        if node.rid.is_some_and(|rid| rid != vertex.id) {
            return Ok(false);
        }
        if let Some(class) = &node.class {
            if !self.store.is_subclass_of(&vertex.class, class) {
                return Ok(false);
            }
        }
        match &node.where_clause {
            Some(condition) => self.holds(condition, candidate, env, depth),
            None => Ok(true),
        }
    }

    /// 边是否满足边过滤块中的类与 where 条件
    pub fn edge_matches(
        &self,
        pattern: &EdgePattern,
        edge: &Arc<Edge>,
        env: &Environment,
        depth: u32,
    ) -> DBResult<bool> {
        if let Some(class) = &pattern.class {
            if !self.store.is_subclass_of(&edge.label, class) {
                return Ok(false);
            }
        }
        match &pattern.where_clause {
            Some(condition) => {
                let value = Value::Edge(Arc::clone(edge));
                self.holds(condition, &value, env, depth)
            }
            None => Ok(true),
        }
    }

    /// `while` 条件，缺省为真
    pub fn while_holds(
        &self,
        condition: Option<&Expression>,
        node: &Value,
        env: &Environment,
        depth: u32,
    ) -> DBResult<bool> {
        match condition {
            Some(condition) => self.holds(condition, node, env, depth),
            None => Ok(true),
        }
    }

    fn holds(
        &self,
        condition: &Expression,
        current: &Value,
        env: &Environment,
        depth: u32,
    ) -> DBResult<bool> {
        let ctx = MatchEvalContext::for_record(self.store.as_ref(), env, current, depth);
        ExpressionEvaluator::evaluate_boolean(condition, &ctx)
            .map_err(|e| QueryError::command_execution(e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::operators::BinaryOperator;
    use crate::core::Properties;
    use crate::storage::MemoryGraphStore;

    fn store_with_person() -> (Arc<MemoryGraphStore>, Value) {
        let store = MemoryGraphStore::new();
        store
            .create_vertex_class("Person", None)
            .expect("Failed to create class");
        store
            .create_vertex_class("Employee", Some("Person"))
            .expect("Failed to create class");
        let mut props = Properties::new();
        props.insert("name".to_string(), Value::from("n1"));
        let id = store.add_vertex("Employee", props).expect("Failed to add vertex");
        let vertex = store
            .vertex(id)
            .expect("Failed to read vertex")
            .expect("Vertex should exist");
        (Arc::new(store), Value::Vertex(vertex))
    }

    fn name_is(name: &str) -> Expression {
        Expression::binary(
            Expression::identifier("name"),
            BinaryOperator::Equal,
            Expression::literal(name),
        )
    }

    #[test]
    fn test_class_filter_is_polymorphic() {
        let (store, vertex) = store_with_person();
        let matcher = PatternMatcher::new(store, Deadline::none());
        let mut node = NodePattern::new("p");
        node.class = Some("Person".into());
        assert!(matcher
            .node_matches(&node, &vertex, &Environment::new(), 0)
            .expect("Failed to match"));
        node.class = Some("City".into());
        assert!(!matcher
            .node_matches(&node, &vertex, &Environment::new(), 0)
            .expect("Failed to match"));
    }

    #[test]
    fn test_where_reads_current_record() {
        let (store, vertex) = store_with_person();
        let matcher = PatternMatcher::new(store, Deadline::none());
        let mut node = NodePattern::new("p");
        node.where_clause = Some(name_is("n1"));
        assert!(matcher
            .node_matches(&node, &vertex, &Environment::new(), 0)
            .expect("Failed to match"));
        node.where_clause = Some(name_is("n2"));
        assert!(!matcher
            .node_matches(&node, &vertex, &Environment::new(), 0)
            .expect("Failed to match"));
    }

    #[test]
    fn test_rid_filter() {
        let (store, vertex) = store_with_person();
        let id = vertex.as_vertex().map(|v| v.id).expect("vertex");
        let matcher = PatternMatcher::new(store, Deadline::none());
        let mut node = NodePattern::new("p");
        node.rid = Some(id);
        assert!(matcher
            .node_matches(&node, &vertex, &Environment::new(), 0)
            .expect("Failed to match"));
        node.rid = Some(id + 1);
        assert!(!matcher
            .node_matches(&node, &vertex, &Environment::new(), 0)
            .expect("Failed to match"));
    }

    #[test]
    fn test_null_candidate_never_matches() {
        let (store, _) = store_with_person();
        let matcher = PatternMatcher::new(store, Deadline::none());
        assert!(!matcher
            .node_matches(&NodePattern::new("p"), &Value::Null, &Environment::new(), 0)
            .expect("Failed to match"));
    }

    #[test]
    fn test_depth_and_matched_variables() {
        let (store, vertex) = store_with_person();
        let env = Environment::new().bind("a", vertex.clone());
        let ctx = MatchEvalContext::for_record(store.as_ref(), &env, &vertex, 2);
        assert_eq!(ctx.get_context_variable("depth"), Some(Value::Int(2)));
        assert_eq!(ctx.get_context_variable("currentMatch"), Some(vertex.clone()));
        let matched = ctx.get_context_variable("matched").expect("matched");
        assert_eq!(matched.property("a"), vertex);
    }

    #[test]
    fn test_expression_error_becomes_command_execution() {
        let (store, vertex) = store_with_person();
        let matcher = PatternMatcher::new(store, Deadline::none());
        let mut node = NodePattern::new("p");
        node.where_clause = Some(Expression::function("nosuchfn", vec![]));
        let err = matcher
            .node_matches(&node, &vertex, &Environment::new(), 0)
            .expect_err("Unknown function should fail");
        assert!(matches!(
            err,
            crate::core::error::DBError::Query(QueryError::CommandExecution(_))
        ));
    }

    #[test]
    fn test_alias_scope_reads_environment() {
        let (store, vertex) = store_with_person();
        let env = Environment::new().bind("friend", vertex.clone());
        let ctx = MatchEvalContext::for_aliases(store.as_ref(), &env);
        assert_eq!(ctx.get_variable("friend"), Some(vertex));
        assert_eq!(ctx.get_variable("name"), None);
    }
}
