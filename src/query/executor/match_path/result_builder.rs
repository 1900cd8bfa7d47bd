//! 结果投影
//!
//! 把匹配环境的惰性流变成输出行：
//! - 显式投影项：每个环境一行，列名缺省为表达式原文
//! - `$matches`/`$patterns`：每个环境一行，列为用户声明的节点与边别名
//! - `$paths`：每个环境一行，包含全部绑定（含自动节点别名、深度与路径别名），
//!   编译器为递归边补的路径别名除外
//! - `$elements`/`$pathElements`：按实体去重的实体流
//!
//! 之后依次应用 GROUP BY、DISTINCT、ORDER BY、SKIP、LIMIT。
//! 没有 GROUP BY 与 ORDER BY 时整条流水线保持惰性，LIMIT 满足后不再拉取匹配器。

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use log::debug;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::core::error::{DBResult, QueryError, QueryResult};
use crate::core::types::expression::Expression;
use crate::core::types::operators::AggregateFunction;
use crate::core::{EntityKey, Value};
use crate::expression::{AggregateAccumulator, ExpressionContext, ExpressionEvaluator};
use crate::query::executor::match_path::environment::Environment;
use crate::query::executor::match_path::pattern_matcher::MatchEvalContext;
use crate::query::parser::ast::{OrderItem, PseudoTarget, ReturnClause, ReturnItem, ReturnTarget};
use crate::query::planner::match_planning::{is_auto_alias, AliasKind, Pattern};
use crate::storage::GraphStore;

/// 一行输出
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub columns: Vec<(String, Value)>,
    /// `$elements`/`$pathElements` 产生的实体行
    pub element: Option<Value>,
}

impl Row {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self {
            columns,
            element: None,
        }
    }

    pub fn from_element(element: Value) -> Self {
        Self {
            columns: Vec::new(),
            element: Some(element),
        }
    }

    /// 按列名取值；实体行按属性名取值
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some((_, value)) = self.columns.iter().find(|(column, _)| column == name) {
            return Some(value.clone());
        }
        self.element.as_ref().map(|element| element.property(name))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn values(&self) -> Vec<&Value> {
        self.columns.iter().map(|(_, value)| value).collect()
    }

    pub fn is_element(&self) -> bool {
        self.element.is_some()
    }

    pub fn to_json(&self) -> JsonValue {
        if let Some(element) = &self.element {
            return element.to_json();
        }
        JsonValue::Object(
            self.columns
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect::<JsonMap<_, _>>(),
        )
    }
}

/// 投影阶段的求值上下文
///
/// 标识符依次解析为：输出列、别名、实体行的属性
struct ProjectionContext<'a> {
    aliases: MatchEvalContext<'a>,
    row: Option<&'a Row>,
    aggregates: &'a [(Expression, Value)],
}

impl ExpressionContext for ProjectionContext<'_> {
    fn get_variable(&self, name: &str) -> Option<Value> {
        if let Some(row) = self.row {
            if let Some((_, value)) = row.columns.iter().find(|(column, _)| column == name) {
                return Some(value.clone());
            }
        }
        self.aliases.get_variable(name).or_else(|| {
            self.row
                .and_then(|row| row.element.as_ref())
                .map(|element| element.property(name))
        })
    }

    fn get_context_variable(&self, name: &str) -> Option<Value> {
        match (name, self.row.and_then(|row| row.element.as_ref())) {
            ("currentMatch" | "current", Some(element)) => Some(element.clone()),
            _ => self.aliases.get_context_variable(name),
        }
    }

    fn graph(&self) -> Option<&dyn GraphStore> {
        self.aliases.graph()
    }

    fn aggregate_value(&self, call: &Expression) -> Option<Value> {
        self.aggregates
            .iter()
            .find(|(expr, _)| expr == call)
            .map(|(_, value)| value.clone())
    }
}

fn evaluate(expression: &Expression, ctx: &ProjectionContext<'_>) -> DBResult<Value> {
    ExpressionEvaluator::evaluate(expression, ctx).map_err(|e| QueryError::command_execution(e).into())
}

/// 投影形式
#[derive(Debug, Clone)]
enum Shape {
    Items(Vec<ReturnItem>),
    Matches(Vec<String>),
    Paths,
    Elements { aliases: Vec<String> },
    PathElements,
}

/// 编译好的 RETURN 子句
#[derive(Debug, Clone)]
pub struct ResultProjector {
    shape: Shape,
    distinct: bool,
    grouped: bool,
    group_by: Vec<Expression>,
    order_by: Vec<OrderItem>,
    skip: u64,
    limit: Option<u64>,
    /// 路径别名，`$pathElements` 展开其中的顶点
    path_aliases: HashSet<String>,
    depth_aliases: HashSet<String>,
}

impl ResultProjector {
    /// 编译器生成的路径别名，只供 `$pathElements` 使用
    fn is_internal_path(&self, alias: &str) -> bool {
        is_auto_alias(alias) && self.path_aliases.contains(alias)
    }
}

impl ResultProjector {
    pub fn new(clause: &ReturnClause, pattern: &Pattern) -> QueryResult<Self> {
        let aliases_of = |kinds: &[AliasKind]| -> HashSet<String> {
            pattern
                .alias_kinds
                .iter()
                .filter(|(_, kind)| kinds.contains(*kind))
                .map(|(alias, _)| alias.clone())
                .collect()
        };
        let visible: Vec<String> = pattern.visible_aliases().cloned().collect();

        let shape = match &clause.target {
            ReturnTarget::Items(items) => Shape::Items(items.clone()),
            ReturnTarget::Pseudo(PseudoTarget::Matches | PseudoTarget::Patterns) => {
                Shape::Matches(visible)
            }
            ReturnTarget::Pseudo(PseudoTarget::Paths) => Shape::Paths,
            ReturnTarget::Pseudo(PseudoTarget::Elements) => Shape::Elements { aliases: visible },
            ReturnTarget::Pseudo(PseudoTarget::PathElements) => Shape::PathElements,
        };

        let has_aggregate = match &shape {
            Shape::Items(items) => items.iter().any(|item| item.expression.contains_aggregate()),
            _ => false,
        };
        if !clause.group_by.is_empty() && !matches!(shape, Shape::Items(_)) {
            return Err(QueryError::ExecutionError(
                "GROUP BY 不能与伪目标同时使用".to_string(),
            ));
        }

        Ok(Self {
            grouped: has_aggregate || !clause.group_by.is_empty(),
            shape,
            distinct: clause.distinct,
            group_by: clause.group_by.clone(),
            order_by: clause.order_by.clone(),
            skip: clause.skip.unwrap_or(0),
            limit: clause.limit,
            path_aliases: aliases_of(&[AliasKind::Path]),
            depth_aliases: aliases_of(&[AliasKind::Depth]),
        })
    }

    /// 输出是否需要先收齐全部匹配
    pub fn is_blocking(&self) -> bool {
        self.grouped || !self.order_by.is_empty()
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// 包装匹配流；`max_rows` 为 0 表示不设上限
    pub fn project<I>(self: &Arc<Self>, source: I, store: Arc<dyn GraphStore>, max_rows: u64) -> RowStream
    where
        I: Iterator<Item = DBResult<Environment>> + 'static,
    {
        let cap = match (self.limit, max_rows) {
            (Some(limit), 0) => Some(limit),
            (Some(limit), max) => Some(limit.min(max)),
            (None, 0) => None,
            (None, max) => Some(max),
        };
        RowStream {
            source: Box::new(source),
            projector: Arc::clone(self),
            store,
            pending: VecDeque::new(),
            seen_elements: HashSet::new(),
            seen_rows: HashSet::new(),
            buffered: None,
            skipped: 0,
            emitted: 0,
            cap,
            finished: false,
        }
    }

    /// 单个环境的投影；实体形式可能产生多行
    fn project_env(
        &self,
        env: &Environment,
        store: &dyn GraphStore,
        seen: &mut HashSet<EntityKey>,
        out: &mut VecDeque<(Row, Environment)>,
    ) -> DBResult<()> {
        match &self.shape {
            Shape::Items(items) => {
                let ctx = ProjectionContext {
                    aliases: MatchEvalContext::for_aliases(store, env),
                    row: None,
                    aggregates: &[],
                };
                let mut columns = Vec::with_capacity(items.len());
                for item in items {
                    let value = evaluate(&item.expression, &ctx)?;
                    columns.push((item.column_name().to_string(), value));
                }
                out.push_back((Row::new(columns), env.clone()));
            }
            Shape::Matches(aliases) => {
                let columns = aliases
                    .iter()
                    .filter_map(|alias| env.get(alias).map(|v| (alias.clone(), v.clone())))
                    .collect();
                out.push_back((Row::new(columns), env.clone()));
            }
            Shape::Paths => {
                let columns = env
                    .iter()
                    .filter(|(alias, _)| !self.is_internal_path(alias))
                    .map(|(alias, value)| (alias.to_string(), value.clone()))
                    .collect();
                out.push_back((Row::new(columns), env.clone()));
            }
            Shape::Elements { aliases } => {
                for alias in aliases {
                    if let Some(value) = env.get(alias) {
                        Self::push_element(value, env, seen, out);
                    }
                }
            }
            Shape::PathElements => {
                for (alias, value) in env.iter() {
                    if self.depth_aliases.contains(alias) {
                        continue;
                    }
                    match value {
                        Value::List(vertices) if self.path_aliases.contains(alias) => {
                            for vertex in vertices {
                                Self::push_element(vertex, env, seen, out);
                            }
                        }
                        other => Self::push_element(other, env, seen, out),
                    }
                }
            }
        }
        Ok(())
    }

    fn push_element(
        value: &Value,
        env: &Environment,
        seen: &mut HashSet<EntityKey>,
        out: &mut VecDeque<(Row, Environment)>,
    ) {
        if let Some(key) = value.entity_key() {
            if seen.insert(key) {
                out.push_back((Row::from_element(value.clone()), env.clone()));
            }
        }
    }

    /// 分组聚合；分组按首次出现的顺序输出
    fn group<I>(&self, source: I, store: &dyn GraphStore) -> DBResult<Vec<(Row, Environment)>>
    where
        I: Iterator<Item = DBResult<Environment>>,
    {
        let Shape::Items(items) = &self.shape else {
            return Err(QueryError::ExecutionError("只有显式投影项可以分组".to_string()).into());
        };
        let calls = aggregate_calls(items);

        struct Group {
            env: Environment,
            plain: Vec<Option<Value>>,
            accumulators: Vec<AggregateAccumulator>,
        }
        let mut groups: Vec<Group> = Vec::new();
        let mut index: std::collections::HashMap<Vec<Value>, usize> = std::collections::HashMap::new();

        for env in source {
            let env = env?;
            let ctx = ProjectionContext {
                aliases: MatchEvalContext::for_aliases(store, &env),
                row: None,
                aggregates: &[],
            };
            let plain: Vec<Option<Value>> = items
                .iter()
                .map(|item| {
                    if item.expression.contains_aggregate() {
                        Ok(None)
                    } else {
                        evaluate(&item.expression, &ctx).map(Some)
                    }
                })
                .collect::<DBResult<_>>()?;

            let key = if self.group_by.is_empty() {
                plain.iter().flatten().cloned().collect()
            } else {
                let partial = Row::new(
                    items
                        .iter()
                        .zip(&plain)
                        .filter_map(|(item, v)| v.clone().map(|v| (item.column_name().to_string(), v)))
                        .collect(),
                );
                let key_ctx = ProjectionContext {
                    aliases: MatchEvalContext::for_aliases(store, &env),
                    row: Some(&partial),
                    aggregates: &[],
                };
                self.group_by
                    .iter()
                    .map(|expr| evaluate(expr, &key_ctx))
                    .collect::<DBResult<Vec<_>>>()?
            };

            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    let accumulators = calls
                        .iter()
                        .map(|(function, _)| AggregateAccumulator::new(*function))
                        .collect();
                    groups.push(Group {
                        env: env.clone(),
                        plain,
                        accumulators,
                    });
                    index.insert(key, groups.len() - 1);
                    groups.len() - 1
                }
            };

            for (accumulator, (_, call)) in groups[slot].accumulators.iter_mut().zip(&calls) {
                let input = match aggregate_argument(call) {
                    None => Value::Bool(true),
                    Some(arg) => evaluate(arg, &ctx)?,
                };
                accumulator
                    .accumulate(input)
                    .map_err(QueryError::command_execution)?;
            }
        }

        debug!("GROUP BY 产生 {} 个分组", groups.len());
        let mut rows = Vec::with_capacity(groups.len());
        for group in groups {
            let finished: Vec<(Expression, Value)> = calls
                .iter()
                .zip(&group.accumulators)
                .map(|((_, call), acc)| acc.finish().map(|value| ((*call).clone(), value)))
                .collect::<Result<_, crate::core::error::ExpressionError>>()
                .map_err(QueryError::command_execution)?;
            let ctx = ProjectionContext {
                aliases: MatchEvalContext::for_aliases(store, &group.env),
                row: None,
                aggregates: &finished,
            };
            let mut columns = Vec::with_capacity(items.len());
            for (item, plain) in items.iter().zip(group.plain) {
                let value = match plain {
                    Some(value) => value,
                    None => evaluate(&item.expression, &ctx)?,
                };
                columns.push((item.column_name().to_string(), value));
            }
            rows.push((Row::new(columns), group.env));
        }
        Ok(rows)
    }

    fn sort(&self, rows: Vec<(Row, Environment)>, store: &dyn GraphStore) -> DBResult<Vec<(Row, Environment)>> {
        if self.order_by.is_empty() {
            return Ok(rows);
        }
        let mut keyed = Vec::with_capacity(rows.len());
        for (row, env) in rows {
            let ctx = ProjectionContext {
                aliases: MatchEvalContext::for_aliases(store, &env),
                row: Some(&row),
                aggregates: &[],
            };
            let key = self
                .order_by
                .iter()
                .map(|item| evaluate(&item.expression, &ctx))
                .collect::<DBResult<Vec<_>>>()?;
            keyed.push((key, row, env));
        }
        keyed.sort_by(|(a, ..), (b, ..)| {
            for ((x, y), item) in a.iter().zip(b).zip(&self.order_by) {
                let ordering = x.total_cmp(y);
                let ordering = if item.descending { ordering.reverse() } else { ordering };
                if ordering.is_ne() {
                    return ordering;
                }
            }
            std::cmp::Ordering::Equal
        });
        Ok(keyed.into_iter().map(|(_, row, env)| (row, env)).collect())
    }
}

/// 投影项中出现的聚合调用，按出现顺序去重
fn aggregate_calls(items: &[ReturnItem]) -> Vec<(AggregateFunction, &Expression)> {
    let mut calls: Vec<(AggregateFunction, &Expression)> = Vec::new();
    for item in items {
        item.expression.walk(&mut |expr| {
            if let Expression::FunctionCall { target: None, name, .. } = expr {
                if let Some(function) = AggregateFunction::from_name(name) {
                    if !calls.iter().any(|(_, seen)| *seen == expr) {
                        calls.push((function, expr));
                    }
                }
            }
        });
    }
    calls
}

/// 聚合参数；`count(*)` 与 `count()` 返回 `None`，每行计一次
fn aggregate_argument(call: &Expression) -> Option<&Expression> {
    match call {
        Expression::FunctionCall { args, .. } => match args.first() {
            None | Some(Expression::Wildcard) => None,
            Some(arg) => Some(arg),
        },
        _ => None,
    }
}

/// 投影后的行流
pub struct RowStream {
    source: Box<dyn Iterator<Item = DBResult<Environment>>>,
    projector: Arc<ResultProjector>,
    store: Arc<dyn GraphStore>,
    pending: VecDeque<(Row, Environment)>,
    seen_elements: HashSet<EntityKey>,
    seen_rows: HashSet<Vec<Value>>,
    /// 阻塞阶段（分组、排序）收齐后的结果
    buffered: Option<std::vec::IntoIter<(Row, Environment)>>,
    skipped: u64,
    emitted: u64,
    cap: Option<u64>,
    finished: bool,
}

impl RowStream {
    /// 已输出的行数
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// DISTINCT 判重；实体行已按实体去重
    fn is_new(&mut self, row: &Row) -> bool {
        if !self.projector.distinct || row.is_element() {
            return true;
        }
        self.seen_rows
            .insert(row.columns.iter().map(|(_, v)| v.clone()).collect())
    }

    /// 非阻塞路径：逐个环境投影
    fn next_streaming(&mut self) -> DBResult<Option<(Row, Environment)>> {
        loop {
            if let Some(projected) = self.pending.pop_front() {
                if self.is_new(&projected.0) {
                    return Ok(Some(projected));
                }
                continue;
            }
            let Some(env) = self.source.next() else {
                return Ok(None);
            };
            let env = env?;
            self.projector.project_env(
                &env,
                self.store.as_ref(),
                &mut self.seen_elements,
                &mut self.pending,
            )?;
        }
    }

    /// 阻塞路径：收齐、分组、去重、排序
    fn fill_buffer(&mut self) -> DBResult<()> {
        let projector = Arc::clone(&self.projector);
        let rows = if projector.grouped {
            let source = std::mem::replace(&mut self.source, Box::new(std::iter::empty()));
            projector.group(source, self.store.as_ref())?
        } else {
            let mut rows = Vec::new();
            while let Some(row) = self.next_streaming()? {
                rows.push(row);
            }
            rows
        };
        let mut distinct = Vec::with_capacity(rows.len());
        for row in rows {
            if !projector.grouped || self.is_new(&row.0) {
                distinct.push(row);
            }
        }
        let sorted = projector.sort(distinct, self.store.as_ref())?;
        self.buffered = Some(sorted.into_iter());
        Ok(())
    }

    fn next_row(&mut self) -> DBResult<Option<Row>> {
        loop {
            if self.cap.is_some_and(|cap| self.emitted >= cap) {
                return Ok(None);
            }
            let next = if self.projector.is_blocking() {
                if self.buffered.is_none() {
                    self.fill_buffer()?;
                }
                self.buffered.as_mut().and_then(Iterator::next)
            } else {
                self.next_streaming()?
            };
            let Some((row, _)) = next else {
                return Ok(None);
            };
            if self.skipped < self.projector.skip {
                self.skipped += 1;
                continue;
            }
            self.emitted += 1;
            return Ok(Some(row));
        }
    }
}

impl Iterator for RowStream {
    type Item = DBResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Properties;
    use crate::query::parser::parse_match;
    use crate::query::planner::match_planning::PatternCompiler;
    use crate::storage::MemoryGraphStore;

    fn vertex(store: &MemoryGraphStore, name: &str, age: i64) -> Value {
        let mut props = Properties::new();
        props.insert("name".to_string(), Value::from(name));
        props.insert("age".to_string(), Value::Int(age));
        let id = store.add_vertex("Person", props).expect("Failed to add vertex");
        Value::Vertex(store.vertex(id).expect("Failed to read").expect("exists"))
    }

    /// 不经过匹配器，直接投影手工构造的环境
    fn project(query: &str, envs: Vec<Environment>, store: Arc<MemoryGraphStore>) -> Vec<Row> {
        let statement = parse_match(query).expect("Failed to parse");
        let pattern = PatternCompiler::compile(&statement).expect("Failed to compile");
        let projector = Arc::new(
            ResultProjector::new(&statement.return_clause, &pattern).expect("Failed to build projector"),
        );
        projector
            .project(envs.into_iter().map(Ok), store, 0)
            .collect::<DBResult<Vec<_>>>()
            .expect("Failed to project")
    }

    fn fixture() -> (Arc<MemoryGraphStore>, Vec<Environment>) {
        let store = MemoryGraphStore::new();
        let alice = vertex(&store, "alice", 30);
        let bob = vertex(&store, "bob", 25);
        let carol = vertex(&store, "carol", 30);
        let envs = vec![
            Environment::new().bind("a", alice.clone()).bind("b", bob.clone()),
            Environment::new().bind("a", alice.clone()).bind("b", carol.clone()),
            Environment::new().bind("a", bob.clone()).bind("b", carol.clone()),
        ];
        (Arc::new(store), envs)
    }

    const PATTERN: &str = "MATCH {class: Person, as: a}.out(){as: b}";

    fn names(rows: &[Row], column: &str) -> Vec<String> {
        rows.iter()
            .map(|r| r.get(column).and_then(|v| v.as_str().map(String::from)).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_default_column_names() {
        let (store, envs) = fixture();
        let rows = project(&format!("{} RETURN a.name, b.name AS friend", PATTERN), envs, store);
        assert_eq!(rows[0].column_names(), vec!["a.name", "friend"]);
        assert_eq!(names(&rows, "friend"), vec!["bob", "carol", "carol"]);
    }

    #[test]
    fn test_distinct_on_projected_tuple() {
        let (store, envs) = fixture();
        let rows = project(&format!("{} RETURN DISTINCT a.age", PATTERN), envs, store);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_order_skip_limit() {
        let (store, envs) = fixture();
        let rows = project(
            &format!("{} RETURN a.name AS n, b.name AS m ORDER BY m DESC, n SKIP 1 LIMIT 1", PATTERN),
            envs,
            store,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(names(&rows, "n"), vec!["bob"]);
    }

    #[test]
    fn test_group_by_with_count() {
        let (store, envs) = fixture();
        let rows = project(
            &format!("{} RETURN a.name AS n, count(*) AS c GROUP BY n", PATTERN),
            envs,
            store,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("c"), Some(Value::Int(2)));
        assert_eq!(rows[1].get("c"), Some(Value::Int(1)));
    }

    #[test]
    fn test_aggregate_without_group_by_is_one_row() {
        let (store, envs) = fixture();
        let rows = project(&format!("{} RETURN count(*)", PATTERN), envs, store);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("count(*)"), Some(Value::Int(3)));
    }

    #[test]
    fn test_elements_deduplicated_across_stream() {
        let (store, envs) = fixture();
        let rows = project(&format!("{} RETURN $elements", PATTERN), envs, store);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(Row::is_element));
        assert_eq!(names(&rows, "name"), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_matches_hides_auto_aliases() {
        let store = MemoryGraphStore::new();
        let alice = vertex(&store, "alice", 30);
        let bob = vertex(&store, "bob", 25);
        let env = Environment::new()
            .bind("a", alice)
            .bind("$ANON_0", bob);
        let rows = project(
            "MATCH {class: Person, as: a}.out(){} RETURN $matches",
            vec![env],
            Arc::new(store),
        );
        assert_eq!(rows[0].column_names(), vec!["a"]);
    }

    #[test]
    fn test_paths_hide_generated_path_alias() {
        let store = MemoryGraphStore::new();
        let alice = vertex(&store, "alice", 30);
        let bob = vertex(&store, "bob", 25);
        let query = "MATCH {class: Person, as: a}.out(){as: b, while: (true)} RETURN ";
        let statement = parse_match(&format!("{}$paths", query)).expect("Failed to parse");
        let pattern = PatternCompiler::compile(&statement).expect("Failed to compile");
        let path_alias = pattern
            .alias_kinds
            .iter()
            .find(|(_, kind)| **kind == AliasKind::Path)
            .map(|(alias, _)| alias.clone())
            .expect("递归边应有路径别名");
        let env = Environment::new()
            .bind("a", alice.clone())
            .bind("b", bob.clone())
            .bind(path_alias, Value::List(vec![alice, bob]));

        let store = Arc::new(store);
        let rows = project(&format!("{}$paths", query), vec![env.clone()], Arc::clone(&store));
        assert_eq!(rows[0].column_names(), vec!["a", "b"]);

        let rows = project(&format!("{}$pathElements", query), vec![env], store);
        assert_eq!(names(&rows, "name"), vec!["alice", "bob"]);
    }

    #[test]
    fn test_patterns_is_synonym_of_matches() {
        // 假设：$patterns 与 $matches 同义
        let (store, envs) = fixture();
        let matches = project(&format!("{} RETURN $matches", PATTERN), envs.clone(), Arc::clone(&store));
        let patterns = project(&format!("{} RETURN $patterns", PATTERN), envs, store);
        assert_eq!(matches, patterns);
    }

    #[test]
    fn test_projection_error_is_command_execution() {
        let (store, envs) = fixture();
        let statement = parse_match(&format!("{} RETURN nosuchfn(a)", PATTERN)).expect("Failed to parse");
        let pattern = PatternCompiler::compile(&statement).expect("Failed to compile");
        let projector = Arc::new(
            ResultProjector::new(&statement.return_clause, &pattern).expect("Failed to build projector"),
        );
        let mut stream = projector.project(envs.into_iter().map(Ok), store, 0);
        let err = stream.next().expect("one item").expect_err("should fail");
        assert!(matches!(err, crate::core::error::DBError::Query(QueryError::CommandExecution(_))));
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_max_rows_caps_stream() {
        let (store, envs) = fixture();
        let statement = parse_match(&format!("{} RETURN a", PATTERN)).expect("Failed to parse");
        let pattern = PatternCompiler::compile(&statement).expect("Failed to compile");
        let projector = Arc::new(
            ResultProjector::new(&statement.return_clause, &pattern).expect("Failed to build projector"),
        );
        let rows: Vec<_> = projector.project(envs.into_iter().map(Ok), store, 2).collect();
        assert_eq!(rows.len(), 2);
    }
}
