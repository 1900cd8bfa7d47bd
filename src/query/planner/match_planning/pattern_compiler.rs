//! 模式编译器
//!
//! 把解析树转换为模式模型：
//! - 为未命名节点分配 `$ANON_` 前缀的内部别名，递归边缺省路径别名同样如此
//! - 把 `.out()`、`.outE().inV()` 与箭头写法统一为 `EdgePattern`
//! - 合并同一别名的多次出现（类必须一致，条件以 AND 合并）
//! - 校验量词范围、`$matched` 引用与 RETURN 中的别名
//!
//! 所有校验失败都是 `InvalidPattern`，在任何遍历开始之前报告。

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::core::error::{QueryError, QueryResult};
use crate::core::types::expression::Expression;
use crate::core::types::operators::BinaryOperator;
use crate::query::parser::ast::{
    ArrowQuantifier, MatchExpression, MatchFilter, MatchStatement, ReturnClause, ReturnTarget,
};
use crate::query::planner::match_planning::pattern::{
    AliasKind, EdgePattern, NodePattern, PathPattern, Pattern, PatternGraph, Quantifier,
    QuantifierKind, AUTO_ALIAS_PREFIX,
};

/// 模式编译器，持有内部别名计数
#[derive(Debug, Default)]
pub struct PatternCompiler {
    next_auto: usize,
}

/// 一组模式在编译过程中的别名登记
#[derive(Debug, Default)]
struct AliasRegistry {
    order: Vec<String>,
    kinds: BTreeMap<String, AliasKind>,
}

impl AliasRegistry {
    fn register(&mut self, alias: &str, kind: AliasKind) -> QueryResult<()> {
        match self.kinds.get(alias) {
            None => {
                self.kinds.insert(alias.to_string(), kind);
                self.order.push(alias.to_string());
                Ok(())
            }
            Some(existing) if *existing == kind && matches!(kind, AliasKind::Node | AliasKind::Edge) => {
                Ok(())
            }
            Some(_) => Err(QueryError::invalid_pattern(format!(
                "别名 {} 被重复定义",
                alias
            ))),
        }
    }
}

impl PatternCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 编译整条语句的模式部分并校验 RETURN 子句
    pub fn compile(statement: &MatchStatement) -> QueryResult<Pattern> {
        let mut compiler = Self::new();

        let mut registry = AliasRegistry::default();
        let positive = compiler.build_graph(&statement.patterns, &mut registry)?;
        let declared: BTreeSet<String> = registry.kinds.keys().cloned().collect();
        Self::check_matched_references(&positive, &declared)?;

        let mut negatives = Vec::with_capacity(statement.not_patterns.len());
        for not_pattern in &statement.not_patterns {
            let mut local = AliasRegistry::default();
            let graph = compiler.build_graph(std::slice::from_ref(not_pattern), &mut local)?;

            let mut shares_alias = false;
            for (alias, kind) in &local.kinds {
                match registry.kinds.get(alias) {
                    Some(existing) if existing != kind => {
                        return Err(QueryError::invalid_pattern(format!(
                            "NOT 模式中别名 {} 的用途与正向模式不一致",
                            alias
                        )))
                    }
                    Some(_) => shares_alias = true,
                    None => {}
                }
            }
            if !shares_alias {
                return Err(QueryError::invalid_pattern(
                    "NOT 模式必须引用至少一个正向模式中的别名",
                ));
            }

            let mut visible = declared.clone();
            visible.extend(local.kinds.keys().cloned());
            Self::check_matched_references(&graph, &visible)?;
            negatives.push(graph);
        }

        let pattern = Pattern {
            positive,
            negatives,
            alias_order: registry.order,
            alias_kinds: registry.kinds,
        };
        Self::check_return_clause(&statement.return_clause, &pattern)?;

        debug!(
            "编译模式: {} 条路径, {} 个 NOT 模式, {} 个别名",
            pattern.positive.paths.len(),
            pattern.negatives.len(),
            pattern.alias_order.len()
        );
        Ok(pattern)
    }

    fn auto_alias(&mut self, infix: &str) -> String {
        let alias = format!("{}{}{}", AUTO_ALIAS_PREFIX, infix, self.next_auto);
        self.next_auto += 1;
        alias
    }

    fn build_graph(
        &mut self,
        expressions: &[MatchExpression],
        registry: &mut AliasRegistry,
    ) -> QueryResult<PatternGraph> {
        let mut graph = PatternGraph::default();

        for expression in expressions {
            let origin_filter = &expression.origin;
            if origin_filter.while_clause.is_some()
                || origin_filter.max_depth.is_some()
                || origin_filter.depth_alias.is_some()
                || origin_filter.path_alias.is_some()
            {
                return Err(QueryError::invalid_pattern(
                    "while、maxDepth、depthAlias、pathAlias 只能用于边的目标节点",
                ));
            }

            let origin = self.node_alias(origin_filter);
            registry.register(&origin, AliasKind::Node)?;
            Self::merge_node(&mut graph.nodes, &origin, origin_filter)?;

            let mut previous = origin.clone();
            let mut edges = Vec::with_capacity(expression.items.len());
            for item in &expression.items {
                let filter = &item.filter;
                let target = self.node_alias(filter);
                registry.register(&target, AliasKind::Node)?;
                Self::merge_node(&mut graph.nodes, &target, filter)?;

                let mut edge = EdgePattern::new(previous.clone(), target.clone(), item.direction);
                edge.labels = item.labels.clone();
                edge.quantifier = Self::quantifier(item.quantifier, filter)?;
                edge.optional = filter.optional;
                edge.depth_alias = filter.depth_alias.clone();
                edge.path_alias = filter.path_alias.clone();

                if let Some(edge_filter) = &item.edge_filter {
                    if edge_filter.while_clause.is_some()
                        || edge_filter.rid.is_some()
                        || edge_filter.max_depth.is_some()
                        || edge_filter.optional
                        || edge_filter.depth_alias.is_some()
                        || edge_filter.path_alias.is_some()
                    {
                        return Err(QueryError::invalid_pattern(
                            "边过滤块只支持 class、as、where",
                        ));
                    }
                    edge.alias = edge_filter.alias.clone();
                    edge.class = edge_filter.class.clone();
                    edge.where_clause = edge_filter.where_clause.clone();
                }

                if edge.is_quantified() && edge.path_alias.is_none() {
                    edge.path_alias = Some(self.auto_alias("PATH_"));
                }

                if let Some(alias) = &edge.alias {
                    registry.register(alias, AliasKind::Edge)?;
                }
                if let Some(alias) = &edge.depth_alias {
                    registry.register(alias, AliasKind::Depth)?;
                }
                if let Some(alias) = &edge.path_alias {
                    registry.register(alias, AliasKind::Path)?;
                }

                previous = target;
                edges.push(edge);
            }

            graph.paths.push(PathPattern { origin, edges });
        }

        Ok(graph)
    }

    fn node_alias(&mut self, filter: &MatchFilter) -> String {
        match &filter.alias {
            Some(alias) => alias.clone(),
            None => self.auto_alias(""),
        }
    }

    fn quantifier(syntax: Option<ArrowQuantifier>, filter: &MatchFilter) -> QueryResult<Quantifier> {
        let kind = match syntax {
            None => QuantifierKind::Single,
            Some(ArrowQuantifier::Star) => QuantifierKind::Star,
            Some(ArrowQuantifier::Plus) => QuantifierKind::Plus,
            Some(ArrowQuantifier::Range { min, max }) => {
                if let Some(max) = max {
                    if min > max {
                        return Err(QueryError::invalid_pattern(format!(
                            "量词下界 {} 大于上界 {}",
                            min, max
                        )));
                    }
                }
                QuantifierKind::Range { min, max }
            }
        };
        Ok(Quantifier {
            kind,
            while_condition: filter.while_clause.clone(),
            max_depth: filter.max_depth,
        })
    }

    /// 合并同一别名的一次出现
    fn merge_node(
        nodes: &mut BTreeMap<String, NodePattern>,
        alias: &str,
        filter: &MatchFilter,
    ) -> QueryResult<()> {
        if let Some(where_clause) = &filter.where_clause {
            if where_clause.matched_aliases().contains(alias) {
                return Err(QueryError::invalid_pattern(format!(
                    "节点 {} 的 where 条件引用了尚未绑定的自身别名",
                    alias
                )));
            }
        }

        let node = nodes
            .entry(alias.to_string())
            .or_insert_with(|| NodePattern::new(alias));

        match (&node.class, &filter.class) {
            (Some(existing), Some(class)) if existing != class => {
                return Err(QueryError::invalid_pattern(format!(
                    "别名 {} 的类过滤冲突: {} 与 {}",
                    alias, existing, class
                )))
            }
            (None, Some(class)) => node.class = Some(class.clone()),
            _ => {}
        }

        match (node.rid, filter.rid) {
            (Some(existing), Some(rid)) if existing != rid => {
                return Err(QueryError::invalid_pattern(format!(
                    "别名 {} 的 rid 过滤冲突: #{} 与 #{}",
                    alias, existing, rid
                )))
            }
            (None, Some(rid)) => node.rid = Some(rid),
            _ => {}
        }

        if let Some(where_clause) = &filter.where_clause {
            node.where_clause = Some(match node.where_clause.take() {
                Some(existing) => Expression::binary(existing, BinaryOperator::And, where_clause.clone()),
                None => where_clause.clone(),
            });
        }
        node.optional |= filter.optional;
        Ok(())
    }

    /// `$matched.X` 中的 X 必须是已声明的别名
    fn check_matched_references(graph: &PatternGraph, declared: &BTreeSet<String>) -> QueryResult<()> {
        let mut referenced = BTreeSet::new();
        for node in graph.nodes.values() {
            referenced.extend(node.dependencies());
        }
        for path in &graph.paths {
            for edge in &path.edges {
                referenced.extend(edge.dependencies());
            }
        }
        match referenced.iter().find(|alias| !declared.contains(*alias)) {
            Some(alias) => Err(QueryError::invalid_pattern(format!(
                "$matched.{} 引用了未定义的别名",
                alias
            ))),
            None => Ok(()),
        }
    }

    fn check_return_clause(clause: &ReturnClause, pattern: &Pattern) -> QueryResult<()> {
        let items = match &clause.target {
            ReturnTarget::Pseudo(target) => {
                if !clause.group_by.is_empty() {
                    return Err(QueryError::ExecutionError(format!(
                        "GROUP BY 不能与 {} 一起使用",
                        target.name()
                    )));
                }
                return Ok(());
            }
            ReturnTarget::Items(items) => items,
        };

        for item in items {
            if let Some(unknown) = item
                .expression
                .root_identifiers()
                .into_iter()
                .find(|name| !pattern.has_alias(name))
            {
                return Err(QueryError::invalid_pattern(format!(
                    "RETURN 中引用了未定义的别名 {}",
                    unknown
                )));
            }
        }

        let columns: BTreeSet<&str> = items.iter().map(|i| i.column_name()).collect();
        for expr in &clause.group_by {
            if let Some(unknown) = expr
                .root_identifiers()
                .into_iter()
                .find(|name| !pattern.has_alias(name) && !columns.contains(name.as_str()))
            {
                return Err(QueryError::invalid_pattern(format!(
                    "GROUP BY 中引用了未定义的别名 {}",
                    unknown
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Direction;
    use crate::query::parser::parse_match;

    fn compile(query: &str) -> QueryResult<Pattern> {
        let statement = parse_match(query).expect("Failed to parse");
        PatternCompiler::compile(&statement)
    }

    #[test]
    fn test_normalizes_edge_forms() {
        let pattern = compile(
            "MATCH {as: a}.out('F'){as: b}, {as: a}.outE('F'){as: e}.inV(){as: c}, {as: a}<-F-{as: d} RETURN a",
        )
        .expect("Failed to compile");
        let paths = &pattern.positive.paths;
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0].edges[0].direction, Direction::Out);
        assert_eq!(paths[1].edges[0].alias.as_deref(), Some("e"));
        assert_eq!(paths[2].edges[0].direction, Direction::In);
        assert_eq!(paths[2].edges[0].labels, vec!["F".to_string()]);
        assert_eq!(pattern.alias_kind("e"), Some(AliasKind::Edge));
    }

    #[test]
    fn test_rid_merged_and_conflicts_rejected() {
        let pattern = compile("MATCH {as: a, rid: 4}.out(){as: b}, {as: a}.in(){as: c} RETURN a")
            .expect("Failed to compile");
        assert_eq!(pattern.positive.node("a").and_then(|n| n.rid), Some(4));

        let err = compile("MATCH {as: a, rid: 4}.out(){as: b}, {as: a, rid: 5} RETURN a")
            .expect_err("conflicting rid");
        assert!(matches!(err, QueryError::InvalidPattern(_)));
        assert!(compile("MATCH {as: a}.outE(){rid: 1}.inV(){as: b} RETURN a").is_err());
    }

    #[test]
    fn test_auto_aliases_assigned() {
        let pattern = compile("MATCH {class: Person}.out(){as: b} RETURN b").expect("Failed to compile");
        let origin = &pattern.positive.paths[0].origin;
        assert!(origin.starts_with(AUTO_ALIAS_PREFIX));
        let visible: Vec<&String> = pattern.visible_aliases().collect();
        assert_eq!(visible, vec!["b"]);
    }

    #[test]
    fn test_quantified_edge_gets_path_alias() {
        let pattern = compile("MATCH {as: a}-F*->{as: b} RETURN b").expect("Failed to compile");
        let edge = &pattern.positive.paths[0].edges[0];
        assert!(edge.is_quantified());
        let path_alias = edge.path_alias.as_ref().expect("auto path alias");
        assert_eq!(pattern.alias_kind(path_alias), Some(AliasKind::Path));
    }

    #[test]
    fn test_while_on_target_moves_to_edge() {
        let pattern = compile("MATCH {as: a}.out(){as: b, while: ($depth < 2), maxDepth: 3, depthAlias: d} RETURN b")
            .expect("Failed to compile");
        let edge = &pattern.positive.paths[0].edges[0];
        assert!(edge.quantifier.while_condition.is_some());
        assert_eq!(edge.quantifier.max(), Some(3));
        assert_eq!(edge.depth_alias.as_deref(), Some("d"));
        assert!(pattern.positive.node("b").and_then(|n| n.where_clause.as_ref()).is_none());
    }

    #[test]
    fn test_merges_repeated_alias() {
        let pattern = compile(
            "MATCH {class: Person, as: a, where: (x = 1)}.out(){as: b}, {as: a, where: (y = 2)} RETURN a",
        )
        .expect("Failed to compile");
        let node = pattern.positive.node("a").expect("node a");
        assert_eq!(node.class.as_deref(), Some("Person"));
        assert!(matches!(
            node.where_clause,
            Some(Expression::Binary { op: BinaryOperator::And, .. })
        ));
    }

    #[test]
    fn test_rejects_class_conflict() {
        let err = compile("MATCH {class: A, as: a}, {class: B, as: a} RETURN a").expect_err("conflict");
        assert!(matches!(err, QueryError::InvalidPattern(_)));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = compile("MATCH {as: a}-F{3,1}->{as: b} RETURN b").expect_err("bad range");
        assert!(matches!(err, QueryError::InvalidPattern(_)));
    }

    #[test]
    fn test_rejects_self_reference() {
        let err = compile("MATCH {as: a, where: ($matched.a.x = 1)} RETURN a").expect_err("self reference");
        assert!(matches!(err, QueryError::InvalidPattern(_)));
    }

    #[test]
    fn test_rejects_undefined_matched_alias() {
        let err = compile("MATCH {as: a}.out(){as: b, where: ($matched.zz.x = 1)} RETURN a")
            .expect_err("undefined alias");
        assert!(matches!(err, QueryError::InvalidPattern(_)));
    }

    #[test]
    fn test_rejects_unknown_return_alias() {
        let err = compile("MATCH {as: a} RETURN b.name").expect_err("unknown alias");
        assert!(matches!(err, QueryError::InvalidPattern(_)));
    }

    #[test]
    fn test_negative_must_share_alias() {
        let err = compile("MATCH {as: a}, NOT {as: x}.out(){as: y} RETURN a").expect_err("disjoint NOT");
        assert!(matches!(err, QueryError::InvalidPattern(_)));

        let pattern = compile("MATCH {as: a}.out(){as: b}, NOT {as: a}.out(){as: c} RETURN a")
            .expect("Failed to compile");
        assert_eq!(pattern.negatives.len(), 1);
        assert!(!pattern.has_alias("c"));
    }

    #[test]
    fn test_group_by_with_pseudo_target_rejected() {
        let err = compile("MATCH {as: a} RETURN $matches GROUP BY a").expect_err("group by pseudo");
        assert!(matches!(err, QueryError::ExecutionError(_)));
    }

    #[test]
    fn test_duplicate_depth_alias_rejected() {
        let err = compile("MATCH {as: a}-F*->{as: b, depthAlias: a} RETURN a").expect_err("kind clash");
        assert!(matches!(err, QueryError::InvalidPattern(_)));
    }
}
