//! MATCH 规划器
//!
//! 把模式拆分为互不共享别名的连通分量（笛卡尔分量），为每个分量确定
//! 起点和边的展开顺序，生成执行器逐步解释的步骤序列。
//!
//! 展开顺序是确定的：分量按首次出现排序，分量内的路径优先选与已绑定别名相连的，
//! 路径内从起点先向右（书写方向）再向左（反向）展开。结果的枚举顺序依赖于此。

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::core::error::{QueryError, QueryResult};
use crate::core::Direction;
use crate::query::planner::match_planning::pattern::{
    EdgePattern, NodePattern, PathPattern, Pattern, PatternGraph,
};

/// 一条边的遍历步骤
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStep {
    /// 已绑定的出发别名
    pub source: String,
    /// 到达的节点
    pub target: NodePattern,
    pub edge: EdgePattern,
    /// 实际遍历方向，反向展开时与书写方向相反
    pub direction: Direction,
    pub reversed: bool,
}

/// 执行器的步骤种类
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    /// 枚举起点候选；别名已绑定时只校验过滤条件
    Start(NodePattern),
    /// 单跳边
    Fixed(EdgeStep),
    /// 递归边（`*`、`+`、`{m,n}`、`while`、`maxDepth`）
    Quantified(EdgeStep),
    /// 无候选时以 null 绑定目标
    Optional(Box<StepKind>),
    /// 子模式有任意匹配时丢弃当前环境
    Negative(Arc<ComponentPlan>),
}

impl StepKind {
    pub fn name(&self) -> &'static str {
        match self {
            StepKind::Start(_) => "Start",
            StepKind::Fixed(_) => "Fixed",
            StepKind::Quantified(_) => "Quantified",
            StepKind::Optional(_) => "Optional",
            StepKind::Negative(_) => "Negative",
        }
    }

    /// 该步骤新绑定的节点别名
    pub fn target_alias(&self) -> Option<&str> {
        match self {
            StepKind::Start(node) => Some(&node.alias),
            StepKind::Fixed(step) | StepKind::Quantified(step) => Some(&step.target.alias),
            StepKind::Optional(inner) => inner.target_alias(),
            StepKind::Negative(_) => None,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Start(node) => write!(f, "Start({})", node.alias),
            StepKind::Fixed(step) | StepKind::Quantified(step) => write!(
                f,
                "{}({} -{}-> {})",
                self.name(),
                step.source,
                step.direction,
                step.target.alias
            ),
            StepKind::Optional(inner) => write!(f, "Optional({})", inner),
            StepKind::Negative(plan) => write!(f, "Negative[{} steps]", plan.steps.len()),
        }
    }
}

/// 一个连通分量的执行计划
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComponentPlan {
    pub steps: Vec<StepKind>,
    /// 分量绑定的全部别名
    pub aliases: BTreeSet<String>,
}

/// 整条 MATCH 的执行计划
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchPlan {
    /// 笛卡尔分量，左侧变化最慢
    pub components: Vec<Arc<ComponentPlan>>,
    /// 合并后的环境依次经过的 NOT 过滤，只含 `StepKind::Negative`
    pub negative_filter: Option<Arc<ComponentPlan>>,
}

impl MatchPlan {
    pub fn is_cartesian(&self) -> bool {
        self.components.len() > 1
    }
}

#[derive(Debug)]
pub struct MatchPlanner;

impl MatchPlanner {
    pub fn plan(pattern: &Pattern) -> QueryResult<MatchPlan> {
        let positive = &pattern.positive;
        let mut components = Vec::new();
        for path_indices in Self::split_components(&positive.paths) {
            let plan = Self::plan_component(positive, &path_indices, &BTreeSet::new())?;
            components.push(Arc::new(plan));
        }

        let bound: BTreeSet<String> = pattern.alias_kinds.keys().cloned().collect();
        let mut negative_steps = Vec::with_capacity(pattern.negatives.len());
        for negative in &pattern.negatives {
            let indices: Vec<usize> = (0..negative.paths.len()).collect();
            let plan = Self::plan_component(negative, &indices, &bound)?;
            negative_steps.push(StepKind::Negative(Arc::new(plan)));
        }
        let negative_filter = if negative_steps.is_empty() {
            None
        } else {
            Some(Arc::new(ComponentPlan {
                steps: negative_steps,
                aliases: BTreeSet::new(),
            }))
        };

        for (i, component) in components.iter().enumerate() {
            let steps: Vec<String> = component.steps.iter().map(|s| s.to_string()).collect();
            debug!("分量 {}: {}", i, steps.join(" → "));
        }

        Ok(MatchPlan {
            components,
            negative_filter,
        })
    }

    /// 按共享别名把路径分组，组按首条路径的位置排序
    pub fn split_components(paths: &[PathPattern]) -> Vec<Vec<usize>> {
        let mut groups: Vec<(BTreeSet<String>, Vec<usize>)> = Vec::new();
        for (index, path) in paths.iter().enumerate() {
            let aliases = path.all_aliases();
            let mut merged = (aliases, vec![index]);
            let mut kept = Vec::with_capacity(groups.len());
            for group in groups.drain(..) {
                if group.0.is_disjoint(&merged.0) {
                    kept.push(group);
                } else {
                    merged.0.extend(group.0);
                    merged.1.extend(group.1);
                }
            }
            merged.1.sort_unstable();
            kept.push(merged);
            groups = kept;
        }
        groups.sort_by_key(|(_, indices)| indices[0]);
        groups.into_iter().map(|(_, indices)| indices).collect()
    }

    fn plan_component(
        graph: &PatternGraph,
        path_indices: &[usize],
        prebound: &BTreeSet<String>,
    ) -> QueryResult<ComponentPlan> {
        let mut bound = prebound.clone();
        let mut steps = Vec::new();
        let mut remaining = path_indices.to_vec();

        while !remaining.is_empty() {
            let next = remaining
                .iter()
                .position(|&i| !graph.paths[i].all_aliases().is_disjoint(&bound))
                .unwrap_or(0);
            let path = &graph.paths[remaining.remove(next)];
            let path_steps = Self::plan_path(graph, path, &bound)?;
            for step in &path_steps {
                Self::record_bindings(step, &mut bound);
            }
            steps.extend(path_steps);
        }

        let aliases = bound.difference(prebound).cloned().collect();
        Ok(ComponentPlan { steps, aliases })
    }

    fn record_bindings(step: &StepKind, bound: &mut BTreeSet<String>) {
        match step {
            StepKind::Start(node) => {
                bound.insert(node.alias.clone());
            }
            StepKind::Fixed(edge) | StepKind::Quantified(edge) => {
                bound.insert(edge.target.alias.clone());
                bound.extend(edge.edge.bound_aliases().cloned());
            }
            StepKind::Optional(inner) => Self::record_bindings(inner, bound),
            StepKind::Negative(_) => {}
        }
    }

    /// 选择路径起点并生成步骤
    ///
    /// 候选节点：已绑定或非可选。优先左侧没有递归边的位置（递归边只在必要时反向遍历），
    /// 其次已绑定的别名，再次带过滤的节点（rid > where > class，可叠加），最后按书写位置。
    fn plan_path(
        graph: &PatternGraph,
        path: &PathPattern,
        bound: &BTreeSet<String>,
    ) -> QueryResult<Vec<StepKind>> {
        let aliases = path.node_aliases();
        let mut candidates = Vec::new();
        for (i, alias) in aliases.iter().enumerate() {
            let node = Self::node(graph, alias)?;
            let is_bound = bound.contains(*alias);
            if node.optional && !is_bound {
                continue;
            }
            let forward_only = path.edges[..i].iter().all(|e| !e.is_quantified());
            let score = if is_bound {
                8
            } else {
                4 * node.rid.is_some() as u8
                    + 2 * node.where_clause.is_some() as u8
                    + node.class.is_some() as u8
            };
            candidates.push((forward_only, score, i));
        }
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));

        let mut first_error = None;
        for (_, _, start) in candidates {
            match Self::build_path_steps(graph, path, start, bound) {
                Ok(steps) => return Ok(steps),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        Err(first_error.unwrap_or_else(|| {
            QueryError::invalid_pattern(format!(
                "路径 {} 没有可作为起点的非可选节点",
                path.origin
            ))
        }))
    }

    fn build_path_steps(
        graph: &PatternGraph,
        path: &PathPattern,
        start: usize,
        bound: &BTreeSet<String>,
    ) -> QueryResult<Vec<StepKind>> {
        let aliases = path.node_aliases();
        let mut bound = bound.clone();
        let mut steps = Vec::with_capacity(path.edges.len() + 1);

        let start_node = Self::node(graph, aliases[start])?;
        Self::check_dependencies(&start_node.alias, start_node.dependencies(), &bound)?;
        let start_step = StepKind::Start(start_node.clone());
        Self::record_bindings(&start_step, &mut bound);
        steps.push(start_step);

        let forward = (start..path.edges.len()).map(|k| (k, false));
        let backward = (0..start).rev().map(|k| (k, true));
        for (k, reversed) in forward.chain(backward) {
            let edge = &path.edges[k];
            let (source, target) = if reversed {
                (aliases[k + 1], aliases[k])
            } else {
                (aliases[k], aliases[k + 1])
            };
            let target_node = Self::node(graph, target)?;

            let mut deps = target_node.dependencies();
            deps.extend(edge.dependencies());
            Self::check_dependencies(target, deps, &bound)?;

            let step = EdgeStep {
                source: source.to_string(),
                target: target_node.clone(),
                edge: edge.clone(),
                direction: if reversed {
                    edge.direction.reverse()
                } else {
                    edge.direction
                },
                reversed,
            };
            let mut kind = if edge.is_quantified() {
                StepKind::Quantified(step)
            } else {
                StepKind::Fixed(step)
            };
            if target_node.optional && !bound.contains(target) {
                kind = StepKind::Optional(Box::new(kind));
            }
            Self::record_bindings(&kind, &mut bound);
            steps.push(kind);
        }
        Ok(steps)
    }

    fn node<'g>(graph: &'g PatternGraph, alias: &str) -> QueryResult<&'g NodePattern> {
        graph
            .node(alias)
            .ok_or_else(|| QueryError::PlanningError(format!("别名 {} 没有对应的节点", alias)))
    }

    fn check_dependencies(
        alias: &str,
        deps: BTreeSet<String>,
        bound: &BTreeSet<String>,
    ) -> QueryResult<()> {
        match deps.iter().find(|d| !bound.contains(*d)) {
            Some(missing) => Err(QueryError::invalid_pattern(format!(
                "{} 的条件引用了 $matched.{}，但该别名在此之前无法绑定",
                alias, missing
            ))),
            None => Ok(()),
        }
    }
}
