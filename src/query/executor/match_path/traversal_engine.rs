//! 递归边遍历
//!
//! 从已绑定的出发点开始做深度优先（先序）遍历，深度 0 即出发点本身：
//! - 深度落在 `[min, max]` 内且目标节点过滤成立时产出一个候选
//! - 深度小于上界且 `while` 成立时继续向邻居展开
//! - 已在当前路径上的节点不再进入，保证在有环图上终止
//!
//! 遍历是惰性的：每次 `next_hit` 只推进到下一个候选为止，
//! 执行器可以在任意候选之后挂起。

use std::collections::HashSet;
use std::sync::Arc;

use log::trace;

use crate::core::error::DBResult;
use crate::core::{Edge, Value, Vertex, VertexId};
use crate::query::executor::match_path::environment::Environment;
use crate::query::executor::match_path::pattern_matcher::PatternMatcher;
use crate::query::planner::match_planning::EdgeStep;

/// 遍历产出的一个候选
#[derive(Debug, Clone)]
pub struct TraversalHit {
    pub node: Arc<Vertex>,
    pub depth: u32,
    /// 到达该节点的最后一条边，深度 0 时为空
    pub edge: Option<Arc<Edge>>,
    /// 从出发点到该节点的顶点序列（含两端）
    pub path: Vec<Arc<Vertex>>,
}

struct Level {
    node: Arc<Vertex>,
    via: Option<Arc<Edge>>,
    neighbours: std::vec::IntoIter<(Arc<Edge>, Arc<Vertex>)>,
}

/// 一次递归边遍历的状态：当前路径即显式栈
pub struct QuantifiedTraversal {
    env: Environment,
    root: Option<Arc<Vertex>>,
    stack: Vec<Level>,
    on_path: HashSet<VertexId>,
}

impl QuantifiedTraversal {
    /// `env` 是遍历开始时的部分绑定，`while` 与 `where` 都在其上求值
    pub fn new(source: Arc<Vertex>, env: Environment) -> Self {
        Self {
            env,
            root: Some(source),
            stack: Vec::new(),
            on_path: HashSet::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    /// 推进到下一个候选；遍历结束返回 `None`
    pub fn next_hit(
        &mut self,
        step: &EdgeStep,
        matcher: &PatternMatcher,
    ) -> DBResult<Option<TraversalHit>> {
        if let Some(root) = self.root.take() {
            if let Some(hit) = self.enter(root, None, step, matcher)? {
                return Ok(Some(hit));
            }
        }

        loop {
            matcher.check_deadline()?;
            let depth = self.stack.len() as u32;
            let Some(top) = self.stack.last_mut() else {
                return Ok(None);
            };

            match top.neighbours.next() {
                Some((edge, neighbour)) => {
                    if self.on_path.contains(&neighbour.id) {
                        continue;
                    }
                    if !matcher.edge_matches(&step.edge, &edge, &self.env, depth)? {
                        continue;
                    }
                    if let Some(hit) = self.enter(neighbour, Some(edge), step, matcher)? {
                        return Ok(Some(hit));
                    }
                }
                None => {
                    if let Some(level) = self.stack.pop() {
                        self.on_path.remove(&level.node.id);
                    }
                }
            }
        }
    }

    /// 把节点压入当前路径，决定是否产出和是否继续展开
    fn enter(
        &mut self,
        node: Arc<Vertex>,
        via: Option<Arc<Edge>>,
        step: &EdgeStep,
        matcher: &PatternMatcher,
    ) -> DBResult<Option<TraversalHit>> {
        let depth = self.stack.len() as u32;
        let quantifier = &step.edge.quantifier;
        let max = quantifier.max();
        let value = Value::Vertex(Arc::clone(&node));

        let in_range = depth >= quantifier.min() && max.map_or(true, |m| depth <= m);
        let emit = in_range && matcher.node_matches(&step.target, &value, &self.env, depth)?;

        let expand = max.map_or(true, |m| depth < m)
            && matcher.while_holds(
                quantifier.while_condition.as_ref(),
                &value,
                &self.env,
                depth,
            )?;
        let neighbours = if expand {
            matcher
                .store()
                .edges(node.id, &step.edge.labels, step.direction)?
        } else {
            Vec::new()
        };
        trace!(
            "递归遍历: 节点 {} 深度 {} 产出 {} 展开 {}",
            node.rid(),
            depth,
            emit,
            expand
        );

        self.on_path.insert(node.id);
        self.stack.push(Level {
            node,
            via,
            neighbours: neighbours.into_iter(),
        });

        if !emit {
            return Ok(None);
        }
        let top = &self.stack[self.stack.len() - 1];
        Ok(Some(TraversalHit {
            node: Arc::clone(&top.node),
            depth,
            edge: top.via.clone(),
            path: self.stack.iter().map(|l| Arc::clone(&l.node)).collect(),
        }))
    }
}
