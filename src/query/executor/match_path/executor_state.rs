//! 匹配执行器状态机
//!
//! 每个连通分量的步骤序列由一个 `ExecutorState` 惰性解释。状态是一个显式栈，
//! 第 i 个栈帧保存第 i 个步骤的候选游标和进入该步骤时的环境：
//! - 栈顶帧产出一个扩展后的环境，若已是最后一步则作为结果返回，否则压入下一帧
//! - 栈顶帧候选耗尽时弹出，回溯到上一步的下一个候选
//!
//! 环境是持久化的，回溯不需要撤销绑定。

use std::sync::Arc;

use log::trace;

use crate::core::error::{DBError, DBResult};
use crate::core::{Edge, Value, Vertex};
use crate::query::executor::match_path::environment::Environment;
use crate::query::executor::match_path::pattern_matcher::PatternMatcher;
use crate::query::executor::match_path::traversal_engine::{QuantifiedTraversal, TraversalHit};
use crate::query::planner::match_planning::{ComponentPlan, EdgeStep, StepKind};

/// 一个栈帧的候选来源
enum Candidates {
    /// 起点枚举
    Vertices(std::vec::IntoIter<Arc<Vertex>>),
    /// 起点别名已绑定，只校验一次
    Bound(Option<Value>),
    /// 单跳边的邻接
    Neighbours {
        source: Arc<Vertex>,
        iter: std::vec::IntoIter<(Arc<Edge>, Arc<Vertex>)>,
    },
    /// 递归边遍历
    Traversal(QuantifiedTraversal),
    /// NOT 子模式，尚未判定时为 `true`
    Negative(bool),
    Empty,
}

struct Frame {
    index: usize,
    env: Environment,
    candidates: Candidates,
    /// 当前步骤是否产出过候选（可选步骤据此决定是否补 null）
    matched_any: bool,
    null_emitted: bool,
}

/// 一次状态转移的结果
#[derive(Debug)]
pub enum Transition {
    /// 压入首帧
    Start,
    /// 栈顶步骤产出候选，压入下一步
    ExpandEdge { step: usize },
    /// 栈顶候选耗尽，弹出
    Backtrack,
    /// 最后一步产出完整绑定
    Success(Environment),
    /// 全部候选耗尽
    Exhausted,
}

/// 单个分量的惰性匹配器
pub struct ExecutorState {
    plan: Arc<ComponentPlan>,
    matcher: PatternMatcher,
    seed: Option<Environment>,
    stack: Vec<Frame>,
    finished: bool,
}

impl ExecutorState {
    /// `seed` 中的别名视为已绑定，NOT 过滤和预绑定查询由此传入
    pub fn new(plan: Arc<ComponentPlan>, matcher: PatternMatcher, seed: Environment) -> Self {
        Self {
            plan,
            matcher,
            seed: Some(seed),
            stack: Vec::new(),
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// 执行一次状态转移
    pub fn step(&mut self) -> DBResult<Transition> {
        if self.finished {
            return Ok(Transition::Exhausted);
        }
        self.matcher.check_deadline()?;

        if let Some(seed) = self.seed.take() {
            if self.plan.steps.is_empty() {
                self.finished = true;
                return Ok(Transition::Success(seed));
            }
            let frame = self.open(0, seed)?;
            self.stack.push(frame);
            return Ok(Transition::Start);
        }

        let Some(mut frame) = self.stack.pop() else {
            self.finished = true;
            return Ok(Transition::Exhausted);
        };
        let produced = self.advance(&mut frame)?;
        let index = frame.index;
        self.stack.push(frame);

        match produced {
            Some(env) if index + 1 == self.plan.steps.len() => Ok(Transition::Success(env)),
            Some(env) => {
                let next = self.open(index + 1, env)?;
                self.stack.push(next);
                Ok(Transition::ExpandEdge { step: index + 1 })
            }
            None => {
                self.stack.pop();
                Ok(Transition::Backtrack)
            }
        }
    }

    fn fail(&mut self, err: DBError) -> Option<DBResult<Environment>> {
        self.stack.clear();
        self.finished = true;
        Some(Err(err))
    }

    /// 为第 `index` 步建立栈帧
    fn open(&self, index: usize, env: Environment) -> DBResult<Frame> {
        let candidates = self.candidates_for(&self.plan.steps[index], &env)?;
        Ok(Frame {
            index,
            env,
            candidates,
            matched_any: false,
            null_emitted: false,
        })
    }

    fn candidates_for(&self, step: &StepKind, env: &Environment) -> DBResult<Candidates> {
        let candidates = match step {
            StepKind::Start(node) => match env.get(&node.alias) {
                Some(value) => Candidates::Bound(Some(value.clone())),
                None => {
                    let vertices = match node.rid {
                        Some(rid) => self.matcher.store().vertex(rid)?.into_iter().collect(),
                        None => self
                            .matcher
                            .store()
                            .entities_of_class(node.class.as_deref(), true)?,
                    };
                    Candidates::Vertices(vertices.into_iter())
                }
            },
            StepKind::Fixed(edge) => match Self::source_vertex(edge, env) {
                Some(source) => {
                    let iter = self
                        .matcher
                        .store()
                        .edges(source.id, &edge.edge.labels, edge.direction)?;
                    Candidates::Neighbours {
                        source,
                        iter: iter.into_iter(),
                    }
                }
                None => Candidates::Empty,
            },
            StepKind::Quantified(edge) => match Self::source_vertex(edge, env) {
                Some(source) => {
                    Candidates::Traversal(QuantifiedTraversal::new(source, env.clone()))
                }
                None => Candidates::Empty,
            },
            StepKind::Optional(inner) => self.candidates_for(inner, env)?,
            StepKind::Negative(_) => Candidates::Negative(true),
        };
        Ok(candidates)
    }

    /// 源别名绑定为 null（可选节点未匹配）时没有邻居
    fn source_vertex(step: &EdgeStep, env: &Environment) -> Option<Arc<Vertex>> {
        env.get(&step.source)
            .and_then(Value::as_vertex)
            .map(Arc::clone)
    }

    /// 推进栈帧，返回下一个扩展后的环境
    fn advance(&self, frame: &mut Frame) -> DBResult<Option<Environment>> {
        let step = &self.plan.steps[frame.index];
        let (inner, optional) = match step {
            StepKind::Optional(inner) => (inner.as_ref(), true),
            other => (other, false),
        };

        if let Some(env) = self.advance_inner(inner, frame)? {
            frame.matched_any = true;
            return Ok(Some(env));
        }
        if optional && !frame.matched_any && !frame.null_emitted {
            frame.null_emitted = true;
            trace!("可选步骤 {} 无候选，绑定 null", inner);
            return Ok(Some(Self::bind_nulls(inner, &frame.env)));
        }
        Ok(None)
    }

    fn advance_inner(&self, step: &StepKind, frame: &mut Frame) -> DBResult<Option<Environment>> {
        let env = &frame.env;
        match (step, &mut frame.candidates) {
            (StepKind::Start(node), Candidates::Bound(value)) => {
                let Some(value) = value.take() else {
                    return Ok(None);
                };
                let passes = if value.is_null() {
                    node.optional
                } else {
                    self.matcher.node_matches(node, &value, env, 0)?
                };
                Ok(passes.then(|| env.clone()))
            }
            (StepKind::Start(node), Candidates::Vertices(iter)) => {
                for vertex in iter.by_ref() {
                    self.matcher.check_deadline()?;
                    let value = Value::Vertex(vertex);
                    if self.matcher.node_matches(node, &value, env, 0)? {
                        return Ok(Some(env.bind(node.alias.clone(), value)));
                    }
                }
                Ok(None)
            }
            (StepKind::Fixed(edge), Candidates::Neighbours { source, iter }) => {
                for (via, neighbour) in iter.by_ref() {
                    self.matcher.check_deadline()?;
                    if !self.matcher.edge_matches(&edge.edge, &via, env, 1)? {
                        continue;
                    }
                    let hit = TraversalHit {
                        path: vec![Arc::clone(source), Arc::clone(&neighbour)],
                        node: neighbour,
                        depth: 1,
                        edge: Some(via),
                    };
                    if let Some(next) = self.bind_target(edge, hit, env)? {
                        return Ok(Some(next));
                    }
                }
                Ok(None)
            }
            (StepKind::Quantified(edge), Candidates::Traversal(traversal)) => {
                while let Some(hit) = traversal.next_hit(edge, &self.matcher)? {
                    if let Some(next) = self.bind_target(edge, hit, env)? {
                        return Ok(Some(next));
                    }
                }
                Ok(None)
            }
            (StepKind::Negative(plan), Candidates::Negative(pending)) => {
                if !std::mem::replace(pending, false) {
                    return Ok(None);
                }
                let mut sub = ExecutorState::new(Arc::clone(plan), self.matcher.clone(), env.clone());
                match sub.next() {
                    Some(Err(err)) => Err(err),
                    Some(Ok(_)) => {
                        trace!("NOT 子模式命中，丢弃当前绑定");
                        Ok(None)
                    }
                    None => Ok(Some(env.clone())),
                }
            }
            _ => Ok(None),
        }
    }

    /// 把候选绑定到目标别名及边、深度、路径别名
    ///
    /// 目标已绑定时要求到达的实体与之相同，并重新检查目标过滤
    fn bind_target(
        &self,
        step: &EdgeStep,
        hit: TraversalHit,
        env: &Environment,
    ) -> DBResult<Option<Environment>> {
        let target = &step.target;
        let value = Value::Vertex(Arc::clone(&hit.node));

        let mut next = match env.get(&target.alias) {
            Some(bound) => {
                if bound.entity_key() != value.entity_key() {
                    return Ok(None);
                }
                if !step.edge.is_quantified()
                    && !self.matcher.node_matches(target, &value, env, hit.depth)?
                {
                    return Ok(None);
                }
                env.clone()
            }
            None => {
                if !step.edge.is_quantified()
                    && !self.matcher.node_matches(target, &value, env, hit.depth)?
                {
                    return Ok(None);
                }
                env.bind(target.alias.clone(), value)
            }
        };

        let edge = hit.edge.map(Value::Edge).unwrap_or(Value::Null);
        let depth = Value::Int(hit.depth as i64);
        let mut path: Vec<Value> = hit.path.into_iter().map(Value::Vertex).collect();
        if step.reversed {
            path.reverse();
        }
        let extras = [
            (&step.edge.alias, edge),
            (&step.edge.depth_alias, depth),
            (&step.edge.path_alias, Value::List(path)),
        ];
        for (alias, value) in extras {
            let Some(alias) = alias else { continue };
            match Self::bind_or_check(&next, alias, value) {
                Some(env) => next = env,
                None => return Ok(None),
            }
        }
        Ok(Some(next))
    }

    /// 未绑定则绑定；已绑定则要求值相同
    fn bind_or_check(env: &Environment, alias: &str, value: Value) -> Option<Environment> {
        match env.get(alias) {
            Some(bound) if *bound == value => Some(env.clone()),
            Some(_) => None,
            None => Some(env.bind(alias, value)),
        }
    }

    /// 可选步骤未匹配：目标及其边、深度、路径别名绑定为 null
    fn bind_nulls(step: &StepKind, env: &Environment) -> Environment {
        let mut aliases: Vec<&str> = Vec::new();
        match step {
            StepKind::Start(node) => aliases.push(&node.alias),
            StepKind::Fixed(edge) | StepKind::Quantified(edge) => {
                aliases.push(&edge.target.alias);
                aliases.extend(edge.edge.bound_aliases().map(String::as_str));
            }
            StepKind::Optional(inner) => return Self::bind_nulls(inner, env),
            StepKind::Negative(_) => {}
        }
        aliases.into_iter().fold(env.clone(), |acc, alias| {
            if acc.contains(alias) {
                acc
            } else {
                acc.bind(alias, Value::Null)
            }
        })
    }

    /// 当前栈深度，用于调试输出
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn plan(&self) -> &ComponentPlan {
        &self.plan
    }
}

impl Iterator for ExecutorState {
    type Item = DBResult<Environment>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.step() {
                Ok(Transition::Success(env)) => {
                    trace!("分量匹配成功: {:?}", env);
                    return Some(Ok(env));
                }
                Ok(Transition::Exhausted) => return None,
                Ok(transition) => trace!("状态转移: {:?}", transition),
                Err(err) => return self.fail(err),
            }
        }
    }
}
