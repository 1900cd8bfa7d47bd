//! 模式模型
//!
//! 编译后的 MATCH 模式：与语法无关，别名已解析，三种边写法已统一为 `EdgePattern`。
//! 构建后不可变，由规划器和执行器共享。

use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::expression::Expression;
use crate::core::{Direction, VertexId};

/// 自动生成别名的保留前缀
pub const AUTO_ALIAS_PREFIX: &str = "$ANON_";

/// 是否为编译器生成的别名
pub fn is_auto_alias(alias: &str) -> bool {
    alias.starts_with(AUTO_ALIAS_PREFIX)
}

/// 节点模式；同一别名的多次出现合并为一个节点
#[derive(Debug, Clone, PartialEq)]
pub struct NodePattern {
    pub alias: String,
    /// 类过滤（多态）
    pub class: Option<String>,
    /// 记录标识过滤
    pub rid: Option<VertexId>,
    pub where_clause: Option<Expression>,
    pub optional: bool,
}

impl NodePattern {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            class: None,
            rid: None,
            where_clause: None,
            optional: false,
        }
    }

    pub fn is_auto(&self) -> bool {
        is_auto_alias(&self.alias)
    }

    /// 过滤条件中通过 `$matched` 引用的别名
    pub fn dependencies(&self) -> BTreeSet<String> {
        self.where_clause
            .as_ref()
            .map(Expression::matched_aliases)
            .unwrap_or_default()
    }
}

/// 重复次数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantifierKind {
    /// 恰好一跳
    Single,
    /// `*`：0..∞
    Star,
    /// `+`：1..∞
    Plus,
    /// `{m,n}`，`max` 为空表示无上界
    Range { min: u32, max: Option<u32> },
}

/// 边的量词：重复次数加上可选的 `while` 条件与 `maxDepth`
#[derive(Debug, Clone, PartialEq)]
pub struct Quantifier {
    pub kind: QuantifierKind,
    pub while_condition: Option<Expression>,
    pub max_depth: Option<u32>,
}

impl Default for Quantifier {
    fn default() -> Self {
        Self::single()
    }
}

impl Quantifier {
    pub fn single() -> Self {
        Self {
            kind: QuantifierKind::Single,
            while_condition: None,
            max_depth: None,
        }
    }

    /// 是否需要按深度遍历；带 `while`/`maxDepth` 的单跳边同样是递归的
    pub fn is_recursive(&self) -> bool {
        self.kind != QuantifierKind::Single
            || self.while_condition.is_some()
            || self.max_depth.is_some()
    }

    pub fn min(&self) -> u32 {
        match self.kind {
            QuantifierKind::Single if self.is_recursive() => 0,
            QuantifierKind::Single => 1,
            QuantifierKind::Star => 0,
            QuantifierKind::Plus => 1,
            QuantifierKind::Range { min, .. } => min,
        }
    }

    /// 有效上界：量词上界与 `maxDepth` 取小
    pub fn max(&self) -> Option<u32> {
        let base = match self.kind {
            QuantifierKind::Single if self.is_recursive() => None,
            QuantifierKind::Single => Some(1),
            QuantifierKind::Star | QuantifierKind::Plus => None,
            QuantifierKind::Range { max, .. } => max,
        };
        match (base, self.max_depth) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// 边模式，`source`/`target` 为按书写顺序的两端别名
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePattern {
    pub source: String,
    pub target: String,
    pub direction: Direction,
    /// 为空表示任意标签
    pub labels: Vec<String>,
    pub quantifier: Quantifier,
    /// 边自身的别名（`.outE(){as: e}` 形式）
    pub alias: Option<String>,
    /// 边自身的类过滤
    pub class: Option<String>,
    /// 边自身的过滤条件
    pub where_clause: Option<Expression>,
    pub depth_alias: Option<String>,
    pub path_alias: Option<String>,
    /// 目标节点可选
    pub optional: bool,
}

impl EdgePattern {
    pub fn new(source: impl Into<String>, target: impl Into<String>, direction: Direction) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            direction,
            labels: Vec::new(),
            quantifier: Quantifier::single(),
            alias: None,
            class: None,
            where_clause: None,
            depth_alias: None,
            path_alias: None,
            optional: false,
        }
    }

    pub fn is_quantified(&self) -> bool {
        self.quantifier.is_recursive()
    }

    /// 边条件与 `while` 条件通过 `$matched` 引用的别名
    pub fn dependencies(&self) -> BTreeSet<String> {
        let mut deps = BTreeSet::new();
        for expr in [&self.where_clause, &self.quantifier.while_condition]
            .into_iter()
            .flatten()
        {
            deps.extend(expr.matched_aliases());
        }
        deps
    }

    /// 该边绑定的附加别名（边、深度、路径）
    pub fn bound_aliases(&self) -> impl Iterator<Item = &String> {
        [&self.alias, &self.depth_alias, &self.path_alias]
            .into_iter()
            .flatten()
    }
}

/// 一条路径：起点后接若干条边，每条边的 `source` 是前一个节点
#[derive(Debug, Clone, PartialEq)]
pub struct PathPattern {
    pub origin: String,
    pub edges: Vec<EdgePattern>,
}

impl PathPattern {
    /// 按书写顺序的节点别名，长度为边数加一
    pub fn node_aliases(&self) -> Vec<&str> {
        let mut aliases = Vec::with_capacity(self.edges.len() + 1);
        aliases.push(self.origin.as_str());
        aliases.extend(self.edges.iter().map(|e| e.target.as_str()));
        aliases
    }

    /// 路径中出现的全部别名（节点与边附加别名）
    pub fn all_aliases(&self) -> BTreeSet<String> {
        let mut aliases: BTreeSet<String> =
            self.node_aliases().into_iter().map(String::from).collect();
        for edge in &self.edges {
            aliases.extend(edge.bound_aliases().cloned());
        }
        aliases
    }
}

/// 一组共享节点表的路径
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatternGraph {
    /// 别名到合并后节点的映射
    pub nodes: BTreeMap<String, NodePattern>,
    pub paths: Vec<PathPattern>,
}

impl PatternGraph {
    pub fn node(&self, alias: &str) -> Option<&NodePattern> {
        self.nodes.get(alias)
    }

    pub fn aliases(&self) -> BTreeSet<String> {
        let mut aliases = BTreeSet::new();
        for path in &self.paths {
            aliases.extend(path.all_aliases());
        }
        aliases
    }
}

/// 别名的用途，投影阶段据此决定可见性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    Node,
    Edge,
    Depth,
    Path,
}

/// 编译完成的 MATCH 模式
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pattern {
    /// 正向模式
    pub positive: PatternGraph,
    /// `NOT {...}` 模式，各自独立的节点表
    pub negatives: Vec<PatternGraph>,
    /// 正向模式的别名，按首次出现顺序
    pub alias_order: Vec<String>,
    pub alias_kinds: BTreeMap<String, AliasKind>,
}

impl Pattern {
    pub fn alias_kind(&self, alias: &str) -> Option<AliasKind> {
        self.alias_kinds.get(alias).copied()
    }

    pub fn has_alias(&self, alias: &str) -> bool {
        self.alias_kinds.contains_key(alias)
    }

    /// 用户声明的节点与边别名，`$matches` 的列
    pub fn visible_aliases(&self) -> impl Iterator<Item = &String> {
        self.alias_order.iter().filter(|a| {
            !is_auto_alias(a)
                && matches!(self.alias_kind(a), Some(AliasKind::Node | AliasKind::Edge))
        })
    }

    /// 是否存在递归边
    pub fn has_quantified_edges(&self) -> bool {
        self.positive
            .paths
            .iter()
            .any(|p| p.edges.iter().any(EdgePattern::is_quantified))
    }
}
