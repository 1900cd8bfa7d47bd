//! Parse tree of a MATCH statement
//!
//! This is the syntax-level shape of the query: filters are kept exactly as
//! written and edge forms are not yet normalized. The pattern compiler turns
//! it into the pattern model.

use crate::core::types::expression::Expression;
use crate::core::{Direction, VertexId};
use crate::query::parser::core::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct MatchStatement {
    /// Positive patterns in declaration order.
    pub patterns: Vec<MatchExpression>,
    /// `NOT {...}` patterns.
    pub not_patterns: Vec<MatchExpression>,
    pub return_clause: ReturnClause,
}

/// One comma-separated path: an origin node followed by edge/node steps.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchExpression {
    pub origin: MatchFilter,
    pub items: Vec<MatchPathItem>,
}

/// The `{key: value, ...}` block attached to a node (or to an edge in the
/// `.outE(){...}.inV()` form).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchFilter {
    pub class: Option<String>,
    /// `rid: '#12'` or `rid: 12` pins the node to one record
    pub rid: Option<VertexId>,
    pub alias: Option<String>,
    pub where_clause: Option<Expression>,
    pub while_clause: Option<Expression>,
    pub max_depth: Option<u32>,
    pub optional: bool,
    pub depth_alias: Option<String>,
    pub path_alias: Option<String>,
    pub position: Position,
}

impl MatchFilter {
    pub fn is_empty(&self) -> bool {
        self.class.is_none()
            && self.rid.is_none()
            && self.alias.is_none()
            && self.where_clause.is_none()
            && self.while_clause.is_none()
            && self.max_depth.is_none()
            && !self.optional
            && self.depth_alias.is_none()
            && self.path_alias.is_none()
    }
}

/// Repetition written on an arrow, e.g. `-Friend*->` or `-Friend{1,3}->`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowQuantifier {
    Star,
    Plus,
    Range { min: u32, max: Option<u32> },
}

/// Which syntax an edge step was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSyntax {
    /// `.out('l')`
    Method,
    /// `.outE('l').inV()`
    EdgeThenVertex,
    /// `-l->`
    Arrow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchPathItem {
    pub syntax: EdgeSyntax,
    pub direction: Direction,
    /// Empty means any label.
    pub labels: Vec<String>,
    pub quantifier: Option<ArrowQuantifier>,
    /// Filter on the edge record itself (`.outE(){...}` form only).
    pub edge_filter: Option<MatchFilter>,
    /// Filter on the node reached by this step.
    pub filter: MatchFilter,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoTarget {
    Matches,
    Patterns,
    Paths,
    Elements,
    PathElements,
}

impl PseudoTarget {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "matches" => Some(PseudoTarget::Matches),
            "patterns" => Some(PseudoTarget::Patterns),
            "paths" => Some(PseudoTarget::Paths),
            "elements" => Some(PseudoTarget::Elements),
            "pathElements" => Some(PseudoTarget::PathElements),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PseudoTarget::Matches => "$matches",
            PseudoTarget::Patterns => "$patterns",
            PseudoTarget::Paths => "$paths",
            PseudoTarget::Elements => "$elements",
            PseudoTarget::PathElements => "$pathElements",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnItem {
    pub expression: Expression,
    pub alias: Option<String>,
    /// Source text of the expression, used as the default column name.
    pub text: String,
}

impl ReturnItem {
    pub fn column_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReturnTarget {
    Pseudo(PseudoTarget),
    Items(Vec<ReturnItem>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub expression: Expression,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnClause {
    pub distinct: bool,
    pub target: ReturnTarget,
    pub group_by: Vec<Expression>,
    pub order_by: Vec<OrderItem>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}
