//! AST for MATCH statements

pub mod match_ast;

pub use match_ast::{
    ArrowQuantifier, EdgeSyntax, MatchExpression, MatchFilter, MatchPathItem, MatchStatement,
    OrderItem, PseudoTarget, ReturnClause, ReturnItem, ReturnTarget,
};
