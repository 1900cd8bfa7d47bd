//! 核心类型：表达式 AST 与操作符

pub mod expression;
pub mod operators;

pub use expression::Expression;
pub use operators::{AggregateFunction, BinaryOperator, UnaryOperator};
