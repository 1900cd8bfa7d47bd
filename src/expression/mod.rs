//! 表达式模块
//!
//! 在变量环境上求值过滤条件与投影表达式，聚合累加器供分组投影使用

pub mod aggregate_functions;
pub mod evaluator;

pub use aggregate_functions::AggregateAccumulator;
pub use evaluator::{ExpressionContext, ExpressionEvaluator, MapContext};
