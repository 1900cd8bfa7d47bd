//! 表达式求值器
//!
//! - `expression_evaluator`: 递归求值入口
//! - `operations`: 二元/一元运算
//! - `functions`: 标量函数与方法
//! - `graph_operations`: 图导航函数
//! - `traits`: 求值上下文

pub mod expression_evaluator;
pub mod functions;
pub mod graph_operations;
pub mod operations;
pub mod traits;

pub use expression_evaluator::ExpressionEvaluator;
pub use traits::{ExpressionContext, MapContext};
