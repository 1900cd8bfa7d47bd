//! 解析器模块
//!
//! 负责把 MATCH 语句解析为语法树：语句与 RETURN 子句、模式、表达式。

mod expr_parser;
#[allow(clippy::module_inception)]
mod parser;
mod pattern_parser;

pub use parser::Parser;
