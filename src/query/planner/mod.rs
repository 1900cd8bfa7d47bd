//! 规划模块
//! 把解析树编译为模式模型，并为每个笛卡尔分量生成执行计划

pub mod match_planning;

pub use match_planning::{MatchPlan, MatchPlanner, Pattern, PatternCompiler};
