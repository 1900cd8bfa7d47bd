//! MATCH 规划模块
//! 模式模型、模式编译器与执行计划

pub mod match_planner;
pub mod pattern;
pub mod pattern_compiler;

pub use match_planner::{ComponentPlan, EdgeStep, MatchPlan, MatchPlanner, StepKind};
pub use pattern::{
    is_auto_alias, AliasKind, EdgePattern, NodePattern, PathPattern, Pattern, PatternGraph,
    Quantifier, QuantifierKind, AUTO_ALIAS_PREFIX,
};
pub use pattern_compiler::PatternCompiler;
