//! MATCH 路径执行
//!
//! 环境、状态机、递归遍历、笛卡尔组合与结果投影

pub mod cartesian;
pub mod deadline;
pub mod environment;
pub mod executor_state;
pub mod match_executor;
pub mod pattern_matcher;
pub mod result_builder;
pub mod traversal_engine;

pub use cartesian::CartesianProduct;
pub use deadline::Deadline;
pub use environment::Environment;
pub use executor_state::{ExecutorState, Transition};
pub use match_executor::MatchExecutor;
pub use pattern_matcher::{IdentifierScope, MatchEvalContext, PatternMatcher};
pub use result_builder::{ResultProjector, Row, RowStream};
pub use traversal_engine::{QuantifiedTraversal, TraversalHit};
