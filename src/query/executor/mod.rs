// Re-export all executor modules
pub mod match_path;

// Re-export the match executor types
pub use match_path::{
    Deadline, Environment, ExecutorState, MatchExecutor, PatternMatcher, ResultProjector, Row,
    RowStream,
};
