// Query module for the graph pattern-matching engine
//
// This module provides the complete MATCH pipeline:
// - Parsing query strings into AST
// - Compiling patterns and planning the expansion order
// - Executing the plan lazily against the graph store
// - Caching compiled statements

// Sub-modules
pub mod executor;
pub mod match_cache;
pub mod match_engine;
pub mod parser;
pub mod planner;

// Re-export error types from core module
pub use crate::core::{DBResult, QueryError};
pub use match_cache::{MatchCache, MatchCacheStats};
pub use match_engine::{CompiledMatch, MatchEngine, ResultStream};
