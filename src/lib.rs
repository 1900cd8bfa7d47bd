//! GraphDB Match - the graph pattern-matching engine behind the `MATCH` clause
//!
//! The crate compiles textual `MATCH` statements into an immutable pattern
//! model, plans a deterministic expansion order for every connected pattern
//! component, and runs a lazy backtracking executor over a read-only graph
//! store. Bound environments are projected into result rows on demand, so
//! consumers that stop early (`LIMIT`) never pay for the unexplored search.

pub mod config;
pub mod core;
pub mod expression;
pub mod query;
pub mod storage;
pub mod utils;

pub use crate::core::error::{DBError, DBResult};
pub use crate::query::match_engine::{MatchEngine, ResultStream};
pub use crate::query::executor::match_path::Row;
pub use crate::storage::{GraphStore, MemoryGraphStore};
