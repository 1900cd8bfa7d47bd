pub mod error;
pub mod types;
pub mod value;
pub mod vertex_edge_path;

// 错误和结果类型
pub use error::{
    DBError, DBResult, ExpressionError, ExpressionErrorType, QueryError, QueryResult,
    StorageError, StorageResult,
};

// 核心数据类型
pub use value::{EntityKey, Value};
pub use vertex_edge_path::{Direction, Edge, EdgeId, Properties, Vertex, VertexId};

// 表达式系统类型
pub use types::{AggregateFunction, BinaryOperator, Expression, UnaryOperator};
