//! 查询层错误类型
//!
//! 涵盖 MATCH 语句的解析、模式编译、规划和执行过程中的错误

use thiserror::Error;

use crate::core::error::expression::ExpressionError;
use crate::core::error::storage::StorageError;

/// 查询操作结果类型别名
pub type QueryResult<T> = Result<T, QueryError>;

/// 查询层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 模式编译期错误：未解析的别名、非法量词、自引用的 where 条件等
    #[error("无效模式: {0}")]
    InvalidPattern(String),

    #[error("规划错误: {0}")]
    PlanningError(String),

    /// 匹配过程中表达式求值失败，整个匹配被中止
    #[error("命令执行错误: {0}")]
    CommandExecution(String),

    #[error("查询超时: 已运行 {elapsed_ms} ms, 上限 {limit_ms} ms")]
    Timeout { elapsed_ms: u64, limit_ms: u64 },

    #[error("执行错误: {0}")]
    ExecutionError(String),

    #[error("存储错误: {0}")]
    StorageError(String),
}

impl QueryError {
    /// 将表达式错误包装为命令执行错误
    pub fn command_execution(err: ExpressionError) -> Self {
        QueryError::CommandExecution(err.to_string())
    }

    /// 带位置信息的解析错误
    pub fn parse_error_at(message: impl AsRef<str>, line: usize, column: usize) -> Self {
        QueryError::ParseError(format!("{} (行 {}, 列 {})", message.as_ref(), line, column))
    }

    pub fn invalid_pattern(message: impl Into<String>) -> Self {
        QueryError::InvalidPattern(message.into())
    }
}

impl From<StorageError> for QueryError {
    fn from(err: StorageError) -> Self {
        QueryError::StorageError(err.to_string())
    }
}
