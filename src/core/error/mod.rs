//! 统一错误处理系统
//!
//! ## 设计理念
//!
//! 1. **按需设计**：表达式错误使用结构化设计，保留错误类型；
//!    查询与存储错误使用枚举设计，简洁高效
//!
//! 2. **分层转换**：
//!    - 核心错误使用 `#[from]` 注解自动转换
//!    - 外部错误（serde_json、toml、IO）通过自定义 `From` 实现转换为字符串
//!
//! 3. **统一接口**：`DBResult<T>` 提供统一的返回类型，简化错误传播

use thiserror::Error;

pub mod expression;
pub mod query;
pub mod storage;

pub use expression::{ExpressionError, ExpressionErrorType};
pub use query::{QueryError, QueryResult};
pub use storage::{StorageError, StorageResult};

/// 统一的数据库错误类型
#[derive(Error, Debug, Clone)]
pub enum DBError {
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("查询错误: {0}")]
    Query(#[from] QueryError),

    #[error("表达式错误: {0}")]
    Expression(#[from] ExpressionError),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO错误: {0}")]
    Io(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一的结果类型
pub type DBResult<T> = Result<T, DBError>;

impl DBError {
    /// 是否为超时错误
    pub fn is_timeout(&self) -> bool {
        matches!(self, DBError::Query(QueryError::Timeout { .. }))
    }

    /// 是否为模式编译期错误
    pub fn is_invalid_pattern(&self) -> bool {
        matches!(self, DBError::Query(QueryError::InvalidPattern(_)))
    }
}

// ==================== 外部错误转换实现 ====================

impl From<serde_json::Error> for DBError {
    fn from(err: serde_json::Error) -> Self {
        DBError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for DBError {
    fn from(err: std::io::Error) -> Self {
        DBError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for DBError {
    fn from(err: toml::de::Error) -> Self {
        DBError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DBError {
    fn from(err: toml::ser::Error) -> Self {
        DBError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_conversion() {
        let err: DBError = QueryError::InvalidPattern("别名未定义".to_string()).into();
        assert!(err.is_invalid_pattern());
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("别名未定义"));
    }

    #[test]
    fn test_timeout_detection() {
        let err: DBError = QueryError::Timeout {
            elapsed_ms: 12,
            limit_ms: 10,
        }
        .into();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{")
            .expect_err("Expected JSON parse failure");
        let err: DBError = parse_err.into();
        assert!(matches!(err, DBError::Serialization(_)));
    }
}
