//! 存储层错误类型
//!
//! 图存储只读访问与快照加载相关的错误

use thiserror::Error;

/// 存储层结果类型
pub type StorageResult<T> = Result<T, StorageError>;

/// 存储层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("未找到: {0}")]
    NotFound(String),
    #[error("已存在: {0}")]
    AlreadyExists(String),
    #[error("无效输入: {0}")]
    InvalidInput(String),
    #[error("反序列化错误: {0}")]
    DeserializeError(String),
    #[error("IO错误: {0}")]
    IOError(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::IOError(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::DeserializeError(err.to_string())
    }
}
