//! 表达式错误类型
//!
//! 包含错误类型和错误消息，支持序列化/反序列化

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 表达式错误（结构化设计）
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionError {
    /// 错误类型
    pub error_type: ExpressionErrorType,
    /// 错误消息
    pub message: String,
}

/// 表达式错误类型枚举
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpressionErrorType {
    /// 类型错误
    TypeError,
    /// 未定义变量
    UndefinedVariable,
    /// 未知函数
    UnknownFunction,
    /// 参数数量错误
    ArgumentCountError,
    /// 除零
    DivisionByZero,
    /// 溢出错误
    Overflow,
    /// 无效操作
    InvalidOperation,
    /// 正则表达式错误
    RegexError,
    /// 聚合函数错误
    AggregateError,
    /// 存储访问错误
    StorageError,
}

impl fmt::Display for ExpressionErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionErrorType::TypeError => write!(f, "类型错误"),
            ExpressionErrorType::UndefinedVariable => write!(f, "未定义变量"),
            ExpressionErrorType::UnknownFunction => write!(f, "未知函数"),
            ExpressionErrorType::ArgumentCountError => write!(f, "参数数量错误"),
            ExpressionErrorType::DivisionByZero => write!(f, "除零错误"),
            ExpressionErrorType::Overflow => write!(f, "溢出错误"),
            ExpressionErrorType::InvalidOperation => write!(f, "无效操作"),
            ExpressionErrorType::RegexError => write!(f, "正则表达式错误"),
            ExpressionErrorType::AggregateError => write!(f, "聚合函数错误"),
            ExpressionErrorType::StorageError => write!(f, "存储访问错误"),
        }
    }
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

impl ExpressionError {
    /// 创建新的表达式错误
    pub fn new(error_type: ExpressionErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
        }
    }

    /// 创建类型错误
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ExpressionErrorType::TypeError, message)
    }

    /// 创建未定义变量错误
    pub fn undefined_variable(name: impl AsRef<str>) -> Self {
        Self::new(
            ExpressionErrorType::UndefinedVariable,
            format!("未定义的变量: {}", name.as_ref()),
        )
    }

    /// 创建未知函数错误
    pub fn unknown_function(name: impl AsRef<str>) -> Self {
        Self::new(
            ExpressionErrorType::UnknownFunction,
            format!("函数 {} 不存在", name.as_ref()),
        )
    }

    /// 创建参数数量错误
    pub fn argument_count_error(name: impl AsRef<str>, expected: &str, actual: usize) -> Self {
        Self::new(
            ExpressionErrorType::ArgumentCountError,
            format!(
                "函数 {} 需要 {} 个参数, 实际 {} 个",
                name.as_ref(),
                expected,
                actual
            ),
        )
    }

    pub fn division_by_zero() -> Self {
        Self::new(ExpressionErrorType::DivisionByZero, "除数为零")
    }

    pub fn overflow(message: impl Into<String>) -> Self {
        Self::new(ExpressionErrorType::Overflow, message)
    }

    /// 创建无效操作错误
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::new(ExpressionErrorType::InvalidOperation, message)
    }

    pub fn regex_error(message: impl Into<String>) -> Self {
        Self::new(ExpressionErrorType::RegexError, message)
    }

    pub fn aggregate_error(message: impl Into<String>) -> Self {
        Self::new(ExpressionErrorType::AggregateError, message)
    }

    pub fn storage_error(message: impl Into<String>) -> Self {
        Self::new(ExpressionErrorType::StorageError, message)
    }
}
