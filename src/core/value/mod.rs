//! 值类型模块
//!
//! - `types`: `Value` 枚举与基础访问方法
//! - `comparison`: 相等、哈希与 SQL 风格比较
//! - `conversion`: 与 JSON 的互相转换

pub mod comparison;
pub mod conversion;
pub mod types;

pub use types::{EntityKey, Value};
