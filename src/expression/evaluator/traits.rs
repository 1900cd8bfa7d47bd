//! 表达式上下文特征定义
//!
//! 为求值器提供变量解析、上下文变量与图导航所需的存储访问

use crate::core::types::expression::Expression;
use crate::core::Value;
use crate::storage::GraphStore;

/// 表达式上下文特征
///
/// 上下文是只读的：匹配过程中的环境是不可变值，求值不会修改它
pub trait ExpressionContext {
    /// 解析裸标识符
    fn get_variable(&self, name: &str) -> Option<Value>;

    /// 解析上下文变量（名字不含 `$`）
    fn get_context_variable(&self, _name: &str) -> Option<Value> {
        None
    }

    /// 图存储，`out()`/`in()`/`both()` 等导航函数需要
    fn graph(&self) -> Option<&dyn GraphStore> {
        None
    }

    /// 分组投影时返回已计算好的聚合值
    fn aggregate_value(&self, _call: &Expression) -> Option<Value> {
        None
    }
}

/// 基于映射的简单上下文，主要用于测试和常量求值
#[derive(Debug, Default, Clone)]
pub struct MapContext {
    pub variables: std::collections::HashMap<String, Value>,
    pub context_variables: std::collections::HashMap<String, Value>,
}

impl MapContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: &str, value: Value) -> Self {
        self.variables.insert(name.to_string(), value);
        self
    }

    pub fn with_context_variable(mut self, name: &str, value: Value) -> Self {
        self.context_variables.insert(name.to_string(), value);
        self
    }
}

impl ExpressionContext for MapContext {
    fn get_variable(&self, name: &str) -> Option<Value> {
        self.variables.get(name).cloned()
    }

    fn get_context_variable(&self, name: &str) -> Option<Value> {
        self.context_variables.get(name).cloned()
    }
}
