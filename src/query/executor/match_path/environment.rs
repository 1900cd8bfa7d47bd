//! 匹配环境
//!
//! 别名到值的不可变映射。每次绑定返回一个新环境，与旧环境共享已有的绑定链；
//! 回溯时丢弃新环境即可，旧环境不受影响。

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::Value;

#[derive(Debug)]
struct Binding {
    alias: String,
    value: Value,
    parent: Option<Arc<Binding>>,
}

/// 持久化的别名绑定链
#[derive(Clone, Default)]
pub struct Environment {
    head: Option<Arc<Binding>>,
    len: usize,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, alias: &str) -> Option<&Value> {
        let mut node = self.head.as_deref();
        while let Some(binding) = node {
            if binding.alias == alias {
                return Some(&binding.value);
            }
            node = binding.parent.as_deref();
        }
        None
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.get(alias).is_some()
    }

    /// 扩展一个绑定，原环境保持不变
    pub fn bind(&self, alias: impl Into<String>, value: Value) -> Environment {
        let alias = alias.into();
        debug_assert!(!self.contains(&alias), "alias {} bound twice", alias);
        Environment {
            head: Some(Arc::new(Binding {
                alias,
                value,
                parent: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// 追加另一个环境中本环境尚未绑定的别名，保持其绑定顺序
    pub fn merge(&self, other: &Environment) -> Environment {
        let mut merged = self.clone();
        for (alias, value) in other.iter() {
            if !merged.contains(alias) {
                merged = merged.bind(alias, value.clone());
            }
        }
        merged
    }

    /// 按绑定顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        let mut bindings = Vec::with_capacity(self.len);
        let mut node = self.head.as_deref();
        while let Some(binding) = node {
            bindings.push((binding.alias.as_str(), &binding.value));
            node = binding.parent.as_deref();
        }
        bindings.into_iter().rev()
    }

    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.iter()
            .map(|(alias, value)| (alias.to_string(), value.clone()))
            .collect()
    }
}

impl PartialEq for Environment {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.to_map() == other.to_map()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
