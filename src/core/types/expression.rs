//! 表达式 AST
//!
//! 节点过滤条件、`while` 条件和 RETURN 投影共用的表达式树。

use std::collections::BTreeSet;

use crate::core::types::operators::{AggregateFunction, BinaryOperator, UnaryOperator};
use crate::core::value::Value;

/// 表达式
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// 字面量
    Literal(Value),
    /// 列表字面量 `[a, b]`
    List(Vec<Expression>),
    /// 裸标识符：过滤条件中是当前记录的属性，投影中是别名
    Identifier(String),
    /// 上下文变量，名字不含 `$`，如 `depth`、`currentMatch`、`matched`
    ContextVariable(String),
    /// 属性访问 `object.name`
    Property {
        object: Box<Expression>,
        name: String,
    },
    /// 下标访问 `collection[index]`
    Subscript {
        collection: Box<Expression>,
        index: Box<Expression>,
    },
    /// 函数或方法调用；`target` 为方法接收者
    FunctionCall {
        target: Option<Box<Expression>>,
        name: String,
        args: Vec<Expression>,
    },
    /// `count(*)` 中的 `*`
    Wildcard,
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    IsNull {
        operand: Box<Expression>,
        negated: bool,
    },
}

impl Expression {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier(name.into())
    }

    pub fn context(name: impl Into<String>) -> Self {
        Expression::ContextVariable(name.into())
    }

    pub fn property(object: Expression, name: impl Into<String>) -> Self {
        Expression::Property {
            object: Box::new(object),
            name: name.into(),
        }
    }

    pub fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::FunctionCall {
            target: None,
            name: name.into(),
            args,
        }
    }

    pub fn method(target: Expression, name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::FunctionCall {
            target: Some(Box::new(target)),
            name: name.into(),
            args,
        }
    }

    /// 先序遍历所有子表达式（含自身）
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Expression)) {
        visit(self);
        match self {
            Expression::Literal(_)
            | Expression::Identifier(_)
            | Expression::ContextVariable(_)
            | Expression::Wildcard => {}
            Expression::List(items) => items.iter().for_each(|e| e.walk(visit)),
            Expression::Property { object, .. } => object.walk(visit),
            Expression::Subscript { collection, index } => {
                collection.walk(visit);
                index.walk(visit);
            }
            Expression::FunctionCall { target, args, .. } => {
                if let Some(t) = target {
                    t.walk(visit);
                }
                args.iter().for_each(|e| e.walk(visit));
            }
            Expression::Unary { operand, .. } | Expression::IsNull { operand, .. } => {
                operand.walk(visit)
            }
            Expression::Binary { left, right, .. } => {
                left.walk(visit);
                right.walk(visit);
            }
        }
    }

    /// 通过 `$matched.<alias>` 引用的别名
    pub fn matched_aliases(&self) -> BTreeSet<String> {
        let mut aliases = BTreeSet::new();
        self.walk(&mut |e| {
            if let Expression::Property { object, name } = e {
                if matches!(object.as_ref(), Expression::ContextVariable(v) if v == "matched") {
                    aliases.insert(name.clone());
                }
            }
        });
        aliases
    }

    /// 投影中作为根出现的裸标识符（即引用的别名）
    pub fn root_identifiers(&self) -> BTreeSet<String> {
        let mut roots = BTreeSet::new();
        self.walk(&mut |e| {
            if let Expression::Identifier(name) = e {
                roots.insert(name.clone());
            }
        });
        roots
    }

    /// 是否包含聚合函数调用
    pub fn contains_aggregate(&self) -> bool {
        let mut found = false;
        self.walk(&mut |e| {
            if let Expression::FunctionCall { target: None, name, .. } = e {
                if AggregateFunction::from_name(name).is_some() {
                    found = true;
                }
            }
        });
        found
    }

    /// 是否引用了上下文变量
    pub fn uses_context_variable(&self, var: &str) -> bool {
        let mut found = false;
        self.walk(&mut |e| {
            if matches!(e, Expression::ContextVariable(v) if v == var) {
                found = true;
            }
        });
        found
    }
}
