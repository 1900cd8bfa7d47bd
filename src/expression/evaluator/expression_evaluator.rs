//! 表达式求值器实现
//!
//! 递归求值 `Expression`，`AND`/`OR` 短路，函数调用依次尝试
//! 聚合值、图导航和标量函数，未知函数报错。

use crate::core::error::ExpressionError;
use crate::core::types::expression::Expression;
use crate::core::types::operators::{AggregateFunction, BinaryOperator};
use crate::core::Value;
use crate::expression::evaluator::functions::FunctionEvaluator;
use crate::expression::evaluator::graph_operations::GraphOperationEvaluator;
use crate::expression::evaluator::operations::{BinaryOperationEvaluator, UnaryOperationEvaluator};
use crate::expression::evaluator::traits::ExpressionContext;

/// 表达式求值器实现（unit struct，零开销）
#[derive(Debug)]
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    /// 在给定上下文中求值表达式
    pub fn evaluate<C: ExpressionContext + ?Sized>(
        expression: &Expression,
        context: &C,
    ) -> Result<Value, ExpressionError> {
        match expression {
            Expression::Literal(value) => Ok(value.clone()),
            Expression::List(items) => Ok(Value::List(Self::evaluate_batch(items, context)?)),
            Expression::Identifier(name) => Ok(context.get_variable(name).unwrap_or(Value::Null)),
            Expression::ContextVariable(name) => {
                Ok(context.get_context_variable(name).unwrap_or(Value::Null))
            }
            Expression::Property { object, name } => {
                let target = Self::evaluate(object, context)?;
                Ok(Self::property_of(&target, name))
            }
            Expression::Subscript { collection, index } => {
                let collection = Self::evaluate(collection, context)?;
                let index = Self::evaluate(index, context)?;
                Self::subscript(&collection, &index)
            }
            Expression::FunctionCall { target, name, args } => {
                Self::eval_call(expression, target.as_deref(), name, args, context)
            }
            Expression::Wildcard => Err(ExpressionError::invalid_operation(
                "'*' 只能用作 count(*) 的参数",
            )),
            Expression::Unary { op, operand } => {
                let value = Self::evaluate(operand, context)?;
                UnaryOperationEvaluator::evaluate(op, &value)
            }
            Expression::Binary { left, op, right } => {
                let l = Self::evaluate(left, context)?;
                // 短路
                match (op, &l) {
                    (BinaryOperator::And, Value::Bool(false)) => return Ok(Value::Bool(false)),
                    (BinaryOperator::Or, Value::Bool(true)) => return Ok(Value::Bool(true)),
                    _ => {}
                }
                let r = Self::evaluate(right, context)?;
                BinaryOperationEvaluator::evaluate(&l, op, &r)
            }
            Expression::IsNull { operand, negated } => {
                let value = Self::evaluate(operand, context)?;
                Ok(Value::Bool(value.is_null() != *negated))
            }
        }
    }

    /// 求值为布尔条件：只有 `true` 视为满足，空值与其他值都不满足
    pub fn evaluate_boolean<C: ExpressionContext + ?Sized>(
        expression: &Expression,
        context: &C,
    ) -> Result<bool, ExpressionError> {
        Ok(Self::evaluate(expression, context)?.is_true())
    }

    /// 批量求值表达式列表
    pub fn evaluate_batch<C: ExpressionContext + ?Sized>(
        expressions: &[Expression],
        context: &C,
    ) -> Result<Vec<Value>, ExpressionError> {
        let mut results = Vec::with_capacity(expressions.len());
        for expression in expressions {
            results.push(Self::evaluate(expression, context)?);
        }
        Ok(results)
    }

    /// 列表上的属性访问逐元素展开
    fn property_of(target: &Value, name: &str) -> Value {
        match target {
            Value::List(items) => {
                Value::List(items.iter().map(|v| Self::property_of(v, name)).collect())
            }
            other => other.property(name),
        }
    }

    fn subscript(collection: &Value, index: &Value) -> Result<Value, ExpressionError> {
        match (collection, index) {
            (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
            (Value::List(items), Value::Int(i)) => {
                let len = items.len() as i64;
                let pos = if *i < 0 { len + i } else { *i };
                Ok(if (0..len).contains(&pos) {
                    items[pos as usize].clone()
                } else {
                    Value::Null
                })
            }
            (Value::Map(_) | Value::Vertex(_) | Value::Edge(_), Value::String(key)) => {
                Ok(collection.property(key))
            }
            (c, i) => Err(ExpressionError::type_error(format!(
                "无法用 {} 索引 {}",
                i.type_name(),
                c.type_name()
            ))),
        }
    }

    fn eval_call<C: ExpressionContext + ?Sized>(
        call: &Expression,
        target: Option<&Expression>,
        name: &str,
        args: &[Expression],
        context: &C,
    ) -> Result<Value, ExpressionError> {
        if target.is_none() && AggregateFunction::from_name(name).is_some() {
            return context.aggregate_value(call).ok_or_else(|| {
                ExpressionError::aggregate_error(format!("聚合函数 {} 只能出现在 RETURN 投影中", name))
            });
        }

        if GraphOperationEvaluator::is_navigation(name) {
            let store = context.graph().ok_or_else(|| {
                ExpressionError::invalid_operation(format!("{}() 需要图存储上下文", name))
            })?;
            // 无接收者时从当前记录出发
            let source = match target {
                Some(t) => Self::evaluate(t, context)?,
                None => context
                    .get_context_variable("currentMatch")
                    .unwrap_or(Value::Null),
            };
            let labels = Self::evaluate_batch(args, context)?;
            return GraphOperationEvaluator::navigate(store, name, &source, &labels);
        }

        let mut values = Vec::with_capacity(args.len() + 1);
        if let Some(t) = target {
            values.push(Self::evaluate(t, context)?);
        }
        values.extend(Self::evaluate_batch(args, context)?);
        FunctionEvaluator::call(name, &values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::operators::UnaryOperator;
    use crate::expression::evaluator::traits::MapContext;
    use std::collections::BTreeMap;

    fn ctx() -> MapContext {
        let mut person = BTreeMap::new();
        person.insert("name".to_string(), Value::String("n1".into()));
        MapContext::new()
            .with_variable("name", Value::String("n1".into()))
            .with_variable("p", Value::Map(person))
            .with_context_variable("depth", Value::Int(2))
    }

    #[test]
    fn test_identifier_and_context_variable() {
        let expr = Expression::binary(
            Expression::identifier("name"),
            BinaryOperator::Equal,
            Expression::literal("n1"),
        );
        assert!(ExpressionEvaluator::evaluate_boolean(&expr, &ctx()).expect("eval"));

        let depth = Expression::binary(
            Expression::context("depth"),
            BinaryOperator::LessThan,
            Expression::literal(2i64),
        );
        assert!(!ExpressionEvaluator::evaluate_boolean(&depth, &ctx()).expect("eval"));
    }

    #[test]
    fn test_missing_identifier_is_null_and_not_true() {
        let expr = Expression::binary(
            Expression::identifier("missing"),
            BinaryOperator::Equal,
            Expression::literal(1i64),
        );
        assert_eq!(ExpressionEvaluator::evaluate(&expr, &ctx()).expect("eval"), Value::Null);
        assert!(!ExpressionEvaluator::evaluate_boolean(&expr, &ctx()).expect("eval"));
    }

    #[test]
    fn test_property_and_method() {
        let expr = Expression::method(
            Expression::property(Expression::identifier("p"), "name"),
            "toUpperCase",
            vec![],
        );
        assert_eq!(
            ExpressionEvaluator::evaluate(&expr, &ctx()).expect("eval"),
            Value::String("N1".into())
        );
    }

    #[test]
    fn test_short_circuit_skips_errors() {
        // false AND nosuch() 不会触发未知函数
        let expr = Expression::binary(
            Expression::literal(false),
            BinaryOperator::And,
            Expression::function("nosuch", vec![]),
        );
        assert_eq!(ExpressionEvaluator::evaluate(&expr, &ctx()).expect("eval"), Value::Bool(false));
    }

    #[test]
    fn test_unknown_function_errors() {
        let expr = Expression::function("nosuch", vec![]);
        assert!(ExpressionEvaluator::evaluate(&expr, &ctx()).is_err());
    }

    #[test]
    fn test_navigation_without_store_errors() {
        let expr = Expression::function("out", vec![Expression::literal("Friend")]);
        assert!(ExpressionEvaluator::evaluate(&expr, &ctx()).is_err());
    }

    #[test]
    fn test_aggregate_outside_projection_errors() {
        let expr = Expression::function("count", vec![Expression::Wildcard]);
        let err = ExpressionEvaluator::evaluate(&expr, &ctx()).expect_err("aggregate");
        assert_eq!(err.error_type, crate::core::ExpressionErrorType::AggregateError);
    }

    #[test]
    fn test_is_null_and_not() {
        let expr = Expression::IsNull {
            operand: Box::new(Expression::identifier("missing")),
            negated: false,
        };
        assert!(ExpressionEvaluator::evaluate_boolean(&expr, &ctx()).expect("eval"));
        let not = Expression::Unary {
            op: UnaryOperator::Not,
            operand: Box::new(expr),
        };
        assert!(!ExpressionEvaluator::evaluate_boolean(&not, &ctx()).expect("eval"));
    }

    #[test]
    fn test_subscript() {
        let expr = Expression::Subscript {
            collection: Box::new(Expression::List(vec![
                Expression::literal(1i64),
                Expression::literal(2i64),
            ])),
            index: Box::new(Expression::literal(-1i64)),
        };
        assert_eq!(ExpressionEvaluator::evaluate(&expr, &ctx()).expect("eval"), Value::Int(2));
    }
}
