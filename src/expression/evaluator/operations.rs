/// 算术、比较和逻辑运算模块
///
/// 比较与逻辑运算遵循 SQL 三值逻辑：空值参与的比较结果为空值
use crate::core::error::ExpressionError;
use crate::core::types::operators::{BinaryOperator, UnaryOperator};
use crate::core::value::types::Value;
use std::cmp::Ordering;

/// 二元运算求值器
pub struct BinaryOperationEvaluator;

impl BinaryOperationEvaluator {
    /// 求值二元运算（`AND`/`OR` 的短路由调用方处理）
    pub fn evaluate(
        left: &Value,
        op: &BinaryOperator,
        right: &Value,
    ) -> Result<Value, ExpressionError> {
        match op {
            // 算术运算
            BinaryOperator::Add => Self::eval_add(left, right),
            BinaryOperator::Subtract => Self::eval_arith(left, right, op),
            BinaryOperator::Multiply => Self::eval_arith(left, right, op),
            BinaryOperator::Divide => Self::eval_arith(left, right, op),
            BinaryOperator::Modulo => Self::eval_arith(left, right, op),

            // 比较运算
            BinaryOperator::Equal => Ok(Self::eval_equal(left, right)),
            BinaryOperator::NotEqual => Ok(match Self::eval_equal(left, right) {
                Value::Bool(b) => Value::Bool(!b),
                other => other,
            }),
            BinaryOperator::LessThan => Ok(Self::eval_ordering(left, right, |o| o.is_lt())),
            BinaryOperator::LessThanOrEqual => {
                Ok(Self::eval_ordering(left, right, |o| o.is_le()))
            }
            BinaryOperator::GreaterThan => Ok(Self::eval_ordering(left, right, |o| o.is_gt())),
            BinaryOperator::GreaterThanOrEqual => {
                Ok(Self::eval_ordering(left, right, |o| o.is_ge()))
            }

            // 逻辑运算
            BinaryOperator::And => Self::eval_and(left, right),
            BinaryOperator::Or => Self::eval_or(left, right),

            // 集合与字符串运算
            BinaryOperator::In => Ok(Self::eval_in(left, right)),
            BinaryOperator::Contains => Ok(Self::eval_in(right, left)),
            BinaryOperator::Matches => Self::eval_matches(left, right),
        }
    }

    fn eval_equal(left: &Value, right: &Value) -> Value {
        match left.sql_eq(right) {
            Some(b) => Value::Bool(b),
            None => Value::Null,
        }
    }

    fn eval_ordering(left: &Value, right: &Value, test: impl Fn(Ordering) -> bool) -> Value {
        match left.sql_cmp(right) {
            Some(ord) => Value::Bool(test(ord)),
            None => Value::Null,
        }
    }

    fn logical_operand(value: &Value, op: &str) -> Result<Option<bool>, ExpressionError> {
        match value {
            Value::Bool(b) => Ok(Some(*b)),
            Value::Null => Ok(None),
            other => Err(ExpressionError::type_error(format!(
                "{} 的操作数必须是布尔值, 实际为 {}",
                op,
                other.type_name()
            ))),
        }
    }

    /// 三值逻辑 AND
    pub fn eval_and(left: &Value, right: &Value) -> Result<Value, ExpressionError> {
        let l = Self::logical_operand(left, "AND")?;
        let r = Self::logical_operand(right, "AND")?;
        Ok(match (l, r) {
            (Some(false), _) | (_, Some(false)) => Value::Bool(false),
            (Some(true), Some(true)) => Value::Bool(true),
            _ => Value::Null,
        })
    }

    /// 三值逻辑 OR
    pub fn eval_or(left: &Value, right: &Value) -> Result<Value, ExpressionError> {
        let l = Self::logical_operand(left, "OR")?;
        let r = Self::logical_operand(right, "OR")?;
        Ok(match (l, r) {
            (Some(true), _) | (_, Some(true)) => Value::Bool(true),
            (Some(false), Some(false)) => Value::Bool(false),
            _ => Value::Null,
        })
    }

    fn eval_add(left: &Value, right: &Value) -> Result<Value, ExpressionError> {
        match (left, right) {
            (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
            (Value::String(a), b) => Ok(Value::String(format!("{}{}", a, display(b)))),
            (a, Value::String(b)) => Ok(Value::String(format!("{}{}", display(a), b))),
            (Value::List(a), Value::List(b)) => {
                Ok(Value::List(a.iter().chain(b.iter()).cloned().collect()))
            }
            _ => Self::eval_arith(left, right, &BinaryOperator::Add),
        }
    }

    fn eval_arith(
        left: &Value,
        right: &Value,
        op: &BinaryOperator,
    ) -> Result<Value, ExpressionError> {
        match (left, right) {
            (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
            (Value::Int(a), Value::Int(b)) => {
                let result = match op {
                    BinaryOperator::Add => a.checked_add(*b),
                    BinaryOperator::Subtract => a.checked_sub(*b),
                    BinaryOperator::Multiply => a.checked_mul(*b),
                    BinaryOperator::Divide | BinaryOperator::Modulo if *b == 0 => {
                        return Err(ExpressionError::division_by_zero())
                    }
                    BinaryOperator::Divide => a.checked_div(*b),
                    BinaryOperator::Modulo => a.checked_rem(*b),
                    _ => None,
                };
                result.map(Value::Int).ok_or_else(|| {
                    ExpressionError::overflow(format!("整数运算溢出: {} {} {}", a, op.name(), b))
                })
            }
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => Ok(Value::Float(match op {
                    BinaryOperator::Add => x + y,
                    BinaryOperator::Subtract => x - y,
                    BinaryOperator::Multiply => x * y,
                    BinaryOperator::Divide => x / y,
                    BinaryOperator::Modulo => x % y,
                    _ => {
                        return Err(ExpressionError::invalid_operation(format!(
                            "{} 不是算术运算符",
                            op.name()
                        )))
                    }
                })),
                _ => Err(ExpressionError::type_error(format!(
                    "无法对 {} 和 {} 执行 {}",
                    a.type_name(),
                    b.type_name(),
                    op.name()
                ))),
            },
        }
    }

    /// `needle IN haystack`；字符串视为子串包含
    fn eval_in(needle: &Value, haystack: &Value) -> Value {
        match (needle, haystack) {
            (_, Value::Null) => Value::Null,
            (_, Value::List(items)) => {
                if needle.is_null() {
                    return Value::Null;
                }
                Value::Bool(items.iter().any(|item| needle.sql_eq(item) == Some(true)))
            }
            (Value::String(n), Value::String(h)) => Value::Bool(h.contains(n.as_str())),
            (Value::Null, _) => Value::Null,
            (n, h) => Value::Bool(n.sql_eq(h) == Some(true)),
        }
    }

    /// 正则全匹配
    fn eval_matches(left: &Value, right: &Value) -> Result<Value, ExpressionError> {
        match (left, right) {
            (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
            (Value::String(text), Value::String(pattern)) => {
                let re = regex::Regex::new(&format!("^(?:{})$", pattern))
                    .map_err(|e| ExpressionError::regex_error(e.to_string()))?;
                Ok(Value::Bool(re.is_match(text)))
            }
            (a, b) => Err(ExpressionError::type_error(format!(
                "MATCHES 需要字符串操作数, 实际为 {} 和 {}",
                a.type_name(),
                b.type_name()
            ))),
        }
    }
}

/// 一元运算求值器
pub struct UnaryOperationEvaluator;

impl UnaryOperationEvaluator {
    pub fn evaluate(op: &UnaryOperator, value: &Value) -> Result<Value, ExpressionError> {
        match (op, value) {
            (_, Value::Null) => Ok(Value::Null),
            (UnaryOperator::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            (UnaryOperator::Minus, Value::Int(i)) => i
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| ExpressionError::overflow(format!("整数取负溢出: {}", i))),
            (UnaryOperator::Minus, Value::Float(f)) => Ok(Value::Float(-f)),
            (op, v) => Err(ExpressionError::type_error(format!(
                "{} 不能作用于 {}",
                op.name(),
                v.type_name()
            ))),
        }
    }
}

/// 字符串拼接时的显示形式
pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s.clone(),
        Value::Vertex(v) => v.rid(),
        Value::Edge(e) => e.rid(),
        other => other.to_json().to_string(),
    }
}
