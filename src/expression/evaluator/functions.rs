//! 内置标量函数与方法
//!
//! 方法调用 `x.size()` 与函数调用 `size(x)` 共用同一套实现：
//! 方法接收者作为第一个参数传入。名字不区分大小写。

use crate::core::error::ExpressionError;
use crate::core::Value;

/// 标量函数求值器
pub struct FunctionEvaluator;

impl FunctionEvaluator {
    /// 是否为已知的标量函数
    pub fn is_scalar(name: &str) -> bool {
        matches!(
            name.to_ascii_lowercase().as_str(),
            "size"
                | "length"
                | "touppercase"
                | "tolowercase"
                | "trim"
                | "keys"
                | "asstring"
                | "asinteger"
                | "coalesce"
                | "ifnull"
                | "abs"
        )
    }

    /// 调用标量函数
    pub fn call(name: &str, args: &[Value]) -> Result<Value, ExpressionError> {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "coalesce" => Ok(args
                .iter()
                .find(|v| !v.is_null())
                .cloned()
                .unwrap_or(Value::Null)),
            "ifnull" => {
                Self::expect_args(name, args, 2)?;
                Ok(if args[0].is_null() {
                    args[1].clone()
                } else {
                    args[0].clone()
                })
            }
            "size" => {
                Self::expect_args(name, args, 1)?;
                Ok(match &args[0] {
                    Value::Null => Value::Int(0),
                    Value::List(items) => Value::Int(items.len() as i64),
                    Value::Map(map) => Value::Int(map.len() as i64),
                    Value::String(s) => Value::Int(s.chars().count() as i64),
                    _ => Value::Int(1),
                })
            }
            "length" => {
                Self::expect_args(name, args, 1)?;
                match &args[0] {
                    Value::Null => Ok(Value::Null),
                    Value::String(s) => Ok(Value::Int(s.chars().count() as i64)),
                    Value::List(items) => Ok(Value::Int(items.len() as i64)),
                    other => Err(Self::type_mismatch(name, other)),
                }
            }
            "touppercase" | "tolowercase" | "trim" => {
                Self::expect_args(name, args, 1)?;
                match &args[0] {
                    Value::Null => Ok(Value::Null),
                    Value::String(s) => Ok(Value::String(match lower.as_str() {
                        "touppercase" => s.to_uppercase(),
                        "tolowercase" => s.to_lowercase(),
                        _ => s.trim().to_string(),
                    })),
                    other => Err(Self::type_mismatch(name, other)),
                }
            }
            "keys" => {
                Self::expect_args(name, args, 1)?;
                match &args[0] {
                    Value::Null => Ok(Value::Null),
                    Value::Map(map) => Ok(Value::List(
                        map.keys().map(|k| Value::String(k.clone())).collect(),
                    )),
                    Value::Vertex(v) => Ok(Value::List(
                        v.properties.keys().map(|k| Value::String(k.clone())).collect(),
                    )),
                    Value::Edge(e) => Ok(Value::List(
                        e.properties.keys().map(|k| Value::String(k.clone())).collect(),
                    )),
                    other => Err(Self::type_mismatch(name, other)),
                }
            }
            "asstring" => {
                Self::expect_args(name, args, 1)?;
                Ok(match &args[0] {
                    Value::Null => Value::Null,
                    other => Value::String(super::operations::display(other)),
                })
            }
            "asinteger" => {
                Self::expect_args(name, args, 1)?;
                match &args[0] {
                    Value::Null => Ok(Value::Null),
                    Value::Int(i) => Ok(Value::Int(*i)),
                    Value::Float(f) => Ok(Value::Int(f.trunc() as i64)),
                    Value::String(s) => s
                        .trim()
                        .parse::<i64>()
                        .map(Value::Int)
                        .map_err(|_| ExpressionError::type_error(format!("无法将 '{}' 转换为整数", s))),
                    other => Err(Self::type_mismatch(name, other)),
                }
            }
            "abs" => {
                Self::expect_args(name, args, 1)?;
                match &args[0] {
                    Value::Null => Ok(Value::Null),
                    Value::Int(i) => i
                        .checked_abs()
                        .map(Value::Int)
                        .ok_or_else(|| ExpressionError::overflow(format!("abs 溢出: {}", i))),
                    Value::Float(f) => Ok(Value::Float(f.abs())),
                    other => Err(Self::type_mismatch(name, other)),
                }
            }
            _ => Err(ExpressionError::unknown_function(name)),
        }
    }

    fn expect_args(name: &str, args: &[Value], expected: usize) -> Result<(), ExpressionError> {
        if args.len() != expected {
            return Err(ExpressionError::argument_count_error(
                name,
                &expected.to_string(),
                args.len(),
            ));
        }
        Ok(())
    }

    fn type_mismatch(name: &str, value: &Value) -> ExpressionError {
        ExpressionError::type_error(format!("{} 不支持 {} 类型", name, value.type_name()))
    }
}
