//! 聚合函数累加器
//!
//! 分组投影为每个 (分组, 聚合调用) 维护一个累加器。空值不参与聚合，
//! `count(*)` 由调用方为每一行传入非空值。

use crate::core::error::ExpressionError;
use crate::core::types::operators::AggregateFunction;
use crate::core::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct AggregateAccumulator {
    function: AggregateFunction,
    count: i64,
    int_sum: Option<i64>,
    float_sum: f64,
    saw_float: bool,
    best: Option<Value>,
    items: Vec<Value>,
}

impl AggregateAccumulator {
    pub fn new(function: AggregateFunction) -> Self {
        Self {
            function,
            count: 0,
            int_sum: Some(0),
            float_sum: 0.0,
            saw_float: false,
            best: None,
            items: Vec::new(),
        }
    }

    pub fn function(&self) -> AggregateFunction {
        self.function
    }

    /// 累加一个值
    pub fn accumulate(&mut self, value: Value) -> Result<(), ExpressionError> {
        if value.is_null() {
            return Ok(());
        }
        self.count += 1;
        match self.function {
            AggregateFunction::Count => {}
            AggregateFunction::Sum | AggregateFunction::Avg => match &value {
                Value::Int(i) => {
                    self.int_sum = self.int_sum.and_then(|s| s.checked_add(*i));
                    self.float_sum += *i as f64;
                }
                Value::Float(f) => {
                    self.saw_float = true;
                    self.float_sum += f;
                }
                other => {
                    return Err(ExpressionError::aggregate_error(format!(
                        "{} 只能作用于数值, 实际为 {}",
                        self.function.name(),
                        other.type_name()
                    )))
                }
            },
            AggregateFunction::Min | AggregateFunction::Max => {
                let replace = match &self.best {
                    None => true,
                    Some(best) => {
                        let ord = value.total_cmp(best);
                        if self.function == AggregateFunction::Min {
                            ord == Ordering::Less
                        } else {
                            ord == Ordering::Greater
                        }
                    }
                };
                if replace {
                    self.best = Some(value);
                }
            }
            AggregateFunction::Collect => self.items.push(value),
        }
        Ok(())
    }

    /// 输出聚合结果
    pub fn finish(&self) -> Result<Value, ExpressionError> {
        Ok(match self.function {
            AggregateFunction::Count => Value::Int(self.count),
            AggregateFunction::Sum if self.count == 0 => Value::Null,
            AggregateFunction::Sum => {
                if self.saw_float {
                    Value::Float(self.float_sum)
                } else {
                    Value::Int(self.int_sum.ok_or_else(|| {
                        ExpressionError::overflow("sum 结果超出整数范围")
                    })?)
                }
            }
            AggregateFunction::Avg if self.count == 0 => Value::Null,
            AggregateFunction::Avg => Value::Float(self.float_sum / self.count as f64),
            AggregateFunction::Min | AggregateFunction::Max => {
                self.best.clone().unwrap_or(Value::Null)
            }
            AggregateFunction::Collect => Value::List(self.items.clone()),
        })
    }
}
