use super::types::Value;
use std::cmp::Ordering as CmpOrdering;
use std::hash::{Hash, Hasher};

// 手动实现PartialEq以正确处理f64比较
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => (a == b) || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Vertex(a), Value::Vertex(b)) => a.id == b.id,
            (Value::Edge(a), Value::Edge(b)) => a.id == b.id,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => {
                // NaN 统一为同一位模式
                if f.is_nan() {
                    f64::NAN.to_bits().hash(state)
                } else {
                    f.to_bits().hash(state)
                }
            }
            Value::String(s) => s.hash(state),
            Value::List(l) => l.hash(state),
            Value::Map(m) => {
                for (k, v) in m {
                    k.hash(state);
                    v.hash(state);
                }
            }
            Value::Vertex(v) => v.id.hash(state),
            Value::Edge(e) => e.id.hash(state),
        }
    }
}

impl Value {
    /// 谓词比较：数值跨整数/浮点比较，类型不兼容或含空值时返回 `None`
    pub fn sql_cmp(&self, other: &Value) -> Option<CmpOrdering> {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => None,
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Vertex(a), Value::Vertex(b)) => Some(a.id.cmp(&b.id)),
            (Value::Edge(a), Value::Edge(b)) => Some(a.id.cmp(&b.id)),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        }
    }

    /// 谓词相等：空值参与时结果未知
    pub fn sql_eq(&self, other: &Value) -> Option<bool> {
        if self.is_null() || other.is_null() {
            return None;
        }
        match (self, other) {
            (Value::Int(_), Value::Float(_)) | (Value::Float(_), Value::Int(_)) => {
                self.sql_cmp(other).map(|o| o == CmpOrdering::Equal)
            }
            _ => Some(self == other),
        }
    }

    /// 排序用的全序：空值最小，其后依次为布尔、数值、字符串、列表、映射、顶点、边
    pub fn total_cmp(&self, other: &Value) -> CmpOrdering {
        let rank = |v: &Value| -> u8 {
            match v {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Int(_) | Value::Float(_) => 2,
                Value::String(_) => 3,
                Value::List(_) => 4,
                Value::Map(_) => 5,
                Value::Vertex(_) => 6,
                Value::Edge(_) => 7,
            }
        };
        match (self, other) {
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let ord = x.total_cmp(y);
                    if ord != CmpOrdering::Equal {
                        return ord;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Map(a), Value::Map(b)) => a.len().cmp(&b.len()),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            _ if rank(self) == rank(other) => {
                self.sql_cmp(other).unwrap_or(CmpOrdering::Equal)
            }
            _ => rank(self).cmp(&rank(other)),
        }
    }
}
