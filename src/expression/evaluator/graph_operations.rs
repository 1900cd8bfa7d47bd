//! 图导航函数
//!
//! `out()`、`in()`、`both()` 返回邻居顶点列表，`outE()`、`inE()`、`bothE()` 返回边列表。
//! 接收者可以是单个顶点或顶点列表，空值接收者得到空列表。

use crate::core::error::ExpressionError;
use crate::core::{Direction, Value};
use crate::storage::GraphStore;

/// 图导航求值器
pub struct GraphOperationEvaluator;

/// 导航函数的返回内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Yield {
    Vertices,
    Edges,
}

impl GraphOperationEvaluator {
    fn resolve(name: &str) -> Option<(Direction, Yield)> {
        match name.to_ascii_lowercase().as_str() {
            "out" => Some((Direction::Out, Yield::Vertices)),
            "in" => Some((Direction::In, Yield::Vertices)),
            "both" => Some((Direction::Both, Yield::Vertices)),
            "oute" => Some((Direction::Out, Yield::Edges)),
            "ine" => Some((Direction::In, Yield::Edges)),
            "bothe" => Some((Direction::Both, Yield::Edges)),
            _ => None,
        }
    }

    pub fn is_navigation(name: &str) -> bool {
        Self::resolve(name).is_some()
    }

    /// 从 `source` 出发按方向和标签导航
    pub fn navigate(
        store: &dyn GraphStore,
        name: &str,
        source: &Value,
        labels: &[Value],
    ) -> Result<Value, ExpressionError> {
        let (direction, yields) =
            Self::resolve(name).ok_or_else(|| ExpressionError::unknown_function(name))?;
        let labels = labels
            .iter()
            .map(|l| match l {
                Value::String(s) => Ok(s.clone()),
                other => Err(ExpressionError::type_error(format!(
                    "{} 的标签参数必须是字符串, 实际为 {}",
                    name,
                    other.type_name()
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let sources: Vec<&Value> = match source {
            Value::List(items) => items.iter().collect(),
            other => vec![other],
        };

        let mut result = Vec::new();
        for src in sources {
            let vertex = match src {
                Value::Null => continue,
                Value::Vertex(v) => v,
                other => {
                    return Err(ExpressionError::type_error(format!(
                        "{}() 只能作用于顶点, 实际为 {}",
                        name,
                        other.type_name()
                    )))
                }
            };
            let neighbors = store
                .edges(vertex.id, &labels, direction)
                .map_err(|e| ExpressionError::storage_error(e.to_string()))?;
            for (edge, neighbor) in neighbors {
                result.push(match yields {
                    Yield::Vertices => Value::Vertex(neighbor),
                    Yield::Edges => Value::Edge(edge),
                });
            }
        }
        Ok(Value::List(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Properties;
    use crate::storage::MemoryGraphStore;

    #[test]
    fn test_navigate_out_and_in() {
        let store = MemoryGraphStore::new();
        let a = store.add_vertex("V", Properties::new()).expect("a");
        let b = store.add_vertex("V", Properties::new()).expect("b");
        store.add_edge("L", a, b, Properties::new()).expect("edge");

        let va = Value::Vertex(store.vertex(a).expect("lookup").expect("exists"));
        let out = GraphOperationEvaluator::navigate(&store, "out", &va, &[Value::String("L".into())])
            .expect("out");
        assert!(matches!(&out, Value::List(items) if items.len() == 1));

        let incoming = GraphOperationEvaluator::navigate(&store, "in", &va, &[]).expect("in");
        assert_eq!(incoming, Value::List(vec![]));

        let edges = GraphOperationEvaluator::navigate(&store, "outE", &va, &[]).expect("outE");
        assert!(matches!(&edges, Value::List(items) if matches!(items[0], Value::Edge(_))));
    }

    #[test]
    fn test_navigate_null_and_type_errors() {
        let store = MemoryGraphStore::new();
        let result = GraphOperationEvaluator::navigate(&store, "out", &Value::Null, &[]).expect("null");
        assert_eq!(result, Value::List(vec![]));
        assert!(GraphOperationEvaluator::navigate(&store, "out", &Value::Int(1), &[]).is_err());
        assert!(GraphOperationEvaluator::navigate(
            &store,
            "out",
            &Value::Null,
            &[Value::Int(3)]
        )
        .is_err());
    }
}
