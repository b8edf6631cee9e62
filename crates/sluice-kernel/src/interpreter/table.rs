//! Table literal construction.

use std::sync::Arc;

use sluice_types::Span;

use crate::error::EvalError;
use crate::value::{Table, Value};

use super::ops::{values_op, ValuesOp};

/// Build a table from a list part and `(keys, values)` operation pairs.
///
/// The list part is evaluated first. Each pair must then produce equally many
/// keys and values, which are assigned positionally.
pub fn table(span: Span, list: ValuesOp, entries: Vec<(ValuesOp, ValuesOp)>) -> ValuesOp {
    let entries: Arc<[(ValuesOp, ValuesOp)]> = entries.into();
    values_op(move |ev| {
        let list = list.clone();
        let entries = entries.clone();
        async move {
            let mut table = Table::new();
            table.append(list(ev.clone()).await?);
            for (key_op, value_op) in entries.iter() {
                let keys = key_op(ev.clone()).await?;
                let values = value_op(ev.clone()).await?;
                if keys.len() != values.len() {
                    return Err(EvalError::user(
                        span,
                        format!(
                            "number of keys doesn't match number of values: {} vs. {}",
                            keys.len(),
                            values.len()
                        ),
                    ));
                }
                for (key, value) in keys.into_iter().zip(values) {
                    table.insert(key, value);
                }
            }
            Ok(vec![Value::Table(Arc::new(table))])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::ops::{literal, string};
    use crate::testing::evaluator;

    #[tokio::test]
    async fn list_and_entries() {
        let op = table(
            Span::default(),
            literal(vec!["a".into(), "b".into()]),
            vec![(
                literal(vec!["k1".into(), "k2".into()]),
                literal(vec!["v1".into(), "v2".into()]),
            )],
        );
        let values = op(evaluator()).await.unwrap();
        assert_eq!(values.len(), 1);
        let table = values[0].as_table().unwrap();
        assert_eq!(table.list, vec![Value::from("a"), Value::from("b")]);
        assert_eq!(table.dict.len(), 2);
        assert_eq!(table.get(&"k1".into()), Some(&Value::from("v1")));
        assert_eq!(table.get(&"k2".into()), Some(&Value::from("v2")));
    }

    #[tokio::test]
    async fn count_mismatch_is_a_user_error() {
        let op = table(
            Span::new(4, 1),
            literal(vec![]),
            vec![(literal(vec!["k1".into(), "k2".into()]), string("v1"))],
        );
        let err = op(evaluator()).await.unwrap_err();
        assert!(!err.is_defect());
        assert_eq!(
            err.to_string(),
            "4:1: number of keys doesn't match number of values: 2 vs. 1"
        );
    }

    #[tokio::test]
    async fn later_entries_overwrite_earlier_keys() {
        let op = table(
            Span::default(),
            literal(vec![]),
            vec![
                (string("k"), string("first")),
                (string("k"), string("second")),
            ],
        );
        let values = op(evaluator()).await.unwrap();
        let table = values[0].as_table().unwrap();
        assert_eq!(table.get(&"k".into()), Some(&Value::from("second")));
    }
}
