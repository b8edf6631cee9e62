//! Operations and the combinators that compose them.
//!
//! Compiling a checked syntax tree yields a graph of operations. Each
//! operation takes its own copy of the evaluator and returns a boxed future,
//! so composed operations can be stored, shared and run any number of times.

use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use sluice_types::Span;

use crate::error::{defect, Defect, EvalError, EvalResult};
use crate::scheduler::{Port, StageHandle};
use crate::value::Value;

use super::evaluator::Evaluator;

/// Produces values.
pub type ValuesOp =
    Arc<dyn Fn(Evaluator) -> BoxFuture<'static, EvalResult<Vec<Value>>> + Send + Sync>;

/// Runs a sequence of statements; yields the values of the last one.
pub type ChunkOp = ValuesOp;

/// Produces a port, for redirections.
pub type PortOp = Arc<dyn Fn(&Evaluator) -> EvalResult<Port> + Send + Sync>;

/// Launches one pipeline stage and hands back its completion handle.
pub type StageOp =
    Arc<dyn Fn(Evaluator) -> BoxFuture<'static, EvalResult<StageHandle>> + Send + Sync>;

/// Box an async function as a [`ValuesOp`].
pub fn values_op<F, Fut>(f: F) -> ValuesOp
where
    F: Fn(Evaluator) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = EvalResult<Vec<Value>>> + Send + 'static,
{
    Arc::new(move |ev: Evaluator| f(ev).boxed())
}

/// Box an async function as a [`StageOp`].
pub fn stage_op<F, Fut>(f: F) -> StageOp
where
    F: Fn(Evaluator) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = EvalResult<StageHandle>> + Send + 'static,
{
    Arc::new(move |ev: Evaluator| f(ev).boxed())
}

/// Always yields `values`, whatever the context.
pub fn literal(values: Vec<Value>) -> ValuesOp {
    values_op(move |_ev| future::ready(Ok(values.clone())))
}

/// A single string literal.
pub fn string(text: impl Into<String>) -> ValuesOp {
    literal(vec![Value::String(text.into())])
}

/// Dereference a variable. The checker has resolved `name`, so absence is a defect.
pub fn var(name: impl Into<String>) -> ValuesOp {
    let name = name.into();
    values_op(move |ev| {
        let result = ev
            .scope
            .get(&name)
            .map(|v| vec![v])
            .ok_or_else(|| defect(Defect::UnresolvedVariable(name.clone())));
        future::ready(result)
    })
}

/// Fuse the fragments of one term, left to right.
///
/// A fragment yielding one value is adjoined onto every accumulated value.
/// A fragment yielding several expands the accumulation into a row-major
/// product.
pub fn term(span: Span, fragments: Vec<ValuesOp>) -> ValuesOp {
    let fragments: Arc<[ValuesOp]> = fragments.into();
    values_op(move |ev| {
        let fragments = fragments.clone();
        async move {
            let Some((first, rest)) = fragments.split_first() else {
                return Ok(Vec::new());
            };
            let mut acc = first(ev.clone()).await?;
            for fragment in rest {
                let next = fragment(ev.clone()).await?;
                acc = adjoin(span, acc, &next)?;
            }
            Ok(acc)
        }
    })
}

/// Combine accumulated values with one fragment's values. `acc[i]` paired
/// with `next[j]` lands at `i * next.len() + j`.
pub fn adjoin(span: Span, mut acc: Vec<Value>, next: &[Value]) -> EvalResult<Vec<Value>> {
    let caret = |v: &Value, u: &Value| v.caret(u).map_err(|e| EvalError::user(span, e.to_string()));
    if let [single] = next {
        for v in acc.iter_mut() {
            *v = caret(v, single)?;
        }
        return Ok(acc);
    }
    let mut product = Vec::with_capacity(acc.len() * next.len());
    for v in &acc {
        for u in next {
            product.push(caret(v, u)?);
        }
    }
    Ok(product)
}

/// Concatenate the values of several terms; no product.
pub fn term_list(terms: Vec<ValuesOp>) -> ValuesOp {
    let terms: Arc<[ValuesOp]> = terms.into();
    values_op(move |ev| {
        let terms = terms.clone();
        async move {
            let mut values = Vec::with_capacity(terms.len());
            for op in terms.iter() {
                values.extend(op(ev.clone()).await?);
            }
            Ok(values)
        }
    })
}

/// Run statements in order, reporting each one's values as its status.
pub fn chunk(statements: Vec<ValuesOp>) -> ChunkOp {
    let statements: Arc<[ValuesOp]> = statements.into();
    values_op(move |ev| {
        let statements = statements.clone();
        async move {
            let mut last = Vec::new();
            for op in statements.iter() {
                last = op(ev.clone()).await?;
                ev.report_status(&last);
            }
            Ok(last)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::evaluator;
    use std::sync::Mutex;

    fn strs(values: &[&str]) -> Vec<Value> {
        values.iter().map(|s| Value::from(*s)).collect()
    }

    #[tokio::test]
    async fn single_fragment_adjoins_in_place() {
        let op = term(Span::default(), vec![
            literal(strs(&["a", "b"])),
            string("-x"),
        ]);
        assert_eq!(op(evaluator()).await.unwrap(), strs(&["a-x", "b-x"]));
    }

    #[tokio::test]
    async fn one_then_many_expands_without_duplicating() {
        let op = term(Span::default(), vec![
            string("A"),
            literal(strs(&["-x", "-y"])),
        ]);
        assert_eq!(op(evaluator()).await.unwrap(), strs(&["A-x", "A-y"]));
    }

    #[tokio::test]
    async fn many_by_many_is_row_major() {
        let op = term(Span::default(), vec![
            literal(strs(&["A", "B"])),
            literal(strs(&["x", "y"])),
        ]);
        assert_eq!(op(evaluator()).await.unwrap(), strs(&["Ax", "Ay", "Bx", "By"]));
    }

    #[tokio::test]
    async fn three_fragments_keep_source_order() {
        let op = term(Span::default(), vec![
            literal(strs(&["a", "b"])),
            literal(strs(&["1", "2"])),
            string("!"),
        ]);
        assert_eq!(op(evaluator()).await.unwrap(), strs(&["a1!", "a2!", "b1!", "b2!"]));
    }

    #[tokio::test]
    async fn empty_fragment_empties_the_term() {
        let op = term(Span::default(), vec![string("a"), literal(vec![])]);
        assert!(op(evaluator()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn caret_failure_carries_span() {
        let table = Value::Table(Arc::new(crate::value::Table::new()));
        let op = term(Span::new(2, 5), vec![literal(vec![table]), string("x")]);
        let err = op(evaluator()).await.unwrap_err();
        assert_eq!(err.span(), Some(Span::new(2, 5)));
        assert!(!err.is_defect());
    }

    #[tokio::test]
    async fn term_list_concatenates() {
        let op = term_list(vec![literal(strs(&["a", "b"])), string("c")]);
        assert_eq!(op(evaluator()).await.unwrap(), strs(&["a", "b", "c"]));
    }

    #[tokio::test]
    async fn var_reads_current_value() {
        let ev = evaluator();
        ev.scope.bind("x", "hello".into());
        assert_eq!(var("x")(ev).await.unwrap(), strs(&["hello"]));
    }

    #[tokio::test]
    async fn missing_var_is_a_defect() {
        let err = var("nope")(evaluator()).await.unwrap_err();
        assert!(err.is_defect());
    }

    #[tokio::test]
    async fn chunk_reports_each_statement() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut ev = evaluator();
        ev.set_status_callback(Some(Arc::new(move |vs: &[Value]| {
            sink.lock().unwrap().push(vs.to_vec());
        })));

        let op = chunk(vec![string("one"), literal(strs(&["two", "three"]))]);
        let last = op(ev).await.unwrap();

        assert_eq!(last, strs(&["two", "three"]));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], strs(&["one"]));
    }
}
