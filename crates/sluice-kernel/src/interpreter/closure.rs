//! Closures: a captured scope, a body, and a stream shape.

use std::fmt;
use std::sync::Arc;

use futures::future;
use sluice_types::{Bounds, ClosureAnnotation, Span};

use crate::error::{EvalError, EvalResult};
use crate::value::Value;

use super::evaluator::Evaluator;
use super::ops::{chunk, values_op, ChunkOp, ValuesOp};
use super::scope::Scope;

/// Name under which invocation arguments are bound inside the body.
pub const ARGS_VAR: &str = "args";

pub struct Closure {
    scope: Scope,
    body: ChunkOp,
    bounds: Bounds,
}

impl Closure {
    pub fn new(scope: Scope, body: ChunkOp, bounds: Bounds) -> Self {
        Self { scope, body, bounds }
    }

    /// The captured scope.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Fail unless the caller's ports satisfy this closure's bounds.
    pub fn check_ports(&self, span: Span, ev: &Evaluator) -> EvalResult<()> {
        if !self.bounds.input.admits(ev.input.kind()) {
            return Err(EvalError::user(span, "closure input not satisfiable"));
        }
        if !self.bounds.output.admits(ev.output.kind()) {
            return Err(EvalError::user(span, "closure output not satisfiable"));
        }
        Ok(())
    }

    /// Run the body with the caller's ports, on a child of the captured scope
    /// in which `args` holds the arguments. Each body statement reports to the
    /// caller's status callback.
    pub async fn invoke(&self, ev: Evaluator, args: Vec<Value>) -> EvalResult<Vec<Value>> {
        let scope = self.scope.child();
        scope.bind(ARGS_VAR, Value::List(args));
        (self.body)(ev.with_scope(scope)).await
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("enclosed", &self.scope.names())
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

/// Compile a closure literal.
///
/// Each run captures the slots of exactly the annotated free variables.
pub fn closure(body: Vec<ValuesOp>, annotation: ClosureAnnotation) -> ValuesOp {
    let body = chunk(body);
    let annotation = Arc::new(annotation);
    values_op(move |ev| {
        let result = ev
            .scope
            .capture(annotation.enclosed.iter().map(String::as_str))
            .map(|scope| {
                let closure = Closure::new(scope, body.clone(), annotation.bounds);
                vec![Value::Closure(Arc::new(closure))]
            });
        future::ready(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::ops::{string, var};
    use crate::testing::evaluator;

    async fn make(ev: &Evaluator, body: Vec<ValuesOp>, enclosed: &[&str]) -> Arc<Closure> {
        let op = closure(body, ClosureAnnotation::new(enclosed.iter().copied(), Bounds::default()));
        let values = op(ev.clone()).await.unwrap();
        values[0].as_closure().unwrap().clone()
    }

    #[tokio::test]
    async fn captures_only_enclosed_names() {
        let ev = evaluator();
        ev.scope.bind("x", "1".into());
        ev.scope.bind("y", "2".into());
        let c = make(&ev, vec![var("x")], &["x"]).await;
        assert_eq!(c.scope().names(), vec!["x".to_string()]);
    }

    #[tokio::test]
    async fn rebinding_after_capture_is_invisible() {
        let ev = evaluator();
        ev.scope.bind("x", "before".into());
        let c = make(&ev, vec![var("x")], &["x"]).await;

        ev.scope.bind("x", "rebound".into());

        let out = c.invoke(ev.clone(), vec![]).await.unwrap();
        assert_eq!(out, vec![Value::from("before")]);
    }

    #[tokio::test]
    async fn mutation_through_the_slot_is_visible() {
        let ev = evaluator();
        ev.scope.bind("x", "before".into());
        let c = make(&ev, vec![var("x")], &["x"]).await;

        ev.scope.set("x", "mutated".into());

        let out = c.invoke(ev.clone(), vec![]).await.unwrap();
        assert_eq!(out, vec![Value::from("mutated")]);
    }

    #[tokio::test]
    async fn arguments_are_bound_as_args() {
        let ev = evaluator();
        let c = make(&ev, vec![var(ARGS_VAR)], &[]).await;
        let out = c.invoke(ev.clone(), vec!["a".into(), "b".into()]).await.unwrap();
        assert_eq!(out, vec![Value::List(vec!["a".into(), "b".into()])]);
        assert!(!c.scope().contains(ARGS_VAR));
    }

    #[tokio::test]
    async fn missing_free_variable_is_a_defect() {
        let op = closure(vec![string("x")], ClosureAnnotation::new(["ghost"], Bounds::default()));
        let err = op(evaluator()).await.unwrap_err();
        assert!(err.is_defect());
    }

    #[tokio::test]
    async fn each_run_creates_a_distinct_closure() {
        let ev = evaluator();
        let op = closure(vec![string("x")], ClosureAnnotation::default());
        let a = op(ev.clone()).await.unwrap();
        let b = op(ev).await.unwrap();
        assert_ne!(a, b);
    }
}
