//! Output capture: run an operation and collect what it emits.

use sluice_types::Span;

use crate::error::{EvalError, EvalResult};
use crate::interpreter::{values_op, Evaluator, ValuesOp};
use crate::value::Value;

use super::port::{ChanPort, Port};
use super::value_channel::value_channel;

/// Compile an output capture around `op`.
pub fn output_capture(span: Span, op: ValuesOp) -> ValuesOp {
    values_op(move |ev| {
        let op = op.clone();
        async move { capture_output(span, &op, ev).await }
    })
}

/// Run `op` with its output on a private value channel and return every
/// value it emitted, in emission order.
///
/// The collector runs alongside `op`, since each send waits for a reader.
pub async fn capture_output(span: Span, op: &ValuesOp, ev: Evaluator) -> EvalResult<Vec<Value>> {
    let (tx, rx) = value_channel();
    let collector = tokio::spawn(async move {
        let mut values = Vec::new();
        while let Some(value) = rx.recv().await {
            values.push(value);
        }
        values
    });

    let mut inner = ev;
    inner.output = Port::Chan(ChanPort::Sender(tx));
    if let Err(e) = op(inner).await {
        collector.abort();
        return Err(e);
    }

    collector
        .await
        .map_err(|e| EvalError::user(span, format!("output capture failed: {e}")))
}
