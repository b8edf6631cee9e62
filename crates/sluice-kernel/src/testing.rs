//! Shared helpers for unit tests.

use std::sync::Arc;

use sluice_types::Span;

use crate::config::KernelConfig;
use crate::dispatch::{form, BuiltinFunction, Dispatch, FormExecutor, FormParts};
use crate::executor::LocalExecutor;
use crate::interpreter::{literal, string, Evaluator, StageOp};
use crate::paths::SearchPath;
use crate::value::Value;

/// A root evaluator with the local executor and the standard search path.
pub fn evaluator() -> Evaluator {
    evaluator_with(Arc::new(LocalExecutor::new()))
}

pub fn evaluator_with(executor: Arc<dyn FormExecutor>) -> Evaluator {
    Evaluator::new(
        Arc::new(KernelConfig::default()),
        executor,
        Arc::new(SearchPath::new("/bin:/usr/bin")),
    )
}

/// Sends each argument on its output.
pub fn emit() -> BuiltinFunction {
    BuiltinFunction::new("emit", |ev: Evaluator, args: Vec<Value>| async move {
        for arg in args {
            ev.output.send(arg).await?;
        }
        Ok(String::new())
    })
}

/// A form stage running `builtin` with literal arguments.
pub fn builtin_stage(builtin: BuiltinFunction, args: Vec<Value>) -> StageOp {
    let name = builtin.name.clone();
    form(
        FormParts::new(Span::new(1, 1), string(name), Dispatch::Builtin(builtin))
            .args(literal(args)),
    )
}
