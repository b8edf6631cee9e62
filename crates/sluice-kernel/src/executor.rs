//! In-process form executor.
//!
//! Every form becomes a spawned task that reports exactly one status update:
//! the builtin's message, `""` for a closure that finished, or
//! `error: ...` for a failed stage. External commands are handed to a
//! [`ProcessLauncher`], which owns the OS mechanics.

use std::sync::Arc;

use async_trait::async_trait;
use sluice_types::StateUpdate;

use crate::dispatch::{Command, Form, FormExecutor};
use crate::error::{EvalError, EvalResult};
use crate::interpreter::Evaluator;
use crate::scheduler::{stage_channel, StageHandle};

/// Starts external processes for forms that resolved to an executable.
///
/// Implementations wire the form's ports to the child's stdio, wait for it,
/// and return its status message (`""` for success).
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    async fn run(&self, form: &Form) -> anyhow::Result<String>;
}

/// Runs builtins, special forms and closures as tasks on the current runtime.
#[derive(Clone, Default)]
pub struct LocalExecutor {
    launcher: Option<Arc<dyn ProcessLauncher>>,
}

impl LocalExecutor {
    /// An executor that cannot start external processes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_launcher(launcher: Arc<dyn ProcessLauncher>) -> Self {
        Self { launcher: Some(launcher) }
    }
}

#[async_trait]
impl FormExecutor for LocalExecutor {
    async fn exec_form(&self, form: Form, ev: Evaluator) -> EvalResult<StageHandle> {
        let (status, handle) = stage_channel();
        let launcher = self.launcher.clone();
        let ev = ev.with_ports(form.input.clone(), form.output.clone());
        tokio::spawn(async move {
            let name = form.name.clone();
            let span = form.span;
            let update = match run_form(form, ev, launcher).await.map_err(|e| e.or_span(span)) {
                Ok(msg) => StateUpdate::new(msg),
                Err(e) => {
                    tracing::warn!(command = %name, error = %e, "stage failed");
                    StateUpdate::new(format!("error: {e}"))
                }
            };
            status.emit(update);
        });
        Ok(handle)
    }
}

async fn run_form(
    form: Form,
    ev: Evaluator,
    launcher: Option<Arc<dyn ProcessLauncher>>,
) -> EvalResult<String> {
    match &form.command {
        Command::Builtin(builtin) => (builtin.func)(ev, form.args).await,
        Command::Special(special) => (special.op)(ev, form.args).await,
        Command::Closure(closure) => {
            closure.check_ports(form.span, &ev)?;
            closure.invoke(ev, form.args).await.map(|_| String::new())
        }
        Command::External(path) => {
            let launcher = launcher.ok_or_else(|| {
                EvalError::user(form.span, format!("{}: no process launcher", path.display()))
            })?;
            drop(ev);
            launcher
                .run(&form)
                .await
                .map_err(|e| EvalError::user(form.span, format!("{}: {e:#}", path.display())))
        }
    }
}
