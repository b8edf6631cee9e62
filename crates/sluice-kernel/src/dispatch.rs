//! Form dispatch: resolving and launching one pipeline stage.
//!
//! A form op evaluates the command name and arguments, applies redirections,
//! resolves the command per the checker's [`Dispatch`] decision, and hands
//! the populated [`Form`] to the [`FormExecutor`]:
//!
//! ```text
//! form op ──▶ name, args, ports ──▶ Dispatch ──▶ Command ──▶ FormExecutor::exec_form
//!                                      │                           │
//!                      ┌───────┬───────┼────────┬─────────┐        ▼
//!                   builtin special defined  closure  external  StageHandle
//!                                                  (PathResolver)
//! ```
//!
//! How a command actually runs is the executor's business; this module owns
//! only the shape of what it is handed.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use sluice_types::Span;
use thiserror::Error;

use crate::error::{defect, Defect, EvalError, EvalResult};
use crate::interpreter::{stage_op, Closure, Evaluator, PortOp, StageOp, ValuesOp};
use crate::scheduler::{Port, StageHandle};
use crate::value::Value;

/// Body of a builtin or special form. Resolves to the stage's status message.
pub type BuiltinImpl =
    Arc<dyn Fn(Evaluator, Vec<Value>) -> BoxFuture<'static, EvalResult<String>> + Send + Sync>;

fn boxed<F, Fut>(f: F) -> BuiltinImpl
where
    F: Fn(Evaluator, Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = EvalResult<String>> + Send + 'static,
{
    Arc::new(move |ev: Evaluator, args: Vec<Value>| f(ev, args).boxed())
}

/// A builtin command, called with evaluated arguments.
#[derive(Clone)]
pub struct BuiltinFunction {
    pub name: String,
    pub func: BuiltinImpl,
}

impl BuiltinFunction {
    pub fn new<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Evaluator, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = EvalResult<String>> + Send + 'static,
    {
        Self { name: name.into(), func: boxed(f) }
    }
}

/// A special form: control constructs compiled with their own sub-operations.
#[derive(Clone)]
pub struct SpecialForm {
    pub name: String,
    pub op: BuiltinImpl,
}

impl SpecialForm {
    pub fn new<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Evaluator, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = EvalResult<String>> + Send + 'static,
    {
        Self { name: name.into(), op: boxed(f) }
    }
}

/// How the checker decided a form's command resolves.
#[derive(Clone)]
pub enum Dispatch {
    Builtin(BuiltinFunction),
    Special(SpecialForm),
    /// User-defined function, stored in scope under the function prefix.
    Defined,
    /// The command value is itself a closure.
    Closure,
    /// Executable found through the path resolver.
    External,
}

/// The resolved command of a form.
#[derive(Clone)]
pub enum Command {
    Builtin(BuiltinFunction),
    Special(SpecialForm),
    Closure(Arc<Closure>),
    External(PathBuf),
}

impl Command {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Command::Builtin(_) => "builtin",
            Command::Special(_) => "special",
            Command::Closure(_) => "closure",
            Command::External(_) => "external",
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Builtin(b) => write!(f, "Builtin({})", b.name),
            Command::Special(s) => write!(f, "Special({})", s.name),
            Command::Closure(c) => f.debug_tuple("Closure").field(c).finish(),
            Command::External(path) => f.debug_tuple("External").field(path).finish(),
        }
    }
}

/// One ready-to-run stage.
#[derive(Debug, Clone)]
pub struct Form {
    pub span: Span,
    pub name: String,
    pub command: Command,
    pub args: Vec<Value>,
    pub input: Port,
    pub output: Port,
}

/// Runs forms. Must return promptly; the work continues behind the handle.
#[async_trait]
pub trait FormExecutor: Send + Sync {
    async fn exec_form(&self, form: Form, ev: Evaluator) -> EvalResult<StageHandle>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("{0}: command not found")]
    NotFound(String),
}

/// Finds external executables by name.
pub trait PathResolver: Send + Sync {
    fn search(&self, name: &str) -> Result<PathBuf, ResolveError>;
}

/// Everything the checker and compiler supply for one form.
#[derive(Clone)]
pub struct FormParts {
    pub span: Span,
    pub command: ValuesOp,
    pub args: Option<ValuesOp>,
    pub stdin: Option<PortOp>,
    pub stdout: Option<PortOp>,
    pub dispatch: Dispatch,
}

impl FormParts {
    pub fn new(span: Span, command: ValuesOp, dispatch: Dispatch) -> Self {
        Self { span, command, args: None, stdin: None, stdout: None, dispatch }
    }

    pub fn args(mut self, args: ValuesOp) -> Self {
        self.args = Some(args);
        self
    }

    pub fn stdin(mut self, op: PortOp) -> Self {
        self.stdin = Some(op);
        self
    }

    pub fn stdout(mut self, op: PortOp) -> Self {
        self.stdout = Some(op);
        self
    }
}

/// Compile a form into a stage operation.
pub fn form(parts: FormParts) -> StageOp {
    let parts = Arc::new(parts);
    stage_op(move |ev| {
        let parts = parts.clone();
        async move { launch_form(&parts, ev).await }
    })
}

async fn launch_form(parts: &FormParts, mut ev: Evaluator) -> EvalResult<StageHandle> {
    let values = (parts.command)(ev.clone()).await?;
    let head = match <[Value; 1]>::try_from(values) {
        Ok([head]) => head,
        Err(values) => return Err(defect(Defect::CommandArity(values.len()))),
    };
    let name = head.to_string();

    let args = match &parts.args {
        Some(op) => op(ev.clone()).await?,
        None => Vec::new(),
    };

    let input = match &parts.stdin {
        Some(op) => Some(op(&ev)?),
        None => None,
    };
    let output = match &parts.stdout {
        Some(op) => Some(op(&ev)?),
        None => None,
    };
    if let Some(port) = input {
        ev.input = port;
    }
    if let Some(port) = output {
        ev.output = port;
    }

    let command = resolve(parts.span, &parts.dispatch, head, &name, &ev)?;
    dispatch_form(
        Form {
            span: parts.span,
            name,
            command,
            args,
            input: ev.input.clone(),
            output: ev.output.clone(),
        },
        ev,
    )
    .await
}

#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(command = %form.name, kind = form.command.kind_name())
)]
async fn dispatch_form(form: Form, ev: Evaluator) -> EvalResult<StageHandle> {
    let executor = ev.executor().clone();
    executor.exec_form(form, ev).await
}

fn resolve(
    span: Span,
    dispatch: &Dispatch,
    head: Value,
    name: &str,
    ev: &Evaluator,
) -> EvalResult<Command> {
    match dispatch {
        Dispatch::Builtin(builtin) => Ok(Command::Builtin(builtin.clone())),
        Dispatch::Special(special) => Ok(Command::Special(special.clone())),
        Dispatch::Defined => {
            let key = format!("{}{}", ev.config().function_prefix, name);
            match ev.scope.get(&key) {
                Some(Value::Closure(closure)) => Ok(Command::Closure(closure)),
                Some(_) => Err(defect(Defect::NotAClosure(key))),
                None => Err(defect(Defect::UnresolvedFunction(name.to_string()))),
            }
        }
        Dispatch::Closure => match head {
            Value::Closure(closure) => Ok(Command::Closure(closure)),
            _ => Err(defect(Defect::NotAClosure(name.to_string()))),
        },
        Dispatch::External => {
            let path = ev
                .resolver()
                .search(name)
                .map_err(|e| EvalError::user(span, e.to_string()))?;
            tracing::debug!(executable = %path.display(), "resolved external command");
            Ok(Command::External(path))
        }
    }
}
