//! sluice-kernel: the execution core of the sluice shell language.
//!
//! This crate provides:
//!
//! - **Values**: strings, ints, lists, tables and closures, with caret adjoin
//! - **Interpreter**: scopes of shared slots, the evaluator context, and the
//!   combinators that compile checked syntax into operations
//! - **Scheduler**: ports, concurrent pipeline execution and output capture
//! - **Dispatch**: resolving a form's command and handing it to an executor
//! - **Executor**: the in-process form executor
//! - **Paths**: `PATH`-style executable lookup
//!
//! Parsing and static checking happen upstream; the checker's annotations
//! arrive as [`sluice_types`] data and are trusted.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod interpreter;
pub mod kernel;
pub mod paths;
pub mod scheduler;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use config::KernelConfig;
pub use dispatch::{
    form, BuiltinFunction, Command, Dispatch, Form, FormExecutor, FormParts, PathResolver,
    ResolveError, SpecialForm,
};
pub use error::{Defect, EvalError, EvalResult};
pub use executor::{LocalExecutor, ProcessLauncher};
pub use kernel::Kernel;
pub use paths::SearchPath;
pub use value::{Table, Value};

pub use sluice_types as types;
