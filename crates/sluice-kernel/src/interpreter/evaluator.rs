//! The per-invocation execution context.

use std::fmt;
use std::sync::Arc;

use crate::config::KernelConfig;
use crate::dispatch::{FormExecutor, PathResolver};
use crate::scheduler::Port;
use crate::value::Value;

use super::scope::Scope;

/// Called with the values of each top-level statement of a chunk.
pub type StatusCallback = Arc<dyn Fn(&[Value]) + Send + Sync>;

/// Execution state an operation runs against.
///
/// Cloning is shallow: the clone shares the scope and the collaborators, but
/// its port fields can be reassigned without affecting the original. Pipeline
/// stages and closure invocations each run on such a clone.
#[derive(Clone)]
pub struct Evaluator {
    pub scope: Scope,
    pub input: Port,
    pub output: Port,
    status_cb: Option<StatusCallback>,
    executor: Arc<dyn FormExecutor>,
    resolver: Arc<dyn PathResolver>,
    config: Arc<KernelConfig>,
}

impl Evaluator {
    /// Create a root evaluator with an empty scope and unused ports.
    pub fn new(
        config: Arc<KernelConfig>,
        executor: Arc<dyn FormExecutor>,
        resolver: Arc<dyn PathResolver>,
    ) -> Self {
        Self {
            scope: Scope::new(),
            input: Port::Unused,
            output: Port::Unused,
            status_cb: None,
            executor,
            resolver,
            config,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_ports(mut self, input: Port, output: Port) -> Self {
        self.input = input;
        self.output = output;
        self
    }

    pub fn set_status_callback(&mut self, cb: Option<StatusCallback>) {
        self.status_cb = cb;
    }

    /// Report a statement's values to the status callback, if one is set.
    pub fn report_status(&self, values: &[Value]) {
        if let Some(cb) = &self.status_cb {
            cb(values);
        }
    }

    pub fn executor(&self) -> &Arc<dyn FormExecutor> {
        &self.executor
    }

    pub fn resolver(&self) -> &Arc<dyn PathResolver> {
        &self.resolver
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("scope", &self.scope.names())
            .field("input", &self.input.kind())
            .field("output", &self.output.kind())
            .field("status_cb", &self.status_cb.is_some())
            .finish()
    }
}
