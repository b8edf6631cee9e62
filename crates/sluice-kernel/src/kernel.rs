//! The kernel, the embedding entry point.
//!
//! Owns the root evaluator and its collaborators. Compiled operations are run
//! against copies of the root, so every run sees the same root scope.

use std::sync::Arc;

use anyhow::Context;

use crate::config::KernelConfig;
use crate::dispatch::{FormExecutor, PathResolver};
use crate::error::EvalResult;
use crate::executor::LocalExecutor;
use crate::interpreter::{ChunkOp, Evaluator, Scope, StatusCallback, ValuesOp};
use crate::paths::SearchPath;
use crate::scheduler::{FdPort, Port};
use crate::value::Value;

pub struct Kernel {
    name: String,
    root: Evaluator,
}

impl Kernel {
    /// Create a kernel with the local executor and a `PATH` resolver.
    pub fn new(config: KernelConfig) -> anyhow::Result<Self> {
        let resolver = match &config.path {
            Some(path) => SearchPath::new(path),
            None => SearchPath::from_env(),
        };
        Self::with_collaborators(config, Arc::new(LocalExecutor::new()), Arc::new(resolver))
    }

    /// Create a kernel with custom collaborators.
    pub fn with_collaborators(
        config: KernelConfig,
        executor: Arc<dyn FormExecutor>,
        resolver: Arc<dyn PathResolver>,
    ) -> anyhow::Result<Self> {
        let name = config.name.clone();
        let inherit_stdio = config.inherit_stdio;
        let mut root = Evaluator::new(Arc::new(config), executor, resolver);
        if inherit_stdio {
            let input = FdPort::stdin().context("duplicating stdin")?;
            let output = FdPort::stdout().context("duplicating stdout")?;
            root = root.with_ports(Port::Fd(input), Port::Fd(output));
        }
        tracing::debug!(kernel = %name, inherit_stdio, "kernel created");
        Ok(Self { name, root })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The root scope shared by every run.
    pub fn scope(&self) -> &Scope {
        &self.root.scope
    }

    /// A copy of the root evaluator.
    pub fn evaluator(&self) -> Evaluator {
        self.root.clone()
    }

    /// Receive the values of every top-level statement.
    pub fn set_status_callback(&mut self, cb: Option<StatusCallback>) {
        self.root.set_status_callback(cb);
    }

    /// Run a chunk; yields the values of its last statement.
    #[tracing::instrument(level = "info", skip_all, fields(kernel = %self.name))]
    pub async fn run(&self, chunk: &ChunkOp) -> EvalResult<Vec<Value>> {
        chunk(self.root.clone()).await
    }

    /// Evaluate a single value operation.
    pub async fn eval(&self, op: &ValuesOp) -> EvalResult<Vec<Value>> {
        op(self.root.clone()).await
    }
}
