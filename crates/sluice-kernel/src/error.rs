//! Errors raised while running operations.
//!
//! There are two classes. User errors carry the span of the syntax that
//! triggered them and abort the enclosing pipeline or form. Defects mean the
//! static checker let something through that it should have rejected; they
//! are never produced by well-checked input and are reported as such.

use sluice_types::Span;
use thiserror::Error;

/// An invariant the static checker was supposed to guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Defect {
    #[error("unresolved variable: {0}")]
    UnresolvedVariable(String),
    #[error("unresolved function: {0}")]
    UnresolvedFunction(String),
    #[error("{0} does not hold a closure")]
    NotAClosure(String),
    #[error("no stream kind for junction {index} of a {stages}-stage pipeline")]
    MissingJunction { index: usize, stages: usize },
    #[error("command evaluated to {0} values, expected exactly one")]
    CommandArity(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A runtime error attributable to the script.
    #[error("{span}: {message}")]
    User { span: Span, message: String },
    /// A checker bug surfaced at run time.
    #[error("internal defect: {0}")]
    Defect(Defect),
}

impl EvalError {
    pub fn user(span: Span, message: impl Into<String>) -> Self {
        EvalError::User { span, message: message.into() }
    }

    pub fn is_defect(&self) -> bool {
        matches!(self, EvalError::Defect(_))
    }

    /// Give a user error raised without a position the span `span`.
    pub fn or_span(self, span: Span) -> Self {
        match self {
            EvalError::User { span: at, message } if at.is_detached() => {
                EvalError::User { span, message }
            }
            other => other,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            EvalError::User { span, .. } => Some(*span),
            EvalError::Defect(_) => None,
        }
    }
}

/// Raise a defect. Always logged, since it points at a bug upstream.
pub fn defect(defect: Defect) -> EvalError {
    tracing::error!(%defect, "checker invariant violated");
    EvalError::Defect(defect)
}

pub type EvalResult<T> = Result<T, EvalError>;
