//! Interpreter module for sluice.
//!
//! This module provides the value-level half of the execution core: scopes,
//! the evaluator context, and the combinators that compile checked syntax
//! into operations.
//!
//! # Architecture
//!
//! - **Scope**: name to shared slot, aliased by closures that capture it
//! - **Evaluator**: scope plus ports plus collaborators, cloned per stage
//! - **Ops**: literals, variables, terms, term lists and chunks
//! - **Table** / **Closure**: the composite literals
//!
//! Pipelines, forms and output capture live in [`crate::scheduler`] and
//! [`crate::dispatch`], since they wire ports rather than combine values.

mod closure;
mod evaluator;
mod ops;
mod scope;
mod table;

pub use closure::{closure, Closure, ARGS_VAR};
pub use evaluator::{Evaluator, StatusCallback};
pub use ops::{
    adjoin, chunk, literal, stage_op, string, term, term_list, values_op, var, ChunkOp, PortOp,
    StageOp, ValuesOp,
};
pub use scope::{Scope, Slot};
pub use table::table;
