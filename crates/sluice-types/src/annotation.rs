//! Facts computed by the static checker.
//!
//! The kernel trusts these. Missing or inconsistent annotations are internal
//! defects, never user errors.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::shape::{Bounds, StreamKind};

/// Per-pipeline facts: the overall shape and one stream kind per junction.
///
/// `internals[i]` connects stage `i` to stage `i + 1`, so a pipeline of `n`
/// stages carries `n - 1` entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineAnnotation {
    pub bounds: Bounds,
    pub internals: Vec<StreamKind>,
}

impl PipelineAnnotation {
    pub fn new(bounds: Bounds, internals: Vec<StreamKind>) -> Self {
        Self { bounds, internals }
    }
}

/// Per-closure facts: the free variables to capture and the stream shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClosureAnnotation {
    pub enclosed: BTreeSet<String>,
    pub bounds: Bounds,
}

impl ClosureAnnotation {
    pub fn new<I, S>(enclosed: I, bounds: Bounds) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enclosed: enclosed.into_iter().map(Into::into).collect(),
            bounds,
        }
    }
}
