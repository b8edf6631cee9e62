//! Source positions attached to user-facing errors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of the syntax node an operation was compiled from.
///
/// Lines and columns are 1-based. `Span::default()` is the detached span used
/// for operations that have no source (embedder-built ops, tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn is_detached(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_detached() {
            f.write_str("<unknown>")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}
