//! Stream kinds and the shape contracts that constrain them.
//!
//! A *kind* describes what a port physically is. A *shape* describes what a
//! stage or pipeline needs from a port. The checker decides both ahead of
//! time; the kernel only instantiates kinds and checks shapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Physical kind of a port or of a pipeline junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// Discarded. No data flows.
    Unused,
    /// OS byte stream (pipe or inherited descriptor).
    Fd,
    /// In-process channel of values.
    Chan,
}

/// Requirement placed on one side of a stage or pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamShape {
    /// The side is never touched, so any port will do.
    #[default]
    Unused,
    /// Needs a byte stream.
    Fd,
    /// Needs a value channel.
    Chan,
    /// Works with a byte stream or a value channel, but needs one of them.
    Either,
}

impl StreamShape {
    /// Whether a port of `kind` satisfies this requirement.
    pub fn admits(self, kind: StreamKind) -> bool {
        match self {
            StreamShape::Unused => true,
            StreamShape::Fd => kind == StreamKind::Fd,
            StreamShape::Chan => kind == StreamKind::Chan,
            StreamShape::Either => kind != StreamKind::Unused,
        }
    }
}

/// Input/output shape pair declared for a pipeline or closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub input: StreamShape,
    pub output: StreamShape,
}

impl Bounds {
    pub fn new(input: StreamShape, output: StreamShape) -> Self {
        Self { input, output }
    }

    /// Bounds that accept any ports.
    pub fn unconstrained() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stream {what}: {text}")]
pub struct ParseStreamError {
    what: &'static str,
    text: String,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StreamKind::Unused => "unused",
            StreamKind::Fd => "fd",
            StreamKind::Chan => "chan",
        })
    }
}

impl FromStr for StreamKind {
    type Err = ParseStreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unused" => Ok(StreamKind::Unused),
            "fd" => Ok(StreamKind::Fd),
            "chan" => Ok(StreamKind::Chan),
            other => Err(ParseStreamError { what: "kind", text: other.to_string() }),
        }
    }
}

impl fmt::Display for StreamShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StreamShape::Unused => "unused",
            StreamShape::Fd => "fd",
            StreamShape::Chan => "chan",
            StreamShape::Either => "either",
        })
    }
}

impl FromStr for StreamShape {
    type Err = ParseStreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unused" => Ok(StreamShape::Unused),
            "fd" => Ok(StreamShape::Fd),
            "chan" => Ok(StreamShape::Chan),
            "either" => Ok(StreamShape::Either),
            other => Err(ParseStreamError { what: "shape", text: other.to_string() }),
        }
    }
}
