//! Completion updates emitted by running pipeline stages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A status message from a stage.
///
/// A stage may emit any number of updates before it finishes; only the last
/// one counts as the stage's exit value. The empty message means success.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateUpdate {
    pub msg: String,
}

impl StateUpdate {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }

    /// The success update.
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn is_ok(&self) -> bool {
        self.msg.is_empty()
    }
}

impl fmt::Display for StateUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}
