//! Completion handles for launched pipeline stages.
//!
//! A stage reports through a [`StatusSender`]; whoever launched it holds the
//! matching [`StageHandle`]. The stage may report any number of updates. The
//! handle completes when every sender is dropped, and its result is the last
//! update received.

use sluice_types::StateUpdate;
use tokio::sync::mpsc;

/// Reporting side, held by the running stage.
///
/// Unbounded so that a stage never blocks on reporting while the launcher is
/// still draining an earlier stage.
#[derive(Debug, Clone)]
pub struct StatusSender {
    tx: mpsc::UnboundedSender<StateUpdate>,
}

impl StatusSender {
    /// Report an update. Ignored if the handle has been dropped.
    pub fn emit(&self, update: StateUpdate) {
        let _ = self.tx.send(update);
    }
}

/// Launcher side: resolves to the stage's final update.
#[derive(Debug)]
pub struct StageHandle {
    updates: mpsc::UnboundedReceiver<StateUpdate>,
}

/// Create a connected reporter/handle pair.
pub fn stage_channel() -> (StatusSender, StageHandle) {
    let (tx, updates) = mpsc::unbounded_channel();
    (StatusSender { tx }, StageHandle { updates })
}

impl StageHandle {
    /// A handle for a stage that has already finished with `update`.
    pub fn finished(update: StateUpdate) -> Self {
        let (status, handle) = stage_channel();
        status.emit(update);
        handle
    }

    /// Wait for the stage to finish; `None` if it never reported.
    pub async fn finish(mut self) -> Option<StateUpdate> {
        let mut last = None;
        while let Some(update) = self.updates.recv().await {
            last = Some(update);
        }
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn keeps_only_the_last_update() {
        let (status, handle) = stage_channel();
        tokio::spawn(async move {
            status.emit(StateUpdate::new("starting"));
            tokio::time::sleep(Duration::from_millis(5)).await;
            status.emit(StateUpdate::new("exited 3"));
        });
        assert_eq!(handle.finish().await, Some(StateUpdate::new("exited 3")));
    }

    #[tokio::test]
    async fn silent_stage_yields_none() {
        let (status, handle) = stage_channel();
        drop(status);
        assert_eq!(handle.finish().await, None);
    }

    #[tokio::test]
    async fn finished_handle_resolves_immediately() {
        let handle = StageHandle::finished(StateUpdate::ok());
        assert_eq!(handle.finish().await, Some(StateUpdate::ok()));
    }

    #[tokio::test]
    async fn waits_for_every_sender_clone() {
        let (status, handle) = stage_channel();
        let late = status.clone();
        drop(status);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            late.emit(StateUpdate::new("late"));
        });
        assert_eq!(handle.finish().await, Some(StateUpdate::new("late")));
    }
}
