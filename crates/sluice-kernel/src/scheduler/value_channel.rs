//! Unbuffered value channel between two in-process stages.
//!
//! A send completes only once the receiver has taken the value, so a
//! producer never runs ahead of its consumer:
//!
//! ```text
//!   ValueSender ──(value, ack)──▶ mpsc(1) ──▶ ValueReceiver
//!        ▲                                         │
//!        └───────────── oneshot ack ◀──────────────┘
//! ```
//!
//! Dropping every sender closes the channel; the receiver then yields `None`.
//! Dropping the receiver makes pending and future sends fail.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value channel closed")]
pub struct ChannelClosed;

struct Envelope {
    value: Value,
    ack: oneshot::Sender<()>,
}

/// Writing end. Clones feed the same channel.
#[derive(Clone)]
pub struct ValueSender {
    tx: mpsc::Sender<Envelope>,
}

/// Reading end. Clones share one receiver and take turns.
#[derive(Clone)]
pub struct ValueReceiver {
    rx: Arc<Mutex<mpsc::Receiver<Envelope>>>,
}

/// Create a connected sender/receiver pair.
pub fn value_channel() -> (ValueSender, ValueReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (
        ValueSender { tx },
        ValueReceiver { rx: Arc::new(Mutex::new(rx)) },
    )
}

impl ValueSender {
    /// Hand `value` to the receiver, waiting until it has been taken.
    pub async fn send(&self, value: Value) -> Result<(), ChannelClosed> {
        let (ack, acked) = oneshot::channel();
        self.tx
            .send(Envelope { value, ack })
            .await
            .map_err(|_| ChannelClosed)?;
        acked.await.map_err(|_| ChannelClosed)
    }
}

impl ValueReceiver {
    /// Take the next value, or `None` once every sender is gone.
    pub async fn recv(&self) -> Option<Value> {
        let envelope = self.rx.lock().await.recv().await?;
        // The sender may have given up waiting; the value is still delivered.
        let _ = envelope.ack.send(());
        tracing::trace!(kind = envelope.value.kind_name(), "value received");
        Some(envelope.value)
    }
}

impl std::fmt::Debug for ValueSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueSender").finish()
    }
}

impl std::fmt::Debug for ValueReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueReceiver").finish()
    }
}
