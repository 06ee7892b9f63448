//! Progress events emitted during a run.
//!
//! The orchestrator and sequence runner report through an optional
//! `tokio::sync::mpsc` channel of [`StackEvent`]s; the console UI is
//! one consumer, but the format is serde-friendly so events can just as
//! well be shipped to a log collector.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One timestamped progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackEvent {
    /// When the event was emitted.
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl StackEvent {
    pub fn now(kind: EventKind) -> Self {
        Self {
            at: Utc::now(),
            kind,
        }
    }
}

/// What happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A provider call was accepted; the operation is now in flight
    /// ("X is being created/updated/deleted").
    OperationStarted {
        sequence: usize,
        name: String,
        verb: String,
    },
    /// The operation reached its terminal success state
    /// ("X is created/updated/deleted").
    OperationSucceeded {
        sequence: usize,
        name: String,
        verb: String,
    },
    /// The operation failed; the rest of its sequence is skipped.
    OperationFailed {
        sequence: usize,
        name: String,
        verb: String,
        error: String,
    },
    /// A sequence worker finished, successfully or not.
    SequenceFinished {
        sequence: usize,
        completed: usize,
        failed: usize,
        skipped: usize,
    },
    /// All sequence workers have joined.
    RunFinished {
        sequences: usize,
        failed_operations: usize,
    },
}

/// Sending half of the progress sink, cheap to clone into workers.
pub type EventSender = mpsc::Sender<StackEvent>;

/// Emit an event if a sink is attached, dropping it if the receiver is
/// gone. Progress reporting never fails a run.
pub async fn emit(tx: &Option<EventSender>, kind: EventKind) {
    if let Some(tx) = tx {
        tx.send(StackEvent::now(kind)).await.ok();
    }
}
