//! Sequence runner — serial execution of one ordered stack sequence.
//!
//! Forward runs (create/update) walk the sequence front to back;
//! teardown walks it back to front and deletes. Either way the first
//! failure stops the sequence: the failing operation is marked
//! `Failed`, every operation that would have run after it is marked
//! `Skipped`, and nothing else is attempted. Sibling sequences are
//! unaffected.

use crate::events::{EventKind, EventSender, emit};
use crate::gateway::{ProviderGateway, WaitCondition, WaitSettings};
use crate::orchestrator::{Action, ApplyKind};
use crate::stack::{OpStatus, StackOperation};
use std::sync::Arc;
use tracing::{error, info};

/// Run one sequence to completion or first failure, mutating operation
/// state in place and returning the sequence.
///
/// `seq_index` identifies the sequence in progress events; it carries
/// no ordering meaning.
pub async fn run_sequence(
    gateway: Arc<dyn ProviderGateway>,
    mut sequence: Vec<StackOperation>,
    action: Action,
    settings: WaitSettings,
    seq_index: usize,
    events: Option<EventSender>,
) -> Vec<StackOperation> {
    // Teardown visits operations in reverse dependency order.
    let order: Vec<usize> = match action {
        Action::Apply(_) => (0..sequence.len()).collect(),
        Action::Remove => (0..sequence.len()).rev().collect(),
    };

    for (visited, &i) in order.iter().enumerate() {
        let outcome = match action {
            Action::Apply(kind) => {
                apply_one(&*gateway, &mut sequence[i], kind, settings, seq_index, &events).await
            }
            Action::Remove => {
                remove_one(&*gateway, &mut sequence[i], settings, seq_index, &events).await
            }
        };

        if let Err(reason) = outcome {
            sequence[i].status = OpStatus::Failed {
                reason: reason.clone(),
            };
            error!(
                sequence = seq_index,
                stack = %sequence[i].name,
                %reason,
                "sequence aborted"
            );
            emit(
                &events,
                EventKind::OperationFailed {
                    sequence: seq_index,
                    name: sequence[i].name.clone(),
                    verb: action.verb().to_string(),
                    error: reason,
                },
            )
            .await;

            // Everything that would have run after the failure point is
            // left untouched apart from an explicit Skipped marker.
            for &j in &order[visited + 1..] {
                sequence[j].status = OpStatus::Skipped;
            }
            break;
        }
    }

    let (completed, failed, skipped) = tally(&sequence);
    emit(
        &events,
        EventKind::SequenceFinished {
            sequence: seq_index,
            completed,
            failed,
            skipped,
        },
    )
    .await;

    sequence
}

/// Create or update one stack and wait for its terminal state.
async fn apply_one(
    gateway: &dyn ProviderGateway,
    op: &mut StackOperation,
    kind: ApplyKind,
    settings: WaitSettings,
    seq_index: usize,
    events: &Option<EventSender>,
) -> Result<(), String> {
    let handle = match kind {
        ApplyKind::Create => gateway.create(op).await,
        ApplyKind::Update => gateway.update(op).await,
    }
    .map_err(|e| e.to_string())?;

    op.remote_id = Some(handle.remote_id);
    op.status = OpStatus::InFlight;
    info!(sequence = seq_index, stack = %op.name, "{} is being {}", op.name, kind.verb());
    emit(
        events,
        EventKind::OperationStarted {
            sequence: seq_index,
            name: op.name.clone(),
            verb: kind.verb().to_string(),
        },
    )
    .await;

    gateway
        .wait(kind.wait_condition(), &op.name, settings)
        .await
        .map_err(|e| e.to_string())?;

    op.status = OpStatus::Complete;
    info!(sequence = seq_index, stack = %op.name, "{} is {}", op.name, kind.verb());
    emit(
        events,
        EventKind::OperationSucceeded {
            sequence: seq_index,
            name: op.name.clone(),
            verb: kind.verb().to_string(),
        },
    )
    .await;

    Ok(())
}

/// Delete one stack by name and wait until it is gone.
async fn remove_one(
    gateway: &dyn ProviderGateway,
    op: &mut StackOperation,
    settings: WaitSettings,
    seq_index: usize,
    events: &Option<EventSender>,
) -> Result<(), String> {
    gateway.delete(&op.name).await.map_err(|e| e.to_string())?;

    op.status = OpStatus::InFlight;
    info!(sequence = seq_index, stack = %op.name, "{} is being deleted", op.name);
    emit(
        events,
        EventKind::OperationStarted {
            sequence: seq_index,
            name: op.name.clone(),
            verb: "deleted".to_string(),
        },
    )
    .await;

    gateway
        .wait(WaitCondition::DeleteComplete, &op.name, settings)
        .await
        .map_err(|e| e.to_string())?;

    op.remote_id = None;
    op.status = OpStatus::Complete;
    info!(sequence = seq_index, stack = %op.name, "{} is deleted", op.name);
    emit(
        events,
        EventKind::OperationSucceeded {
            sequence: seq_index,
            name: op.name.clone(),
            verb: "deleted".to_string(),
        },
    )
    .await;

    Ok(())
}

fn tally(sequence: &[StackOperation]) -> (usize, usize, usize) {
    let mut completed = 0;
    let mut failed = 0;
    let mut skipped = 0;
    for op in sequence {
        match op.status {
            OpStatus::Complete => completed += 1,
            OpStatus::Failed { .. } => failed += 1,
            OpStatus::Skipped => skipped += 1,
            OpStatus::Pending | OpStatus::InFlight => {}
        }
    }
    (completed, failed, skipped)
}
