//! Sequence orchestrator — fan-out over independent stack sequences.
//!
//! A run is a set of sequences with no cross-sequence dependencies.
//! [`run_all`] spawns one tokio task per sequence, each executing the
//! serial [`runner::run_sequence`] loop, and joins them all before
//! returning. A failure inside one sequence never cancels a sibling
//! and never fails the join: callers inspect per-operation status on
//! the returned sequences.

pub mod runner;

pub use runner::run_sequence;

use crate::events::{EventKind, EventSender, emit};
use crate::gateway::{ProviderGateway, WaitCondition, WaitSettings};
use crate::stack::StackOperation;
use futures::future::join_all;
use std::sync::Arc;
use tracing::error;

/// Which forward lifecycle call a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyKind {
    Create,
    Update,
}

impl ApplyKind {
    /// Terminal-success condition to await after the call is accepted.
    pub fn wait_condition(&self) -> WaitCondition {
        match self {
            ApplyKind::Create => WaitCondition::CreateComplete,
            ApplyKind::Update => WaitCondition::UpdateComplete,
        }
    }

    /// Past-tense verb used in progress messages.
    pub fn verb(&self) -> &'static str {
        match self {
            ApplyKind::Create => "created",
            ApplyKind::Update => "updated",
        }
    }
}

/// The lifecycle action applied uniformly to every sequence in a run.
///
/// `Remove` walks each sequence in reverse dependency order; the apply
/// kinds walk forward. Each action carries its wait condition and
/// progress verb as data, so the runner never inspects call identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Apply(ApplyKind),
    Remove,
}

impl Action {
    pub fn verb(&self) -> &'static str {
        match self {
            Action::Apply(kind) => kind.verb(),
            Action::Remove => "deleted",
        }
    }
}

/// Run every sequence concurrently and join them all.
///
/// Each sequence is moved into its own task (exclusive ownership — no
/// two workers ever touch the same operation) and handed the shared
/// gateway. Results come back in input order. Returns only after every
/// worker has terminated; the return itself is unconditional, partial
/// failure is visible through operation status and `remote_id`.
pub async fn run_all(
    gateway: Arc<dyn ProviderGateway>,
    sequences: Vec<Vec<StackOperation>>,
    action: Action,
    settings: WaitSettings,
    events: Option<EventSender>,
) -> Vec<Vec<StackOperation>> {
    let mut handles = Vec::with_capacity(sequences.len());
    let mut fallbacks = Vec::with_capacity(sequences.len());
    for (i, sequence) in sequences.into_iter().enumerate() {
        // Untouched fallback in case the worker itself dies; the runner
        // reports operation failures through status, not panics.
        fallbacks.push(sequence.clone());
        let gateway = gateway.clone();
        let events_tx = events.clone();
        handles.push(tokio::spawn(async move {
            runner::run_sequence(gateway, sequence, action, settings, i, events_tx).await
        }));
    }

    // join_all preserves spawn order, so results line up with input.
    let mut results = Vec::with_capacity(handles.len());
    for (i, (joined, fallback)) in join_all(handles).await.into_iter().zip(fallbacks).enumerate() {
        match joined {
            Ok(sequence) => results.push(sequence),
            Err(join_err) => {
                error!(sequence = i, %join_err, "sequence worker died");
                results.push(fallback);
            }
        }
    }

    let failed_operations = count_failed(&results);
    emit(
        &events,
        EventKind::RunFinished {
            sequences: results.len(),
            failed_operations,
        },
    )
    .await;

    results
}

/// Number of operations across all sequences that ended `Failed`.
pub fn count_failed(sequences: &[Vec<StackOperation>]) -> usize {
    sequences
        .iter()
        .flatten()
        .filter(|op| op.status.is_failed())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GatewayError;
    use crate::gateway::StackHandle;
    use crate::stack::OpStatus;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Gateway that accepts everything instantly.
    struct YesGateway;

    #[async_trait]
    impl ProviderGateway for YesGateway {
        async fn create(&self, op: &StackOperation) -> Result<StackHandle, GatewayError> {
            Ok(StackHandle::new(format!("id-{}", op.name)))
        }
        async fn update(&self, op: &StackOperation) -> Result<StackHandle, GatewayError> {
            Ok(StackHandle::new(format!("id-{}", op.name)))
        }
        async fn delete(&self, _name: &str) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn wait(
            &self,
            _condition: WaitCondition,
            _name: &str,
            _settings: WaitSettings,
        ) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn validate(&self, _template_body: &str) -> Result<Vec<String>, GatewayError> {
            Ok(Vec::new())
        }
    }

    fn seq(names: &[&str]) -> Vec<StackOperation> {
        names
            .iter()
            .map(|n| StackOperation::new(n, "Resources: {}"))
            .collect()
    }

    fn fast() -> WaitSettings {
        WaitSettings::new(Duration::from_millis(1), 3)
    }

    #[test]
    fn apply_kind_carries_its_wait_condition() {
        assert_eq!(ApplyKind::Create.wait_condition(), WaitCondition::CreateComplete);
        assert_eq!(ApplyKind::Update.wait_condition(), WaitCondition::UpdateComplete);
        assert_eq!(ApplyKind::Create.verb(), "created");
        assert_eq!(ApplyKind::Update.verb(), "updated");
        assert_eq!(Action::Remove.verb(), "deleted");
    }

    #[tokio::test]
    async fn run_all_preserves_input_order_and_marks_complete() {
        let gateway = Arc::new(YesGateway);
        let sequences = vec![seq(&["a1", "a2"]), seq(&["b1"])];

        let result = run_all(
            gateway,
            sequences,
            Action::Apply(ApplyKind::Create),
            fast(),
            None,
        )
        .await;

        assert_eq!(result.len(), 2);
        assert_eq!(result[0][0].name, "a1");
        assert_eq!(result[0][1].name, "a2");
        assert_eq!(result[1][0].name, "b1");
        for op in result.iter().flatten() {
            assert_eq!(op.status, OpStatus::Complete);
            assert_eq!(op.remote_id.as_deref(), Some(format!("id-{}", op.name).as_str()));
        }
    }

    #[tokio::test]
    async fn run_all_with_no_sequences_returns_empty() {
        let gateway = Arc::new(YesGateway);
        let result = run_all(
            gateway,
            Vec::new(),
            Action::Apply(ApplyKind::Create),
            fast(),
            None,
        )
        .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn teardown_clears_remote_ids() {
        let gateway = Arc::new(YesGateway);
        let mut sequence = seq(&["a1", "a2"]);
        for op in &mut sequence {
            op.remote_id = Some("stale".to_string());
        }

        let result = run_all(gateway, vec![sequence], Action::Remove, fast(), None).await;

        for op in &result[0] {
            assert!(op.remote_id.is_none());
            assert_eq!(op.status, OpStatus::Complete);
        }
    }

    #[test]
    fn count_failed_counts_only_failed() {
        let mut sequences = vec![seq(&["a", "b"]), seq(&["c"])];
        sequences[0][1].status = OpStatus::Failed {
            reason: "boom".to_string(),
        };
        sequences[1][0].status = OpStatus::Skipped;
        assert_eq!(count_failed(&sequences), 1);
    }
}
