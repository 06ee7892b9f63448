//! Stack operation data model.
//!
//! This module provides:
//! - `StackOperation` — one stack's desired lifecycle action
//! - `Parameter` — a key/value template parameter
//! - `OpStatus` — explicit per-operation outcome, mutated by the runner
//!
//! A *sequence* is an ordered `Vec<StackOperation>`; index order is the
//! hard dependency order. A *run* is a `Vec` of such sequences with no
//! cross-sequence ordering.

use serde::{Deserialize, Serialize};

/// A single key/value template parameter.
///
/// Parameters are kept as an ordered list rather than a map: insertion
/// order carries no semantics but is preserved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub key: String,
    pub value: String,
}

impl Parameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Outcome of one stack operation within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OpStatus {
    /// Not yet attempted.
    Pending,
    /// Provider call accepted; waiting for the terminal state.
    InFlight,
    /// Reached the terminal success state.
    Complete,
    /// Provider call rejected, wait timed out, or remote terminal failure.
    Failed { reason: String },
    /// Never attempted because an earlier operation in its sequence failed.
    Skipped,
}

impl OpStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, OpStatus::Failed { .. })
    }
}

/// Represents one stack's desired lifecycle action: the name used to
/// correlate with the remote system, the resolved template body, and
/// the inputs the provider needs to accept it.
///
/// Constructed by the caller, mutated in place by the sequence runner
/// (gains `remote_id` on a successful create/update, loses it on a
/// successful delete), and returned for inspection afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackOperation {
    /// Stack name, unique across the whole run (not just its sequence).
    pub name: String,
    /// Opaque serialized template, already resolved before the run.
    pub template_body: String,
    /// Ordered template parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Acknowledgement flags the remote system requires to accept the
    /// template (e.g. `CAPABILITY_IAM`). Empty means none needed.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Remote identifier. Present iff the last completed operation on
    /// this entity was a create/update with no completed delete after it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    /// Explicit outcome for this operation in the current run.
    #[serde(default = "default_status")]
    pub status: OpStatus,
}

fn default_status() -> OpStatus {
    OpStatus::Pending
}

impl StackOperation {
    /// Create a new operation with the given name and template body.
    pub fn new(name: &str, template_body: &str) -> Self {
        Self {
            name: name.to_string(),
            template_body: template_body.to_string(),
            parameters: Vec::new(),
            capabilities: Vec::new(),
            remote_id: None,
            status: OpStatus::Pending,
        }
    }

    /// Create a new operation with parameters and capabilities.
    pub fn with_inputs(
        name: &str,
        template_body: &str,
        parameters: Vec<Parameter>,
        capabilities: Vec<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            template_body: template_body.to_string(),
            parameters,
            capabilities,
            remote_id: None,
            status: OpStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_operation_starts_pending_without_remote_id() {
        let op = StackOperation::new("web-git", "Resources: {}");
        assert_eq!(op.status, OpStatus::Pending);
        assert!(op.remote_id.is_none());
        assert!(op.capabilities.is_empty());
    }

    #[test]
    fn with_inputs_preserves_parameter_order() {
        let op = StackOperation::with_inputs(
            "web-build",
            "Resources: {}",
            vec![
                Parameter::new("ProjectName", "web-build"),
                Parameter::new("BranchName", "main"),
            ],
            vec!["CAPABILITY_IAM".to_string()],
        );
        assert_eq!(op.parameters[0].key, "ProjectName");
        assert_eq!(op.parameters[1].key, "BranchName");
        assert_eq!(op.capabilities, vec!["CAPABILITY_IAM"]);
    }

    #[test]
    fn op_status_failed_is_detectable() {
        let status = OpStatus::Failed {
            reason: "rejected".to_string(),
        };
        assert!(status.is_failed());
        assert!(!OpStatus::Complete.is_failed());
        assert!(!OpStatus::Skipped.is_failed());
    }

    #[test]
    fn operation_round_trips_through_serde() {
        let mut op = StackOperation::new("api", "{}");
        op.remote_id = Some("arn:aws:cloudformation:stack/api/123".to_string());
        op.status = OpStatus::Complete;
        let json = serde_json::to_string(&op).unwrap();
        let back: StackOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn missing_status_defaults_to_pending() {
        let json = r#"{"name":"api","template_body":"{}"}"#;
        let op: StackOperation = serde_json::from_str(json).unwrap();
        assert_eq!(op.status, OpStatus::Pending);
    }
}
