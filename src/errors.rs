//! Typed error hierarchy for the stackpilot orchestrator.
//!
//! Two top-level enums cover the two subsystems:
//! - `GatewayError` — provider calls and completion polling
//! - `ManifestError` — run manifest loading and validation

use thiserror::Error;

/// Errors surfaced by a provider gateway call or a completion wait.
///
/// Any of these aborts the remainder of the sequence the failing
/// operation belongs to; none of them aborts sibling sequences.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The create/update/delete call itself was rejected by the remote
    /// system (validation, permissions, conflict). Not retried.
    #[error("Provider rejected the call: {message}")]
    CallRejected { message: String },

    /// The terminal state was not reached within the attempt budget.
    #[error("Timed out waiting for terminal state after {attempts} attempts")]
    WaitTimeout { attempts: u32 },

    /// The remote system reached a terminal *failure* state while we
    /// were polling (e.g. ROLLBACK_COMPLETE, CREATE_FAILED).
    #[error("Stack reached terminal failure state {status}")]
    RemoteFailure { status: String },

    /// The provider could not be reached at all (subprocess spawn or
    /// I/O trouble).
    #[error("Provider transport error: {0}")]
    Transport(#[source] std::io::Error),

    /// The provider answered with output we could not interpret.
    #[error("Unparseable provider response: {0}")]
    BadResponse(String),
}

/// Errors from loading or validating a run manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest at {path}: {source}")]
    ReadFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest: {0}")]
    ParseFailed(#[from] serde_yaml::Error),

    #[error("No manifest found. Create stackpilot.yaml or pass --manifest")]
    NotFound,

    #[error("Manifest defines no sequences")]
    Empty,

    #[error("Duplicate stack name '{name}' — names must be unique across the whole run")]
    DuplicateName { name: String },

    #[error("Failed to read template at {path}: {source}")]
    TemplateReadFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_error_call_rejected_is_matchable() {
        let err = GatewayError::CallRejected {
            message: "stack already exists".to_string(),
        };
        match &err {
            GatewayError::CallRejected { message } => {
                assert_eq!(message, "stack already exists");
            }
            _ => panic!("Expected CallRejected variant"),
        }
    }

    #[test]
    fn gateway_error_wait_timeout_carries_attempts() {
        let err = GatewayError::WaitTimeout { attempts: 120 };
        match &err {
            GatewayError::WaitTimeout { attempts } => assert_eq!(*attempts, 120),
            _ => panic!("Expected WaitTimeout"),
        }
        assert!(err.to_string().contains("120"));
    }

    #[test]
    fn gateway_error_remote_failure_carries_status() {
        let err = GatewayError::RemoteFailure {
            status: "ROLLBACK_COMPLETE".to_string(),
        };
        assert!(err.to_string().contains("ROLLBACK_COMPLETE"));
    }

    #[test]
    fn manifest_error_duplicate_name_carries_name() {
        let err = ManifestError::DuplicateName {
            name: "web-git".to_string(),
        };
        assert!(err.to_string().contains("web-git"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        let gw = GatewayError::WaitTimeout { attempts: 1 };
        assert_std_error(&gw);
        let mf = ManifestError::Empty;
        assert_std_error(&mf);
    }
}
