//! Provider gateway contract.
//!
//! The orchestrator core is agnostic to how stack operations reach the
//! remote system; it only consumes this trait. The shipped
//! implementation shells out to the AWS CLI (`aws_cli` submodule); tests
//! substitute scripted fakes.

pub mod aws_cli;

pub use aws_cli::AwsCliGateway;

use crate::errors::GatewayError;
use crate::stack::StackOperation;
use async_trait::async_trait;
use std::time::Duration;

/// Handle returned by a successful create/update call.
///
/// Carries at least the remote identifier used for correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackHandle {
    pub remote_id: String,
}

impl StackHandle {
    pub fn new(remote_id: impl Into<String>) -> Self {
        Self {
            remote_id: remote_id.into(),
        }
    }
}

/// Terminal-success condition to poll for.
///
/// Each lifecycle action carries its condition as data; the gateway
/// maps it onto whatever the provider calls that state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    CreateComplete,
    UpdateComplete,
    DeleteComplete,
}

impl WaitCondition {
    /// Provider-side waiter name (CloudFormation vocabulary).
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitCondition::CreateComplete => "stack-create-complete",
            WaitCondition::UpdateComplete => "stack-update-complete",
            WaitCondition::DeleteComplete => "stack-delete-complete",
        }
    }
}

/// Poll interval and attempt budget for a completion wait.
///
/// Defaults bound each operation to roughly ten minutes: a 5-second
/// interval with 120 attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSettings {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_attempts: 120,
        }
    }
}

impl WaitSettings {
    pub fn new(poll_interval: Duration, max_attempts: u32) -> Self {
        Self {
            poll_interval,
            max_attempts,
        }
    }
}

/// The four provider operations the core requires, plus template
/// validation for capability discovery.
///
/// Implementations must be safe for concurrent independent calls: one
/// shared gateway serves every sequence worker at once.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Submit a stack creation. Returns the remote handle on acceptance.
    async fn create(&self, op: &StackOperation) -> Result<StackHandle, GatewayError>;

    /// Submit a stack update. Returns the remote handle on acceptance.
    async fn update(&self, op: &StackOperation) -> Result<StackHandle, GatewayError>;

    /// Submit a stack deletion by name.
    async fn delete(&self, name: &str) -> Result<(), GatewayError>;

    /// Block the calling task until `name` reaches the terminal state
    /// for `condition`, the remote reports terminal failure, or the
    /// attempt budget runs out. Must sleep `settings.poll_interval`
    /// between attempts, never busy-spin.
    async fn wait(
        &self,
        condition: WaitCondition,
        name: &str,
        settings: WaitSettings,
    ) -> Result<(), GatewayError>;

    /// Validate a template body and report the capabilities the remote
    /// system requires to accept it. Empty means none.
    async fn validate(&self, template_body: &str) -> Result<Vec<String>, GatewayError>;
}
