//! AWS CLI gateway — thin subprocess wrapper over `aws cloudformation`.
//!
//! Every call shells out via `tokio::process::Command` and parses the
//! CLI's JSON output. No orchestration logic lives here; the poll loop
//! in [`AwsCliGateway::wait`] is the only stateful part, and it does
//! nothing beyond sleeping between `describe-stacks` calls.

use crate::errors::GatewayError;
use crate::gateway::{ProviderGateway, StackHandle, WaitCondition, WaitSettings};
use crate::stack::StackOperation;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

/// Gateway backed by the `aws` CLI binary.
///
/// Stateless apart from configuration; safe to share across sequence
/// workers behind an `Arc`.
pub struct AwsCliGateway {
    aws_cmd: String,
    region: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SubmitResponse {
    stack_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeResponse {
    stacks: Vec<StackDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StackDescription {
    stack_status: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
struct ValidateResponse {
    #[serde(default)]
    capabilities: Vec<String>,
}

impl AwsCliGateway {
    pub fn new(region: &str) -> Self {
        Self {
            aws_cmd: std::env::var("AWS_CMD").unwrap_or_else(|_| "aws".to_string()),
            region: region.to_string(),
        }
    }

    /// Run one `aws cloudformation` subcommand and return its stdout.
    ///
    /// A non-zero exit is reported as `CallRejected` carrying the CLI's
    /// stderr, which is where the service's validation and conflict
    /// messages land.
    async fn invoke(&self, args: &[&str]) -> Result<String, GatewayError> {
        let output = Command::new(&self.aws_cmd)
            .arg("cloudformation")
            .args(args)
            .arg("--region")
            .arg(&self.region)
            .arg("--output")
            .arg("json")
            .output()
            .await
            .map_err(GatewayError::Transport)?;

        if !output.status.success() {
            let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GatewayError::CallRejected { message });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Submit a create or update and parse the returned stack id.
    async fn submit(&self, verb: &str, op: &StackOperation) -> Result<StackHandle, GatewayError> {
        let parameters = op
            .parameters
            .iter()
            .map(|p| format!("ParameterKey={},ParameterValue={}", p.key, p.value))
            .collect::<Vec<_>>();

        let mut args = vec![
            verb.to_string(),
            "--stack-name".to_string(),
            op.name.clone(),
            "--template-body".to_string(),
            op.template_body.clone(),
        ];
        if !parameters.is_empty() {
            args.push("--parameters".to_string());
            args.extend(parameters);
        }
        if !op.capabilities.is_empty() {
            args.push("--capabilities".to_string());
            args.extend(op.capabilities.iter().cloned());
        }

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let stdout = self.invoke(&arg_refs).await?;
        let response: SubmitResponse = serde_json::from_str(&stdout)
            .map_err(|e| GatewayError::BadResponse(e.to_string()))?;
        Ok(StackHandle::new(response.stack_id))
    }

    /// Fetch the current stack status, mapping "stack does not exist"
    /// to `Ok(None)` so delete waits can treat it as terminal success.
    async fn describe_status(&self, name: &str) -> Result<Option<String>, GatewayError> {
        match self.invoke(&["describe-stacks", "--stack-name", name]).await {
            Ok(stdout) => {
                let response: DescribeResponse = serde_json::from_str(&stdout)
                    .map_err(|e| GatewayError::BadResponse(e.to_string()))?;
                let status = response
                    .stacks
                    .into_iter()
                    .next()
                    .map(|s| s.stack_status)
                    .ok_or_else(|| {
                        GatewayError::BadResponse("describe-stacks returned no stacks".to_string())
                    })?;
                Ok(Some(status))
            }
            Err(GatewayError::CallRejected { message }) if message.contains("does not exist") => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Classify a reported stack status against the awaited condition.
enum PollOutcome {
    Done,
    Failed(String),
    KeepWaiting,
}

fn classify(condition: WaitCondition, status: Option<&str>) -> PollOutcome {
    let Some(status) = status else {
        // Stack no longer exists. Terminal success for deletes, terminal
        // failure for everything else.
        return match condition {
            WaitCondition::DeleteComplete => PollOutcome::Done,
            _ => PollOutcome::Failed("DELETE_COMPLETE".to_string()),
        };
    };

    let success = match condition {
        WaitCondition::CreateComplete => "CREATE_COMPLETE",
        WaitCondition::UpdateComplete => "UPDATE_COMPLETE",
        WaitCondition::DeleteComplete => "DELETE_COMPLETE",
    };
    if status == success {
        return PollOutcome::Done;
    }
    // Any failed or rolled-back state is terminal; everything else is
    // still in progress.
    if status.ends_with("_FAILED") || status.ends_with("ROLLBACK_COMPLETE") {
        return PollOutcome::Failed(status.to_string());
    }
    PollOutcome::KeepWaiting
}

#[async_trait]
impl ProviderGateway for AwsCliGateway {
    async fn create(&self, op: &StackOperation) -> Result<StackHandle, GatewayError> {
        self.submit("create-stack", op).await
    }

    async fn update(&self, op: &StackOperation) -> Result<StackHandle, GatewayError> {
        self.submit("update-stack", op).await
    }

    async fn delete(&self, name: &str) -> Result<(), GatewayError> {
        self.invoke(&["delete-stack", "--stack-name", name])
            .await
            .map(|_| ())
    }

    async fn wait(
        &self,
        condition: WaitCondition,
        name: &str,
        settings: WaitSettings,
    ) -> Result<(), GatewayError> {
        for attempt in 1..=settings.max_attempts {
            let status = self.describe_status(name).await?;
            match classify(condition, status.as_deref()) {
                PollOutcome::Done => return Ok(()),
                PollOutcome::Failed(status) => {
                    return Err(GatewayError::RemoteFailure { status });
                }
                PollOutcome::KeepWaiting => {
                    if attempt < settings.max_attempts {
                        tokio::time::sleep(settings.poll_interval).await;
                    }
                }
            }
        }
        Err(GatewayError::WaitTimeout {
            attempts: settings.max_attempts,
        })
    }

    async fn validate(&self, template_body: &str) -> Result<Vec<String>, GatewayError> {
        let stdout = self
            .invoke(&["validate-template", "--template-body", template_body])
            .await?;
        let response: ValidateResponse = serde_json::from_str(&stdout)
            .map_err(|e| GatewayError::BadResponse(e.to_string()))?;
        Ok(response.capabilities)
    }
}
