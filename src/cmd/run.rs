//! Lifecycle commands — `stackpilot deploy`, `update`, and `teardown`.

use anyhow::Result;
use dialoguer::Confirm;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::super::Cli;
use stackpilot::config::Config;
use stackpilot::gateway::{AwsCliGateway, ProviderGateway};
use stackpilot::orchestrator::{self, Action, ApplyKind};
use stackpilot::resolver;
use stackpilot::stack::StackOperation;
use stackpilot::ui::DeployUI;

/// Which forward lifecycle the CLI asked for.
#[derive(Debug, Clone, Copy)]
pub enum Lifecycle {
    Deploy,
    Update,
}

pub async fn run_lifecycle(cli: &Cli, project_dir: PathBuf, lifecycle: Lifecycle) -> Result<()> {
    let action = match lifecycle {
        Lifecycle::Deploy => Action::Apply(ApplyKind::Create),
        Lifecycle::Update => Action::Apply(ApplyKind::Update),
    };

    let config = Config::new(project_dir, cli.verbose, cli.manifest.clone())?;
    let gateway: Arc<dyn ProviderGateway> = Arc::new(AwsCliGateway::new(config.region()));

    // Resolve every template before anything is submitted, so a bad
    // template fails the run up front instead of mid-sequence.
    let sequences =
        resolver::resolve_run(&*gateway, config.manifest(), &config.template_base()).await?;

    execute(gateway, sequences, action, &config).await
}

pub async fn run_teardown(cli: &Cli, project_dir: PathBuf, yes: bool) -> Result<()> {
    let config = Config::new(project_dir, cli.verbose, cli.manifest.clone())?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all {} stacks in {}?",
                config.manifest().stack_count(),
                config.region()
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Teardown cancelled");
            return Ok(());
        }
    }

    // Deletes correlate by stack name only; template bodies are not
    // read or validated for a teardown.
    let sequences: Vec<Vec<StackOperation>> = config
        .manifest()
        .sequences
        .iter()
        .map(|defs| {
            defs.iter()
                .map(|d| StackOperation::new(&d.name, ""))
                .collect()
        })
        .collect();

    let gateway: Arc<dyn ProviderGateway> = Arc::new(AwsCliGateway::new(config.region()));
    execute(gateway, sequences, Action::Remove, &config).await
}

/// Fan the sequences out through the orchestrator with a live UI, then
/// translate partial failure into a non-zero exit for shell callers.
async fn execute(
    gateway: Arc<dyn ProviderGateway>,
    sequences: Vec<Vec<StackOperation>>,
    action: Action,
    config: &Config,
) -> Result<()> {
    let sizes: Vec<usize> = sequences.iter().map(Vec::len).collect();
    let ui = DeployUI::new(&sizes, config.verbose);
    let (tx, rx) = mpsc::channel(100);
    let ui_task = tokio::spawn(ui.consume(rx));

    let results = orchestrator::run_all(
        gateway,
        sequences,
        action,
        config.wait_settings(),
        Some(tx),
    )
    .await;

    // The orchestrator has dropped its sender; the UI drains and exits.
    ui_task.await.ok();

    let failed = orchestrator::count_failed(&results);
    if failed > 0 {
        anyhow::bail!("{failed} operation(s) failed; see output above");
    }
    Ok(())
}
