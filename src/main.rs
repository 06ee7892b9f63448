use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "stackpilot")]
#[command(version, about = "Deploy ordered sequences of infrastructure stacks in parallel")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Path to the run manifest. If not provided, will search for stackpilot.yaml
    /// in the project directory.
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create every stack, sequence by sequence, all sequences in parallel
    Deploy,
    /// Update every stack, sequence by sequence, all sequences in parallel
    Update,
    /// Delete every stack in reverse dependency order
    Teardown {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show what the manifest would run, without touching the provider
    Plan,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "stackpilot=debug" } else { "stackpilot=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Deploy => cmd::run_lifecycle(&cli, project_dir, cmd::Lifecycle::Deploy).await?,
        Commands::Update => cmd::run_lifecycle(&cli, project_dir, cmd::Lifecycle::Update).await?,
        Commands::Teardown { yes } => {
            cmd::run_teardown(&cli, project_dir, *yes).await?;
        }
        Commands::Plan => cmd::cmd_plan(&cli, project_dir)?,
    }

    Ok(())
}
