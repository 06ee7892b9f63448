//! `stackpilot plan` — show what the manifest would run.

use anyhow::Result;
use console::style;
use std::path::PathBuf;

use super::super::Cli;
use stackpilot::config::Config;

pub fn cmd_plan(cli: &Cli, project_dir: PathBuf) -> Result<()> {
    let config = Config::new(project_dir, cli.verbose, cli.manifest.clone())?;
    let manifest = config.manifest();

    println!(
        "{} {} ({} stacks, {} sequences)",
        style("Region:").bold(),
        manifest.region,
        manifest.stack_count(),
        manifest.sequences.len()
    );
    println!(
        "{} every {}s, up to {} attempts per operation",
        style("Polling:").bold(),
        manifest.waiter.poll_interval_secs,
        manifest.waiter.max_attempts
    );

    for (i, sequence) in manifest.sequences.iter().enumerate() {
        println!();
        println!("{}", style(format!("Sequence {}", i + 1)).cyan().bold());
        for (j, def) in sequence.iter().enumerate() {
            let marker = if j == 0 { "  " } else { "  then " };
            println!(
                "{}{} {}",
                marker,
                style(&def.name).yellow(),
                style(format!("({})", def.template.display())).dim()
            );
            for param in def.parameter_list() {
                println!("      {} = {}", style(&param.key).dim(), param.value);
            }
        }
    }

    Ok(())
}
