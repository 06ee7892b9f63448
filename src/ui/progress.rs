//! Terminal UI for a stackpilot run, rendered via `indicatif` progress bars.
//!
//! One bar per sequence, stacked vertically, each sized by the number
//! of operations in that sequence, plus a run summary line at the
//! bottom. The UI consumes the orchestrator's event stream; it holds no
//! orchestration state of its own.

use crate::events::{EventKind, StackEvent};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

pub struct DeployUI {
    multi: MultiProgress,
    sequence_bars: Vec<ProgressBar>,
    summary_bar: ProgressBar,
    verbose: bool,
}

impl DeployUI {
    /// Create the UI with one bar per sequence.
    ///
    /// # Arguments
    /// * `sequence_sizes` — operation count per sequence, in run order
    /// * `verbose` — when `true`, every event is also printed as a timestamped line
    pub fn new(sequence_sizes: &[usize], verbose: bool) -> Self {
        let multi = MultiProgress::new();

        let bar_style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is a valid static string")
            .progress_chars("█▓▒░");

        let sequence_bars: Vec<ProgressBar> = sequence_sizes
            .iter()
            .enumerate()
            .map(|(i, &len)| {
                let bar = multi.add(ProgressBar::new(len as u64));
                bar.set_style(bar_style.clone());
                bar.set_prefix(format!("Seq {}", i + 1));
                bar
            })
            .collect();

        let summary_style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} {msg}")
            .expect("progress bar template is a valid static string");
        let summary_bar = multi.add(ProgressBar::new(0));
        summary_bar.set_style(summary_style);
        summary_bar.set_prefix("  Run");

        Self {
            multi,
            sequence_bars,
            summary_bar,
            verbose,
        }
    }

    /// Print a line via `MultiProgress`, falling back to `eprintln!` if
    /// the rich UI fails, so failure lines are never silently lost.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    fn bar(&self, sequence: usize) -> Option<&ProgressBar> {
        self.sequence_bars.get(sequence)
    }

    /// Apply one event to the display.
    pub fn handle(&self, event: &StackEvent) {
        if self.verbose {
            self.print_line(format!(
                "{} {}",
                style(event.at.format("%H:%M:%S")).dim(),
                style(format!("{:?}", event.kind)).dim()
            ));
        }

        match &event.kind {
            EventKind::OperationStarted { sequence, name, verb } => {
                if let Some(bar) = self.bar(*sequence) {
                    bar.set_message(format!("{} is being {}", style(name).yellow(), verb));
                }
            }
            EventKind::OperationSucceeded { sequence, name, verb } => {
                if let Some(bar) = self.bar(*sequence) {
                    bar.inc(1);
                    bar.set_message(format!("{} is {}", style(name).green(), verb));
                }
            }
            EventKind::OperationFailed {
                sequence,
                name,
                verb,
                error,
            } => {
                if let Some(bar) = self.bar(*sequence) {
                    bar.abandon_with_message(format!("{} failed", style(name).red().bold()));
                }
                self.print_line(format!(
                    "{} {} could not be {}: {}",
                    style("✗").red().bold(),
                    style(name).red().bold(),
                    verb,
                    error
                ));
            }
            EventKind::SequenceFinished {
                sequence,
                completed,
                failed,
                skipped,
            } => {
                if let Some(bar) = self.bar(*sequence) {
                    if *failed == 0 {
                        bar.finish_with_message(format!(
                            "{} {} operations complete",
                            style("✓").green(),
                            completed
                        ));
                    } else {
                        bar.abandon_with_message(format!(
                            "{} failed, {} skipped",
                            style(failed).red(),
                            skipped
                        ));
                    }
                }
            }
            EventKind::RunFinished {
                sequences,
                failed_operations,
            } => {
                let msg = if *failed_operations == 0 {
                    format!(
                        "{} all {} sequences finished",
                        style("✓").green().bold(),
                        sequences
                    )
                } else {
                    format!(
                        "{} {} sequences finished, {} operations failed",
                        style("✗").red().bold(),
                        sequences,
                        style(failed_operations).red()
                    )
                };
                self.summary_bar.finish_with_message(msg);
            }
        }
    }

    /// Drain the event channel until the orchestrator drops its sender.
    pub async fn consume(self, mut rx: mpsc::Receiver<StackEvent>) {
        while let Some(event) = rx.recv().await {
            self.handle(&event);
        }
    }
}
