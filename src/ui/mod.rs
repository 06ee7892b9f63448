//! Console rendering for run progress.

mod progress;

pub use progress::DeployUI;
