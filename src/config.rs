//! Runtime configuration for stackpilot.
//!
//! One `Config` is built at startup from CLI arguments plus the run
//! manifest and passed explicitly into the commands and orchestrator —
//! there is no process-global client or logger state.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::gateway::WaitSettings;
use crate::manifest::Manifest;

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub verbose: bool,
    manifest: Manifest,
}

impl Config {
    /// Build a Config, discovering the manifest in `project_dir` when
    /// no explicit path is given.
    pub fn new(project_dir: PathBuf, verbose: bool, manifest_path: Option<PathBuf>) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;

        let manifest_path = match manifest_path {
            Some(path) => path
                .canonicalize()
                .context("Failed to resolve manifest path")?,
            None => Manifest::discover(&project_dir)?,
        };

        let manifest = Manifest::load(&manifest_path)
            .with_context(|| format!("Failed to load manifest {}", manifest_path.display()))?;

        Ok(Self {
            project_dir,
            manifest_path,
            verbose,
            manifest,
        })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn region(&self) -> &str {
        &self.manifest.region
    }

    pub fn wait_settings(&self) -> WaitSettings {
        self.manifest.waiter.settings()
    }

    /// Directory template paths are resolved against.
    pub fn template_base(&self) -> PathBuf {
        self.manifest_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.project_dir.clone())
    }
}
