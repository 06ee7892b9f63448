//! Run manifest definition and YAML loading.
//!
//! This module provides:
//! - `Manifest` — the full stackpilot.yaml format
//! - `StackDef` — one stack definition inside a sequence
//! - `WaiterConfig` — poll interval / attempt budget overrides
//! - Discovery of the manifest within a project directory
//!
//! The manifest describes *what* to deploy: the region, N sequences of
//! stack definitions (inner order is the hard dependency order), and
//! optional waiter tuning. Template bodies are resolved later, by the
//! resolver, just before the orchestrator runs.

use crate::errors::ManifestError;
use crate::gateway::WaitSettings;
use crate::stack::Parameter;
use glob::glob;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One stack definition inside a sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackDef {
    /// Stack name, unique across the whole manifest.
    pub name: String,
    /// Template path, relative to the manifest file.
    pub template: PathBuf,
    /// Template parameters; YAML mapping order is preserved.
    #[serde(default)]
    pub parameters: serde_yaml::Mapping,
    /// Explicit capability acknowledgements. When absent the resolver
    /// asks the provider which ones the template needs.
    #[serde(default)]
    pub capabilities: Option<Vec<String>>,
}

impl StackDef {
    /// Parameters as an ordered key/value list.
    pub fn parameter_list(&self) -> Vec<Parameter> {
        self.parameters
            .iter()
            .filter_map(|(k, v)| {
                let key = k.as_str()?.to_string();
                let value = match v {
                    serde_yaml::Value::String(s) => s.clone(),
                    other => serde_yaml::to_string(other).ok()?.trim_end().to_string(),
                };
                Some(Parameter { key, value })
            })
            .collect()
    }
}

/// Waiter tuning, defaulting to the gateway's 5 s / 120 attempts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WaiterConfig {
    pub poll_interval_secs: u64,
    pub max_attempts: u32,
}

impl Default for WaiterConfig {
    fn default() -> Self {
        let defaults = WaitSettings::default();
        Self {
            poll_interval_secs: defaults.poll_interval.as_secs(),
            max_attempts: defaults.max_attempts,
        }
    }
}

impl WaiterConfig {
    pub fn settings(&self) -> WaitSettings {
        WaitSettings::new(Duration::from_secs(self.poll_interval_secs), self.max_attempts)
    }
}

/// The full run manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Provider region the whole run targets.
    pub region: String,
    #[serde(default)]
    pub waiter: WaiterConfig,
    /// Independent sequences; inner order encodes the dependency chain.
    pub sequences: Vec<Vec<StackDef>>,
}

impl Manifest {
    /// Load and validate a manifest from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Manifest = serde_yaml::from_str(&content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Find a manifest: `stackpilot.yaml` in the project directory, or
    /// the most recently modified `stackpilot*.y*ml` as a fallback.
    pub fn discover(project_dir: &Path) -> Result<PathBuf, ManifestError> {
        let preferred = project_dir.join("stackpilot.yaml");
        if preferred.exists() {
            return Ok(preferred);
        }

        let pattern = project_dir
            .join("stackpilot*.y*ml")
            .to_string_lossy()
            .to_string();
        let mut candidates: Vec<PathBuf> = glob(&pattern)
            .map_err(|_| ManifestError::NotFound)?
            .filter_map(|entry| entry.ok())
            .collect();

        if candidates.is_empty() {
            return Err(ManifestError::NotFound);
        }

        candidates.sort_by(|a, b| {
            let a_time = a.metadata().and_then(|m| m.modified()).ok();
            let b_time = b.metadata().and_then(|m| m.modified()).ok();
            b_time.cmp(&a_time)
        });
        Ok(candidates.remove(0))
    }

    /// Reject empty runs and duplicate stack names. Names correlate
    /// with the remote system, so they must be unique run-wide.
    fn validate(&self) -> Result<(), ManifestError> {
        if self.sequences.iter().all(|s| s.is_empty()) {
            return Err(ManifestError::Empty);
        }
        let mut seen = HashSet::new();
        for def in self.sequences.iter().flatten() {
            if !seen.insert(def.name.as_str()) {
                return Err(ManifestError::DuplicateName {
                    name: def.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Total number of stack definitions across all sequences.
    pub fn stack_count(&self) -> usize {
        self.sequences.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
region: ap-northeast-2
waiter:
  poll_interval_secs: 2
  max_attempts: 30
sequences:
  - - name: web-git
      template: templates/codecommit.yaml
      parameters:
        RepositoryName: web
    - name: web-build
      template: templates/codebuild.yaml
      parameters:
        ProjectName: web-build
        BranchName: main
  - - name: api-git
      template: templates/codecommit.yaml
      parameters:
        RepositoryName: api
"#;

    #[test]
    fn load_parses_sequences_and_waiter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stackpilot.yaml");
        fs::write(&path, SAMPLE).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.region, "ap-northeast-2");
        assert_eq!(manifest.sequences.len(), 2);
        assert_eq!(manifest.sequences[0].len(), 2);
        assert_eq!(manifest.stack_count(), 3);
        assert_eq!(manifest.waiter.max_attempts, 30);
        assert_eq!(
            manifest.waiter.settings().poll_interval,
            Duration::from_secs(2)
        );
    }

    #[test]
    fn parameter_list_preserves_yaml_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stackpilot.yaml");
        fs::write(&path, SAMPLE).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        let params = manifest.sequences[0][1].parameter_list();
        assert_eq!(params[0].key, "ProjectName");
        assert_eq!(params[0].value, "web-build");
        assert_eq!(params[1].key, "BranchName");
        assert_eq!(params[1].value, "main");
    }

    #[test]
    fn waiter_defaults_when_omitted() {
        let yaml = r#"
region: us-east-1
sequences:
  - - name: only
      template: t.yaml
"#;
        let dir = tempdir().unwrap();
        let path = dir.path().join("stackpilot.yaml");
        fs::write(&path, yaml).unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.waiter.poll_interval_secs, 5);
        assert_eq!(manifest.waiter.max_attempts, 120);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let yaml = r#"
region: us-east-1
sequences:
  - - name: dup
      template: a.yaml
  - - name: dup
      template: b.yaml
"#;
        let dir = tempdir().unwrap();
        let path = dir.path().join("stackpilot.yaml");
        fs::write(&path, yaml).unwrap();

        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, ManifestError::DuplicateName { name } if name == "dup"));
    }

    #[test]
    fn empty_manifest_is_rejected() {
        let yaml = "region: us-east-1\nsequences: []\n";
        let dir = tempdir().unwrap();
        let path = dir.path().join("stackpilot.yaml");
        fs::write(&path, yaml).unwrap();

        assert!(matches!(Manifest::load(&path), Err(ManifestError::Empty)));
    }

    #[test]
    fn discover_prefers_canonical_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("stackpilot.yaml"), SAMPLE).unwrap();
        fs::write(dir.path().join("stackpilot-old.yaml"), SAMPLE).unwrap();

        let found = Manifest::discover(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("stackpilot.yaml"));
    }

    #[test]
    fn discover_errors_when_nothing_matches() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Manifest::discover(dir.path()),
            Err(ManifestError::NotFound)
        ));
    }
}
