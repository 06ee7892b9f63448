//! Template resolver — turns manifest stack definitions into ready
//! `StackOperation`s.
//!
//! Sits upstream of the orchestrator core: reads each template body
//! from disk and, unless the manifest pins capabilities explicitly,
//! asks the provider which acknowledgements the template requires. The
//! core only ever sees fully resolved operations.

use crate::errors::ManifestError;
use crate::gateway::ProviderGateway;
use crate::manifest::{Manifest, StackDef};
use crate::stack::StackOperation;
use anyhow::{Context, Result};
use std::path::Path;

/// Resolve one stack definition. `base_dir` anchors relative template
/// paths (normally the manifest's parent directory).
pub async fn resolve_stack(
    gateway: &dyn ProviderGateway,
    def: &StackDef,
    base_dir: &Path,
) -> Result<StackOperation> {
    let template_path = if def.template.is_absolute() {
        def.template.clone()
    } else {
        base_dir.join(&def.template)
    };

    let template_body =
        std::fs::read_to_string(&template_path).map_err(|source| ManifestError::TemplateReadFailed {
            path: template_path.clone(),
            source,
        })?;

    let capabilities = match &def.capabilities {
        Some(explicit) => explicit.clone(),
        None => gateway
            .validate(&template_body)
            .await
            .with_context(|| format!("Template validation failed for stack '{}'", def.name))?,
    };

    Ok(StackOperation::with_inputs(
        &def.name,
        &template_body,
        def.parameter_list(),
        capabilities,
    ))
}

/// Resolve every definition in the manifest, preserving the sequence
/// structure. Fails fast: a single unreadable or invalid template
/// aborts before anything is submitted to the provider.
pub async fn resolve_run(
    gateway: &dyn ProviderGateway,
    manifest: &Manifest,
    base_dir: &Path,
) -> Result<Vec<Vec<StackOperation>>> {
    let mut run = Vec::with_capacity(manifest.sequences.len());
    for defs in &manifest.sequences {
        let mut sequence = Vec::with_capacity(defs.len());
        for def in defs {
            sequence.push(resolve_stack(gateway, def, base_dir).await?);
        }
        run.push(sequence);
    }
    Ok(run)
}
