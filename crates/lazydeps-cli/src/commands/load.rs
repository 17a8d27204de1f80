//! `lazydeps load`.

use std::path::Path;

use anyhow::Result;
use lazydeps_config::Manifest;
use tracing::info;

use super::{OutputFormat, print_status, progress_hooks, warn_unknown};
use crate::config_bridge::to_loader_context;

/// Load the named dependencies and print the resulting statuses.
pub(crate) async fn run_load(
    manifest: &Manifest,
    workspace_root: &Path,
    format: OutputFormat,
    names: Vec<String>,
    idle: bool,
) -> Result<()> {
    warn_unknown(&names, &manifest.dependency_names());

    let ctx = to_loader_context(manifest, workspace_root)?;
    let coordinator = ctx.coordinator()?.with_hooks(progress_hooks(format));

    info!(count = names.len(), idle, "loading dependencies");
    let status = if idle {
        coordinator.load_many_when_idle(names).await?
    } else {
        coordinator.load_many(names).await?
    };

    print_status(&status, format)
}
