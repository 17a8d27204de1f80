//! `lazydeps inject`: load dependencies and render their elements into an
//! HTML page.

use std::path::Path;

use anyhow::{Context, Result};
use lazydeps_config::Manifest;

use super::{OutputFormat, progress_hooks, warn_unknown};
use crate::config_bridge::to_loader_context;
use crate::theme::Theme;

pub(crate) async fn run_inject(
    manifest: &Manifest,
    workspace_root: &Path,
    format: OutputFormat,
    names: Vec<String>,
    html: &Path,
    out: Option<&Path>,
) -> Result<()> {
    let source = std::fs::read_to_string(html)
        .with_context(|| format!("failed to read {}", html.display()))?;

    warn_unknown(&names, &manifest.dependency_names());

    let ctx = to_loader_context(manifest, workspace_root)?;
    ctx.coordinator()?
        .with_hooks(progress_hooks(format))
        .load_many(names)
        .await?;

    let rendered = ctx.document().render_into(&source);
    match out {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "{}",
                Theme::success(&format!("wrote {}", path.display()))
            );
        },
        None => print!("{rendered}"),
    }
    Ok(())
}
