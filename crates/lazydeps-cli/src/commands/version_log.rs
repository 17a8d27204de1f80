//! `lazydeps version-log`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lazydeps_config::Manifest;
use lazydeps_version_log::{BuildMode, VersionLogPlugin};

use crate::config_bridge::to_version_log_options;
use crate::theme::Theme;

/// Arguments of `lazydeps version-log`.
pub(crate) struct VersionLogArgs {
    pub(crate) html: PathBuf,
    pub(crate) out: Option<PathBuf>,
    pub(crate) message: Option<String>,
    pub(crate) emoji: Option<String>,
    pub(crate) production: bool,
}

/// Inject the version banner into an HTML file.
pub(crate) fn run_version_log(
    manifest: &Manifest,
    workspace_root: &Path,
    args: VersionLogArgs,
) -> Result<()> {
    let mut options = to_version_log_options(manifest);
    if let Some(message) = args.message {
        options = options.with_message(message);
    }
    if let Some(emoji) = args.emoji {
        options = options.with_emoji(emoji);
    }

    let mut plugin = VersionLogPlugin::new(options).with_repo_dir(workspace_root);
    if args.production {
        plugin = plugin.with_mode(BuildMode::Production);
    }

    match args.out {
        Some(out) => {
            let injected = plugin.transform_file(&args.html, &out)?;
            let message = if injected {
                Theme::success(&format!("version banner written to {}", out.display()))
            } else {
                Theme::warning(&format!(
                    "no banner injected (mode: {:?}), copied to {}",
                    plugin.mode(),
                    out.display()
                ))
            };
            eprintln!("{message}");
        },
        None => {
            let html = std::fs::read_to_string(&args.html)
                .with_context(|| format!("failed to read {}", args.html.display()))?;
            print!("{}", plugin.transform_index_html(&html));
        },
    }
    Ok(())
}
