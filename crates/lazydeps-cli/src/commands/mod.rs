//! Subcommand implementations.

pub(crate) mod check;
pub(crate) mod inject;
pub(crate) mod list;
pub(crate) mod load;
pub(crate) mod version_log;

use anyhow::Result;
use lazydeps_core::{CallbackHooks, StatusSnapshot};

use crate::theme::Theme;

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    /// Colored, human-readable output.
    Pretty,
    /// Machine-readable JSON on stdout.
    Json,
}

/// Hooks that report progress on stderr in pretty mode.
pub(crate) fn progress_hooks(format: OutputFormat) -> CallbackHooks {
    if format == OutputFormat::Json {
        return CallbackHooks::new();
    }
    CallbackHooks::new()
        .on_loading(|name| eprintln!("{}", Theme::dimmed(&format!("  loading {name}"))))
        .on_loaded(|name| eprintln!("  {}", Theme::success(name)))
        .on_error(|name, err| eprintln!("  {}", Theme::error(&format!("{name}: {err}"))))
}

/// Print a status snapshot.
pub(crate) fn print_status(status: &StatusSnapshot, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(status)?),
        OutputFormat::Pretty => {
            println!("{}", Theme::header("Status"));
            for (name, state) in status {
                println!("  {name:<24} {}", Theme::status(*state));
            }
        },
    }
    Ok(())
}

/// Warn about requested names the manifest does not define. They are
/// skipped by the loader.
pub(crate) fn warn_unknown(names: &[String], known: &[&str]) {
    for name in names {
        if !known.contains(&name.as_str()) {
            tracing::warn!(dependency = %name, "not configured, skipping");
            eprintln!("{}", Theme::warning(&format!("'{name}' is not configured, skipping")));
        }
    }
}
