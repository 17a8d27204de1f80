//! `lazydeps check`: try to load every configured dependency.

use std::path::Path;
use std::time::Instant;

use anyhow::{Result, bail};
use lazydeps_config::Manifest;
use serde_json::json;

use super::OutputFormat;
use crate::config_bridge::to_loader_context;
use crate::theme::Theme;

/// Load every dependency independently and report which ones resolve.
pub(crate) async fn run_check(
    manifest: &Manifest,
    workspace_root: &Path,
    format: OutputFormat,
) -> Result<()> {
    let ctx = to_loader_context(manifest, workspace_root)?;
    let coordinator = ctx.coordinator()?;
    let names = manifest.dependency_names();

    if format == OutputFormat::Pretty {
        println!("{}", Theme::header("lazydeps check"));
        println!();
    }

    // Attempts start as soon as `load_one` is called, so they all run
    // concurrently while being awaited in name order.
    let started = Instant::now();
    let attempts: Vec<_> = names
        .iter()
        .map(|name| (*name, coordinator.load_one(name)))
        .collect();

    let mut failures = serde_json::Map::new();
    for (name, attempt) in attempts {
        match attempt.await {
            Ok(()) => {
                if format == OutputFormat::Pretty {
                    println!("  {}", Theme::success(name));
                }
            },
            Err(e) => {
                if format == OutputFormat::Pretty {
                    println!("  {}", Theme::error(&format!("{name}: {e}")));
                }
                failures.insert(name.to_owned(), json!(e.to_string()));
            },
        }
    }
    let elapsed = started.elapsed();

    match format {
        OutputFormat::Json => {
            let report = json!({
                "ok": failures.is_empty(),
                "status": coordinator.status(),
                "failures": failures,
                "elapsed_ms": u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        },
        OutputFormat::Pretty => {
            println!();
            let summary = format!("{} dependencies checked in {elapsed:.2?}", names.len());
            if failures.is_empty() {
                println!("{}", Theme::success(&summary));
            } else {
                println!("{}", Theme::warning(&summary));
            }
        },
    }

    if !failures.is_empty() {
        bail!("{} of {} dependencies failed to load", failures.len(), names.len());
    }
    Ok(())
}
