//! `lazydeps list`.

use anyhow::Result;
use lazydeps_config::Manifest;

use super::OutputFormat;
use crate::theme::Theme;

/// Print every configured dependency.
pub(crate) fn run_list(manifest: &Manifest, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&manifest.deps)?);
        return Ok(());
    }

    println!("{}", Theme::header("Dependencies"));
    if manifest.deps.is_empty() {
        println!("  {}", Theme::warning("no dependencies configured"));
        return Ok(());
    }

    for (name, dep) in &manifest.deps {
        let order = if dep.sequential {
            "sequential"
        } else {
            "parallel"
        };
        println!(
            "  {name}  {}",
            Theme::dimmed(&format!(
                "({} css, {} js, {order})",
                dep.css.len(),
                dep.js.len()
            ))
        );
        for url in &dep.css {
            println!("    css  {url}");
        }
        for url in &dep.js {
            println!("    js   {url}");
        }
    }
    Ok(())
}
