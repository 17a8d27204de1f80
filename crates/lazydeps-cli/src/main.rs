//! lazydeps CLI
//!
//! Loads the dependencies declared in `lazydeps.toml`, checks that they
//! resolve, renders their elements into HTML pages and stamps production
//! builds with a version banner.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lazydeps_config::Manifest;
use tracing::debug;

mod commands;
mod config_bridge;
mod theme;

use commands::OutputFormat;
use commands::version_log::VersionLogArgs;

/// lazydeps - on-demand dependency loader
#[derive(Parser)]
#[command(name = "lazydeps")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Manifest to use instead of the layered lookup
    #[arg(short, long, global = true, env = "LAZYDEPS_CONFIG")]
    config: Option<PathBuf>,

    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Output format: pretty (default) or json
    #[arg(long, global = true, default_value = "pretty")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured dependencies
    List,

    /// Load every dependency and report which ones fail
    Check,

    /// Load dependencies by name
    Load {
        /// Dependency names
        #[arg(required = true)]
        names: Vec<String>,

        /// Wait for the runtime to go idle before loading
        #[arg(long)]
        idle: bool,
    },

    /// Load dependencies and render their elements into an HTML page
    Inject {
        /// Dependency names
        #[arg(required = true)]
        names: Vec<String>,

        /// Page to render into
        #[arg(long)]
        html: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Inject the build version banner into an HTML page
    VersionLog {
        /// Page to transform
        #[arg(long)]
        html: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Banner title
        #[arg(long)]
        message: Option<String>,

        /// Emoji before the banner title
        #[arg(long)]
        emoji: Option<String>,

        /// Treat this as a production build regardless of NODE_ENV
        #[arg(long)]
        production: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let workspace_root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("failed to read current directory")?,
    };

    let resolved = match &cli.config {
        Some(path) => Manifest::load_file(path),
        None => Manifest::load(Some(workspace_root.as_path())),
    };

    // Set up logging from the manifest, with --verbose override.
    let log_config = if let Ok(resolved) = &resolved {
        let mut lc = config_bridge::to_log_config(&resolved.manifest);
        if cli.verbose {
            "debug".clone_into(&mut lc.level);
        }
        lc
    } else {
        let level = if cli.verbose { "debug" } else { "info" };
        lazydeps_telemetry::LogConfig::new(level)
            .with_format(lazydeps_telemetry::LogFormat::Compact)
    };
    if let Err(e) = lazydeps_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let resolved = resolved.context("failed to load configuration")?;
    for (layer, path) in &resolved.loaded_files {
        debug!(%layer, path = %path.display(), "configuration layer loaded");
    }
    let manifest = resolved.manifest;

    let format = match cli.format.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Pretty,
    };

    match cli.command {
        Commands::List => commands::list::run_list(&manifest, format)?,
        Commands::Check => commands::check::run_check(&manifest, &workspace_root, format).await?,
        Commands::Load { names, idle } => {
            commands::load::run_load(&manifest, &workspace_root, format, names, idle).await?;
        },
        Commands::Inject { names, html, out } => {
            commands::inject::run_inject(
                &manifest,
                &workspace_root,
                format,
                names,
                &html,
                out.as_deref(),
            )
            .await?;
        },
        Commands::VersionLog {
            html,
            out,
            message,
            emoji,
            production,
        } => {
            commands::version_log::run_version_log(
                &manifest,
                &workspace_root,
                VersionLogArgs {
                    html,
                    out,
                    message,
                    emoji,
                    production,
                },
            )?;
        },
    }

    Ok(())
}
