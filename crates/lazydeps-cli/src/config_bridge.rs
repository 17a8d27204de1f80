//! Bridge from `lazydeps_config::Manifest` to loader and telemetry types.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use lazydeps_config::{FetchMode, Manifest};
use lazydeps_core::{
    DependencyConfig, DependencyMap, Document, FsFetcher, HttpFetcher, IdleScheduler,
    LoaderContext, ResourceFetcher, ResourceLoader, TokioIdleScheduler,
};
use lazydeps_telemetry::{LogConfig, LogFormat};
use lazydeps_version_log::VersionLogOptions;
use url::Url;

/// Convert the `[log]` section to a [`LogConfig`].
pub(crate) fn to_log_config(manifest: &Manifest) -> LogConfig {
    let format = match manifest.log.format.as_str() {
        "pretty" => LogFormat::Pretty,
        "json" => LogFormat::Json,
        _ => LogFormat::Compact,
    };

    let mut log_config = LogConfig::new(&manifest.log.level).with_format(format);

    for directive in &manifest.log.directives {
        log_config = log_config.with_directive(directive);
    }

    log_config
}

/// Convert `[deps]` to a [`DependencyMap`].
pub(crate) fn to_dependency_map(manifest: &Manifest) -> DependencyMap {
    manifest
        .deps
        .iter()
        .map(|(name, dep)| {
            (
                name.clone(),
                DependencyConfig {
                    css: dep.css.clone(),
                    js: dep.js.clone(),
                    sequential: dep.sequential,
                },
            )
        })
        .collect()
}

/// Static root for `fs` fetching. Relative roots resolve against the
/// workspace root.
pub(crate) fn fs_root(manifest: &Manifest, workspace_root: &Path) -> PathBuf {
    let root = manifest
        .loader
        .root
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    if root.is_absolute() {
        root
    } else {
        workspace_root.join(root)
    }
}

/// Build the fetcher described by `[loader]`.
pub(crate) fn to_fetcher(
    manifest: &Manifest,
    workspace_root: &Path,
) -> Result<Arc<dyn ResourceFetcher>> {
    match manifest.loader.fetch {
        FetchMode::Http => {
            let mut fetcher = HttpFetcher::new();
            if let Some(base) = &manifest.loader.base_url {
                let base = Url::parse(base).with_context(|| format!("invalid base_url {base}"))?;
                fetcher = fetcher.with_base_url(base);
            }
            Ok(Arc::new(fetcher))
        },
        FetchMode::Fs => Ok(Arc::new(FsFetcher::new(fs_root(manifest, workspace_root)))),
    }
}

/// Build the idle scheduler described by `[loader.idle]`.
pub(crate) fn to_idle_scheduler(manifest: &Manifest) -> Option<Arc<dyn IdleScheduler>> {
    let idle = &manifest.loader.idle;
    idle.enabled.then(|| {
        Arc::new(TokioIdleScheduler::new(Duration::from_millis(idle.grace_ms)))
            as Arc<dyn IdleScheduler>
    })
}

/// Build a configured [`LoaderContext`] for the manifest.
pub(crate) fn to_loader_context(manifest: &Manifest, workspace_root: &Path) -> Result<LoaderContext> {
    let loader = ResourceLoader::new(Document::new(), to_fetcher(manifest, workspace_root)?);
    let ctx = LoaderContext::new(loader);
    ctx.set_idle_scheduler(to_idle_scheduler(manifest));
    ctx.configure(to_dependency_map(manifest));
    Ok(ctx)
}

/// Convert `[version_log]` to [`VersionLogOptions`].
pub(crate) fn to_version_log_options(manifest: &Manifest) -> VersionLogOptions {
    VersionLogOptions::default()
        .with_message(&manifest.version_log.message)
        .with_emoji(&manifest.version_log.emoji)
}
