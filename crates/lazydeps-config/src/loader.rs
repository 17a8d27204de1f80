//! Manifest discovery and layered loading.
//!
//! `load()` resolves a manifest as follows:
//! 1. Parse the embedded `defaults.toml`
//! 2. Merge `~/.lazydeps/config.toml` (user)
//! 3. Merge `{root}/lazydeps.toml` (workspace)
//! 4. Fill still-unset fields from `LAZYDEPS_*` variables
//! 5. Deserialize and validate

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, merge_layer};
use crate::types::Manifest;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// File name of the workspace manifest.
pub const MANIFEST_FILE: &str = "lazydeps.toml";

/// Maximum allowed manifest size (1 MiB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// A loaded manifest together with the files it was built from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The merged, validated manifest.
    pub manifest: Manifest,
    /// Files that contributed, lowest precedence first.
    pub loaded_files: Vec<(ConfigLayer, PathBuf)>,
    /// Number of fields filled from the environment.
    pub env_fallbacks: usize,
}

/// Load the manifest with layered precedence.
///
/// `workspace_root` is the directory holding `lazydeps.toml`; `None` skips
/// the workspace layer. `home_override` replaces `~/.lazydeps` as the
/// directory searched for the user layer.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file is unreadable, oversized or malformed,
/// or if the merged manifest fails validation.
pub fn load(
    workspace_root: Option<&Path>,
    home_override: Option<&Path>,
) -> ConfigResult<ResolvedConfig> {
    let user_dir = match home_override {
        Some(dir) => dir.to_path_buf(),
        None => home_directory()?.join(".lazydeps"),
    };

    let mut layers = vec![(ConfigLayer::User, user_dir.join("config.toml"))];
    if let Some(root) = workspace_root {
        layers.push((ConfigLayer::Workspace, root.join(MANIFEST_FILE)));
    }

    load_layers(&layers, &collect_env_vars())
}

/// Load defaults, one explicit file and environment fallbacks.
///
/// Unlike the discovered layers, the file must exist.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<ResolvedConfig> {
    load_layers(
        &[(ConfigLayer::Explicit, path.to_path_buf())],
        &collect_env_vars(),
    )
}

/// Merge the given layers, in order, over the embedded defaults.
///
/// Missing files are skipped, except for [`ConfigLayer::Explicit`] ones.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file is unreadable, oversized or malformed,
/// or if the merged manifest fails validation.
pub fn load_layers(
    layers: &[(ConfigLayer, PathBuf)],
    env: &HashMap<String, String>,
) -> ConfigResult<ResolvedConfig> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    // File layers merge separately so env fallbacks can tell "set by a
    // file" apart from "set by defaults".
    let mut files = toml::Value::Table(toml::map::Map::new());
    let mut loaded_files = Vec::new();

    for (layer, path) in layers {
        let overlay = match try_load_file(path)? {
            Some(overlay) => overlay,
            None if *layer == ConfigLayer::Explicit => {
                return Err(ConfigError::ReadError {
                    path: path.display().to_string(),
                    source: io::Error::from(io::ErrorKind::NotFound),
                });
            },
            None => continue,
        };
        merge_layer(&mut files, &overlay);
        loaded_files.push((*layer, path.clone()));
        info!(%layer, path = %path.display(), "loaded config layer");
    }

    let env_fallbacks = apply_env_fallbacks(&mut files, env);
    if env_fallbacks > 0 {
        debug!(count = env_fallbacks, "applied environment variable fallbacks");
    }

    merge_layer(&mut merged, &files);
    let manifest: Manifest =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    validate::validate(&manifest)?;

    Ok(ResolvedConfig {
        manifest,
        loaded_files,
        env_fallbacks,
    })
}

/// Try to load a file, returning `None` if it doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    // Size is checked after the read to avoid a stat/read race.
    let size = u64::try_from(content.len()).unwrap_or(u64::MAX);
    if size > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {size} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit"
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

/// Determine the user's home directory.
fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FetchMode;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_deserialize_to_manifest() {
        let manifest: Manifest = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(manifest, Manifest::default());
    }

    #[test]
    fn test_load_without_files() {
        let resolved = load_layers(&[], &HashMap::new()).unwrap();
        assert_eq!(resolved.manifest, Manifest::default());
        assert!(resolved.loaded_files.is_empty());
    }

    #[test]
    fn test_workspace_overrides_user() {
        let dir = tempfile::tempdir().unwrap();
        let user = write(
            dir.path(),
            "user.toml",
            r#"
            [log]
            level = "debug"
            format = "json"

            [deps.widget]
            css = ["widget.css"]
            js = ["widget.js"]

            [deps.chart]
            js = ["chart.js"]
        "#,
        );
        let workspace = write(
            dir.path(),
            "lazydeps.toml",
            r#"
            [log]
            level = "warn"

            [deps.widget]
            js = ["a.js", "b.js"]
            sequential = true
        "#,
        );

        let resolved = load_layers(
            &[(ConfigLayer::User, user), (ConfigLayer::Workspace, workspace)],
            &HashMap::new(),
        )
        .unwrap();
        let manifest = resolved.manifest;

        assert_eq!(manifest.log.level, "warn");
        assert_eq!(manifest.log.format, "json");
        let widget = &manifest.deps["widget"];
        assert!(widget.css.is_empty());
        assert_eq!(widget.js, vec!["a.js", "b.js"]);
        assert!(widget.sequential);
        assert_eq!(manifest.dependency_names(), vec!["chart", "widget"]);
        assert_eq!(resolved.loaded_files.len(), 2);
    }

    #[test]
    fn test_env_fills_only_unset_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "lazydeps.toml", "[log]\nlevel = \"warn\"\n");
        let env: HashMap<String, String> = [
            ("LAZYDEPS_LOG_LEVEL", "trace"),
            ("LAZYDEPS_ROOT", "/srv/static"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();

        let resolved = load_layers(&[(ConfigLayer::Workspace, path)], &env).unwrap();
        assert_eq!(resolved.manifest.log.level, "warn");
        assert_eq!(
            resolved.manifest.loader.root,
            Some(PathBuf::from("/srv/static"))
        );
        assert_eq!(resolved.env_fallbacks, 1);
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let result = load_layers(
            &[(
                ConfigLayer::Explicit,
                PathBuf::from("/nonexistent/lazydeps.toml"),
            )],
            &HashMap::new(),
        );
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_discovered_file_may_be_missing() {
        let result = try_load_file(Path::new("/nonexistent/lazydeps.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "lazydeps.toml", "[loader\nfetch = ");
        let result = load_layers(&[(ConfigLayer::Workspace, path)], &HashMap::new());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_unknown_fetch_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "lazydeps.toml", "[loader]\nfetch = \"ftp\"\n");
        let result = load_layers(&[(ConfigLayer::Workspace, path)], &HashMap::new());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_http_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "lazydeps.toml",
            "[loader]\nfetch = \"http\"\nbase_url = \"https://cdn.example.com/\"\n",
        );
        let resolved = load_layers(&[(ConfigLayer::Workspace, path)], &HashMap::new()).unwrap();
        assert_eq!(resolved.manifest.loader.fetch, FetchMode::Http);
    }

    #[test]
    fn test_oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let padding = "#".repeat(1_048_577);
        let path = write(dir.path(), "lazydeps.toml", &padding);
        assert!(matches!(
            try_load_file(&path),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validation_runs_after_merge() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "lazydeps.toml",
            "[loader.idle]\ngrace_ms = 120000\n",
        );
        let result = load_layers(&[(ConfigLayer::Workspace, path)], &HashMap::new());
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }
}
