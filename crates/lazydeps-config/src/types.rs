//! Manifest types.
//!
//! These mirror the loader's domain types without depending on them;
//! conversion happens in the binaries that use both. Every section implements
//! [`Default`] so that a bare `[section]` header produces a working manifest.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root of a `lazydeps.toml` manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// How resources are fetched.
    pub loader: LoaderSection,
    /// Logging level, format and directives.
    pub log: LogSection,
    /// Dependency definitions keyed by name.
    pub deps: BTreeMap<String, DependencySection>,
    /// Version banner settings.
    pub version_log: VersionLogSection,
}

impl Manifest {
    /// Names of every configured dependency, in name order.
    #[must_use]
    pub fn dependency_names(&self) -> Vec<&str> {
        self.deps.keys().map(String::as_str).collect()
    }
}

// ---------------------------------------------------------------------------
// LoaderSection
// ---------------------------------------------------------------------------

/// Where resources come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Fetch over HTTP(S).
    Http,
    /// Resolve against a local directory.
    #[default]
    Fs,
}

/// `[loader]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSection {
    /// Fetch mode.
    pub fetch: FetchMode,
    /// Base URL relative references are resolved against in `http` mode.
    pub base_url: Option<String>,
    /// Static root directory in `fs` mode.
    pub root: Option<PathBuf>,
    /// Idle scheduling of deferred loads.
    pub idle: IdleSection,
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            fetch: FetchMode::default(),
            base_url: None,
            root: Some(PathBuf::from(".")),
            idle: IdleSection::default(),
        }
    }
}

/// `[loader.idle]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleSection {
    /// Whether deferred loads wait for idle time. When off they run at once.
    pub enabled: bool,
    /// Grace period in milliseconds before a deferred load starts.
    pub grace_ms: u64,
}

impl Default for IdleSection {
    fn default() -> Self {
        Self {
            enabled: true,
            grace_ms: 50,
        }
    }
}

// ---------------------------------------------------------------------------
// LogSection
// ---------------------------------------------------------------------------

/// `[log]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Global level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"` or `"json"`.
    pub format: String,
    /// Per-crate directives (e.g. `["lazydeps_core=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// DependencySection
// ---------------------------------------------------------------------------

/// One `[deps.<name>]` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencySection {
    /// Stylesheet URLs.
    pub css: Vec<String>,
    /// Script URLs.
    pub js: Vec<String>,
    /// Load scripts one after another in declaration order.
    pub sequential: bool,
}

// ---------------------------------------------------------------------------
// VersionLogSection
// ---------------------------------------------------------------------------

/// `[version_log]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionLogSection {
    /// Banner title.
    pub message: String,
    /// Emoji prefixed to the banner title.
    pub emoji: String,
}

impl Default for VersionLogSection {
    fn default() -> Self {
        Self {
            message: "Version info".to_owned(),
            emoji: "🚀".to_owned(),
        }
    }
}
