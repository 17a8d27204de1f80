#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Manifest configuration for lazydeps.
//!
//! A single [`Manifest`] describes how resources are fetched, how logging is
//! set up, which dependencies exist and how the version banner reads.
//!
//! # Usage
//!
//! ```rust,no_run
//! use lazydeps_config::Manifest;
//!
//! // Defaults → user → workspace → env.
//! let resolved = Manifest::load(Some(std::path::Path::new("."))).unwrap();
//! for name in resolved.manifest.dependency_names() {
//!     println!("{name}");
//! }
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Workspace** (`{root}/lazydeps.toml`)
//! 2. **User** (`~/.lazydeps/config.toml`)
//! 3. **Environment variables** (`LAZYDEPS_*`), fallback only
//! 4. **Embedded defaults** (`defaults.toml` compiled into binary)
//!
//! Entries of `[deps]` are replaced whole by a higher layer, never merged
//! field by field.
//!
//! # Design
//!
//! This crate has no dependencies on other lazydeps crates. Conversion into
//! loader types happens in the binaries.

/// Environment variable fallback resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Manifest discovery and loading.
pub mod loader;
/// Layer merging.
pub mod merge;
/// Manifest struct definitions.
pub mod types;
/// Manifest validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{MANIFEST_FILE, ResolvedConfig};
pub use merge::ConfigLayer;
pub use types::*;

impl Manifest {
    /// Load with full precedence chain.
    ///
    /// See [`loader::load`] for the full algorithm.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any file is malformed or the final
    /// manifest fails validation.
    pub fn load(workspace_root: Option<&std::path::Path>) -> ConfigResult<ResolvedConfig> {
        loader::load(workspace_root, None)
    }

    /// Load with an explicit user config directory.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any file is malformed or the final
    /// manifest fails validation.
    pub fn load_with_home(
        workspace_root: Option<&std::path::Path>,
        home_dir: &std::path::Path,
    ) -> ConfigResult<ResolvedConfig> {
        loader::load(workspace_root, Some(home_dir))
    }

    /// Load defaults plus a single explicit file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<ResolvedConfig> {
        loader::load_file(path)
    }
}
