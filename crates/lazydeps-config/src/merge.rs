//! Layer merging.

use std::fmt;

/// Tables whose entries are replaced wholesale by a later layer rather than
/// merged field by field.
const REPLACE_ENTRIES: &[&str] = &["deps"];

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigLayer {
    /// Embedded defaults.
    Defaults,
    /// `~/.lazydeps/config.toml`.
    User,
    /// `{root}/lazydeps.toml`.
    Workspace,
    /// A file given explicitly on the command line.
    Explicit,
    /// `LAZYDEPS_*` environment variables.
    Environment,
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Defaults => "defaults",
            Self::User => "user",
            Self::Workspace => "workspace",
            Self::Explicit => "explicit",
            Self::Environment => "environment",
        };
        f.write_str(name)
    }
}

/// Merge `overlay` into `base`.
///
/// - Tables merge recursively per field.
/// - Scalars and arrays from the overlay replace the base value.
/// - Entries of the `[deps]` table replace same-named base entries whole, so
///   a dependency is always defined by exactly one layer.
pub fn merge_layer(base: &mut toml::Value, overlay: &toml::Value) {
    merge_at(base, overlay, "");
}

fn merge_at(base: &mut toml::Value, overlay: &toml::Value, path: &str) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            let replace = REPLACE_ENTRIES.contains(&path);
            for (key, overlay_val) in overlay_table {
                match base_table.get_mut(key) {
                    Some(base_val) if !replace => {
                        let child = if path.is_empty() {
                            key.clone()
                        } else {
                            format!("{path}.{key}")
                        };
                        merge_at(base_val, overlay_val, &child);
                    },
                    _ => {
                        base_table.insert(key.clone(), overlay_val.clone());
                    },
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}
