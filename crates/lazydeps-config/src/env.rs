//! Environment variable fallbacks.
//!
//! A variable fills its field only when no manifest file set it; embedded
//! defaults do not count as set.

use std::collections::HashMap;

use tracing::debug;

/// Variable → dotted field path.
pub const ENV_FALLBACKS: &[(&str, &str)] = &[
    ("LAZYDEPS_LOG_LEVEL", "log.level"),
    ("LAZYDEPS_BASE_URL", "loader.base_url"),
    ("LAZYDEPS_ROOT", "loader.root"),
];

/// Collect the `LAZYDEPS_*` variables relevant to configuration.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    ENV_FALLBACKS
        .iter()
        .filter_map(|(var, _)| {
            std::env::var(var)
                .ok()
                .filter(|v| !v.is_empty())
                .map(|v| ((*var).to_owned(), v))
        })
        .collect()
}

/// Fill fields missing from `files` (the merged file layers, without
/// defaults) from `env`. Returns how many fields were filled.
pub fn apply_env_fallbacks(files: &mut toml::Value, env: &HashMap<String, String>) -> usize {
    let mut applied = 0_usize;
    for (var, path) in ENV_FALLBACKS {
        let Some(value) = env.get(*var) else {
            continue;
        };
        if set_if_absent(files, path, value) {
            debug!(var, field = path, "applied environment fallback");
            applied = applied.saturating_add(1);
        }
    }
    applied
}

fn set_if_absent(root: &mut toml::Value, path: &str, value: &str) -> bool {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return false;
    };

    let mut node = root;
    for segment in segments {
        let Some(table) = node.as_table_mut() else {
            return false;
        };
        node = table
            .entry(segment)
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }

    let Some(table) = node.as_table_mut() else {
        return false;
    };
    if table.contains_key(leaf) {
        return false;
    }
    table.insert(leaf.to_owned(), toml::Value::String(value.to_owned()));
    true
}
