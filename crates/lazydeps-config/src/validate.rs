//! Post-merge manifest validation.

use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{FetchMode, Manifest};

/// Longest idle grace period accepted, in milliseconds.
pub const MAX_IDLE_GRACE_MS: u64 = 60_000;

const LOG_FORMATS: &[&str] = &["pretty", "compact", "json"];

/// Validate a fully merged manifest.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(manifest: &Manifest) -> ConfigResult<()> {
    validate_loader(manifest)?;
    validate_log(manifest)?;
    validate_deps(manifest)?;
    Ok(())
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate_loader(manifest: &Manifest) -> ConfigResult<()> {
    let loader = &manifest.loader;

    if let Some(base) = &loader.base_url {
        let url = Url::parse(base)
            .map_err(|e| invalid("loader.base_url", format!("'{base}' is not a URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(
                "loader.base_url",
                format!("unsupported scheme '{}'; expected http or https", url.scheme()),
            ));
        }
    }

    if loader.fetch == FetchMode::Fs
        && loader
            .root
            .as_ref()
            .is_none_or(|root| root.as_os_str().is_empty())
    {
        return Err(invalid("loader.root", "fs fetching needs a root directory"));
    }

    if loader.idle.grace_ms > MAX_IDLE_GRACE_MS {
        return Err(invalid(
            "loader.idle.grace_ms",
            format!("grace period must be at most {MAX_IDLE_GRACE_MS} ms"),
        ));
    }

    Ok(())
}

fn validate_log(manifest: &Manifest) -> ConfigResult<()> {
    if manifest.log.level.trim().is_empty() {
        return Err(invalid("log.level", "level must not be empty"));
    }
    if !LOG_FORMATS.contains(&manifest.log.format.as_str()) {
        return Err(invalid(
            "log.format",
            format!(
                "unsupported format '{}'; expected one of: {}",
                manifest.log.format,
                LOG_FORMATS.join(", ")
            ),
        ));
    }
    Ok(())
}

fn validate_deps(manifest: &Manifest) -> ConfigResult<()> {
    for (name, dep) in &manifest.deps {
        if name.trim().is_empty() || name.chars().any(char::is_whitespace) {
            return Err(invalid(
                format!("deps.{name}"),
                "dependency names must be non-empty and contain no whitespace",
            ));
        }
        for (kind, urls) in [("css", &dep.css), ("js", &dep.js)] {
            if urls.iter().any(|url| url.trim().is_empty()) {
                return Err(invalid(
                    format!("deps.{name}.{kind}"),
                    "resource URLs must not be empty",
                ));
            }
        }
    }
    Ok(())
}
