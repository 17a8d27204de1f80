//! Loader error types.

use thiserror::Error;

use crate::document::ResourceKind;

/// Errors surfaced by the loader context and coordinator.
///
/// A single load attempt can have many waiters, so this type is `Clone`:
/// every waiter receives its own copy of the same outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
    /// A coordinator was requested before any configuration was set.
    #[error("dependencies configuration is not set, call `configure` first")]
    NotConfigured,

    /// The requested name has no configuration entry.
    #[error("unknown dependency '{0}'")]
    UnknownDependency(String),

    /// A script or stylesheet signalled an error while loading.
    #[error("failed to load {kind} '{url}': {reason}")]
    Resource {
        /// Which kind of element failed.
        kind: ResourceKind,
        /// The URL the element referenced.
        url: String,
        /// Underlying fetch error, rendered.
        reason: String,
    },

    /// The task driving an attempt went away before the attempt settled.
    #[error("load of '{0}' was aborted before it settled")]
    Aborted(String),

    /// The idle scheduler dropped a deferred load without running it.
    #[error("idle scheduler dropped the deferred load")]
    SchedulerDropped,
}

/// Result type for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Errors produced by a [`ResourceFetcher`](crate::ResourceFetcher).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// The request could not be completed.
    #[error("request to {url} failed: {message}")]
    Request {
        /// Requested URL.
        url: String,
        /// Transport error description.
        message: String,
    },

    /// The URL could not be turned into a fetchable location.
    #[error("invalid resource url '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_error_display() {
        let err = LoaderError::Resource {
            kind: ResourceKind::Script,
            url: "https://cdn.example.com/a.js".to_string(),
            reason: "HTTP 404".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to load script 'https://cdn.example.com/a.js': HTTP 404"
        );
    }

    #[test]
    fn test_loader_error_is_cloneable() {
        let err = LoaderError::UnknownDependency("chart".to_string());
        assert_eq!(err.clone(), err);
    }
}
