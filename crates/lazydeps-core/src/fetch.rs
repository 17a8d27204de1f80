//! Resource fetchers.
//!
//! A fetcher supplies the ready/error signal for an injected element: the
//! element counts as loaded once [`ResourceFetcher::fetch`] returns `Ok`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::trace;
use url::Url;

use crate::document::ResourceKind;
use crate::error::{FetchError, FetchResult};

/// Source of readiness signals for scripts and stylesheets.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the resource at `url`, returning once it is ready.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the resource signals an error.
    async fn fetch(&self, kind: ResourceKind, url: &str) -> FetchResult<()>;
}

/// Fetches resources over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl HttpFetcher {
    /// Create a fetcher that only accepts absolute URLs.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: None,
        }
    }

    /// Create a fetcher that resolves relative URLs against `base_url`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Use a preconfigured client.
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Resolve `url` to an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `url` is relative and no base URL
    /// is configured, or if it cannot be parsed.
    pub fn resolve(&self, url: &str) -> FetchResult<Url> {
        let parsed = match &self.base_url {
            Some(base) => base.join(url),
            None => Url::parse(url),
        };
        parsed.map_err(|e| FetchError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, kind: ResourceKind, url: &str) -> FetchResult<()> {
        let target = self.resolve(url)?;
        trace!(%kind, url = %target, "fetching resource");

        let request_err = |e: reqwest::Error| FetchError::Request {
            url: target.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .get(target.clone())
            .send()
            .await
            .map_err(request_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: target.to_string(),
                status: status.as_u16(),
            });
        }

        // Ready only once the whole body has arrived.
        response.bytes().await.map_err(request_err)?;
        Ok(())
    }
}

/// Resolves resources against a directory on disk.
///
/// A resource is ready when it exists as a regular file under the root.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    /// Create a fetcher rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a URL path onto the root directory.
    ///
    /// Leading slashes, query strings and fragments are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] for empty paths and paths that
    /// escape the root via `..`.
    pub fn resolve(&self, url: &str) -> FetchResult<PathBuf> {
        let path = url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_start_matches('/');
        if path.is_empty() {
            return Err(FetchError::InvalidUrl {
                url: url.to_owned(),
                reason: "empty path".to_owned(),
            });
        }

        let relative = Path::new(path);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(FetchError::InvalidUrl {
                url: url.to_owned(),
                reason: "path escapes the resource root".to_owned(),
            });
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ResourceFetcher for FsFetcher {
    async fn fetch(&self, kind: ResourceKind, url: &str) -> FetchResult<()> {
        let path = self.resolve(url)?;
        trace!(%kind, path = %path.display(), "checking resource file");

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(FetchError::NotFound(path.display().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(path.display().to_string()))
            },
            Err(e) => Err(FetchError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_resolve_relative_requires_base() {
        let fetcher = HttpFetcher::new();
        assert!(matches!(
            fetcher.resolve("vendor/a.js"),
            Err(FetchError::InvalidUrl { .. })
        ));

        let fetcher = fetcher.with_base_url(Url::parse("https://cdn.example.com/lib/").unwrap());
        assert_eq!(
            fetcher.resolve("vendor/a.js").unwrap().as_str(),
            "https://cdn.example.com/lib/vendor/a.js"
        );
        assert_eq!(
            fetcher.resolve("https://other.example.com/b.js").unwrap().as_str(),
            "https://other.example.com/b.js"
        );
    }

    #[test]
    fn test_fs_resolve_rejects_escape() {
        let fetcher = FsFetcher::new("/srv/static");
        assert_eq!(
            fetcher.resolve("/js/a.js?v=2").unwrap(),
            PathBuf::from("/srv/static/js/a.js")
        );
        assert!(matches!(
            fetcher.resolve("../etc/passwd"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            fetcher.resolve("/"),
            Err(FetchError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_fs_fetch_existing_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.css"), "body {}").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let fetcher = FsFetcher::new(dir.path());
        assert!(
            fetcher
                .fetch(ResourceKind::Stylesheet, "a.css")
                .await
                .is_ok()
        );
        assert!(matches!(
            fetcher.fetch(ResourceKind::Script, "missing.js").await,
            Err(FetchError::NotFound(_))
        ));
        // Directories are not resources.
        assert!(matches!(
            fetcher.fetch(ResourceKind::Script, "nested").await,
            Err(FetchError::NotFound(_))
        ));
    }
}
