//! Resource loader: injects elements into the document and waits for them.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, trace};

use crate::config::DependencyConfig;
use crate::document::{Document, Element, ResourceKind};
use crate::error::{LoaderError, LoaderResult};
use crate::fetch::ResourceFetcher;

/// Loads scripts and stylesheets into a [`Document`].
///
/// The loader knows nothing about dependency names or status; it only
/// injects elements and reports when they are ready.
#[derive(Clone)]
pub struct ResourceLoader {
    document: Document,
    fetcher: Arc<dyn ResourceFetcher>,
}

impl std::fmt::Debug for ResourceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLoader")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl ResourceLoader {
    /// Create a loader that injects into `document` and fetches with `fetcher`.
    pub fn new(document: Document, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        Self { document, fetcher }
    }

    /// The document elements are injected into.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Load one script.
    ///
    /// Resolves immediately if a script referencing `url` is already present.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Resource`] if the script fails to load.
    pub async fn load_script(&self, url: &str) -> LoaderResult<()> {
        self.load_element(Element::script(url)).await
    }

    /// Load one stylesheet.
    ///
    /// Resolves immediately if a stylesheet referencing `url` is already present.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Resource`] if the stylesheet fails to load.
    pub async fn load_stylesheet(&self, url: &str) -> LoaderResult<()> {
        self.load_element(Element::stylesheet(url)).await
    }

    /// Load a group of scripts.
    ///
    /// With `sequential` each script is awaited before the next one starts.
    /// Otherwise all scripts start together and the first failure is returned
    /// while the rest keep loading.
    ///
    /// # Errors
    ///
    /// Returns the first [`LoaderError::Resource`] encountered.
    pub async fn load_script_batch(&self, urls: &[String], sequential: bool) -> LoaderResult<()> {
        if urls.is_empty() {
            return Ok(());
        }
        if sequential {
            for url in urls {
                self.load_script(url).await?;
            }
            Ok(())
        } else {
            self.load_concurrently(ResourceKind::Script, urls).await
        }
    }

    /// Load a group of stylesheets concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first [`LoaderError::Resource`] encountered.
    pub async fn load_stylesheet_batch(&self, urls: &[String]) -> LoaderResult<()> {
        if urls.is_empty() {
            return Ok(());
        }
        self.load_concurrently(ResourceKind::Stylesheet, urls).await
    }

    /// Load every resource of a dependency: stylesheets first, then scripts.
    ///
    /// # Errors
    ///
    /// Returns the first [`LoaderError::Resource`] encountered.
    pub async fn load_dependency(&self, config: &DependencyConfig) -> LoaderResult<()> {
        self.load_stylesheet_batch(&config.css).await?;
        self.load_script_batch(&config.js, config.sequential).await
    }

    async fn load_element(&self, element: Element) -> LoaderResult<()> {
        let Element { kind, url } = element.clone();

        if !self.document.append(element) {
            trace!(%kind, %url, "element already present, treating as loaded");
            return Ok(());
        }

        match self.fetcher.fetch(kind, &url).await {
            Ok(()) => {
                debug!(%kind, %url, "resource loaded");
                Ok(())
            },
            Err(e) => {
                // Detach so a later attempt fetches again instead of
                // short-circuiting on the dead element.
                self.document.remove(kind, &url);
                Err(LoaderError::Resource {
                    kind,
                    url,
                    reason: e.to_string(),
                })
            },
        }
    }

    /// Fan out one task per URL so that siblings keep running after the
    /// aggregate has already returned a failure.
    async fn load_concurrently(&self, kind: ResourceKind, urls: &[String]) -> LoaderResult<()> {
        let handles = urls.iter().map(|url| {
            let loader = self.clone();
            let element = Element {
                kind,
                url: url.clone(),
            };
            let task = tokio::spawn(async move { loader.load_element(element).await });
            let url = url.clone();
            async move {
                task.await
                    .map_err(|e| LoaderError::Resource {
                        kind,
                        url,
                        reason: e.to_string(),
                    })
                    .and_then(|result| result)
            }
        });

        try_join_all(handles).await.map(|_| ())
    }
}
