//! Test fixtures for common dependency layouts.

use std::sync::Arc;

use lazydeps_core::{
    DependencyConfig, DependencyMap, Document, LoaderContext, ResourceFetcher, ResourceLoader,
};

use crate::mocks::MockFetcher;

/// `widget`: one stylesheet and two scripts that must run in order.
#[must_use]
pub fn widget_config() -> DependencyConfig {
    DependencyConfig::new()
        .with_css("widget.css")
        .with_js("a.js")
        .with_js("b.js")
        .sequential(true)
}

/// Three dependencies: `widget` (see [`widget_config`]), `chart` (two
/// parallel scripts) and `icons` (a lone stylesheet).
#[must_use]
pub fn test_deps() -> DependencyMap {
    DependencyMap::new()
        .with("widget", widget_config())
        .with(
            "chart",
            DependencyConfig::new()
                .with_js("chart-core.js")
                .with_js("chart-plugins.js"),
        )
        .with("icons", DependencyConfig::new().with_css("icons.css"))
}

/// A context backed by `fetcher` with nothing configured yet.
#[must_use]
pub fn unconfigured_context(fetcher: &MockFetcher) -> LoaderContext {
    let fetcher: Arc<dyn ResourceFetcher> = Arc::new(fetcher.clone());
    LoaderContext::new(ResourceLoader::new(Document::new(), fetcher))
}

/// A context backed by `fetcher` and configured with [`test_deps`].
#[must_use]
pub fn test_context(fetcher: &MockFetcher) -> LoaderContext {
    let ctx = unconfigured_context(fetcher);
    ctx.configure(test_deps());
    ctx
}

/// Install a test-writer `tracing` subscriber, honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
