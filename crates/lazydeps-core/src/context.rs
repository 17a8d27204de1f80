//! The loader context: configuration, status and in-flight state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, info};

use crate::config::{DependencyConfig, DependencyMap};
use crate::coordinator::{InFlightLoad, LoadCoordinator};
use crate::document::Document;
use crate::error::{LoaderError, LoaderResult};
use crate::resource::ResourceLoader;
use crate::scheduler::IdleScheduler;
use crate::status::StatusStore;

pub(crate) struct ContextInner {
    dependencies: RwLock<Option<DependencyMap>>,
    status: StatusStore,
    in_flight: Mutex<HashMap<String, Arc<InFlightLoad>>>,
    loader: ResourceLoader,
    scheduler: RwLock<Option<Arc<dyn IdleScheduler>>>,
    next_attempt: AtomicU64,
}

/// Owner of all loader state.
///
/// One context is created per application and shared by cloning; clones
/// refer to the same configuration, statuses and in-flight loads. Callers
/// obtain a [`LoadCoordinator`] from it to trigger loads.
///
/// ```rust
/// use std::sync::Arc;
/// use lazydeps_core::{
///     DependencyConfig, DependencyMap, Document, FsFetcher, LoaderContext, ResourceLoader,
/// };
///
/// let loader = ResourceLoader::new(Document::new(), Arc::new(FsFetcher::new("static")));
/// let ctx = LoaderContext::new(loader);
/// assert!(ctx.coordinator().is_err());
///
/// ctx.configure(DependencyMap::new().with(
///     "widget",
///     DependencyConfig::new().with_css("widget.css").with_js("widget.js"),
/// ));
/// let coordinator = ctx.coordinator().unwrap();
/// assert_eq!(coordinator.list_unloaded(), vec!["widget".to_string()]);
/// ```
#[derive(Clone)]
pub struct LoaderContext {
    inner: Arc<ContextInner>,
}

impl std::fmt::Debug for LoaderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderContext")
            .field("configured", &self.is_configured())
            .field("status", &self.inner.status.snapshot())
            .finish_non_exhaustive()
    }
}

impl LoaderContext {
    /// Create an unconfigured context around a resource loader.
    #[must_use]
    pub fn new(loader: ResourceLoader) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                dependencies: RwLock::new(None),
                status: StatusStore::new(),
                in_flight: Mutex::new(HashMap::new()),
                loader,
                scheduler: RwLock::new(None),
                next_attempt: AtomicU64::new(1),
            }),
        }
    }

    /// Builder-style [`set_idle_scheduler`](Self::set_idle_scheduler).
    #[must_use]
    pub fn with_idle_scheduler(self, scheduler: Arc<dyn IdleScheduler>) -> Self {
        self.set_idle_scheduler(Some(scheduler));
        self
    }

    /// Install or remove the idle scheduler used by
    /// [`LoadCoordinator::load_many_when_idle`].
    ///
    /// Without one, deferred loads run immediately.
    pub fn set_idle_scheduler(&self, scheduler: Option<Arc<dyn IdleScheduler>>) {
        *self
            .inner
            .scheduler
            .write()
            .unwrap_or_else(PoisonError::into_inner) = scheduler;
    }

    /// Merge `dependencies` into the configuration.
    ///
    /// Entries replace same-named existing entries. Names seen for the first
    /// time start out unloaded; names already tracked keep their status.
    pub fn configure(&self, dependencies: DependencyMap) {
        let mut guard = self
            .inner
            .dependencies
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let merged = guard.get_or_insert_with(DependencyMap::new);
        let added = merged.merge(dependencies);
        self.inner.status.register(merged.names());

        info!(
            total = merged.len(),
            added = added.len(),
            "dependencies configured"
        );
    }

    /// Whether [`configure`](Self::configure) has been called since creation
    /// or the last reset.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner
            .dependencies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Configuration of one dependency.
    #[must_use]
    pub fn dependency(&self, name: &str) -> Option<DependencyConfig> {
        self.inner
            .dependencies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|deps| deps.get(name).cloned())
    }

    /// Copy of the full configuration.
    #[must_use]
    pub fn dependencies(&self) -> DependencyMap {
        self.inner
            .dependencies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .unwrap_or_default()
    }

    /// The shared status store.
    #[must_use]
    pub fn status(&self) -> &StatusStore {
        &self.inner.status
    }

    /// The document resources are injected into.
    #[must_use]
    pub fn document(&self) -> &Document {
        self.inner.loader.document()
    }

    /// Obtain a coordinator with no hooks.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::NotConfigured`] if no configuration has been set.
    pub fn coordinator(&self) -> LoaderResult<LoadCoordinator> {
        if !self.is_configured() {
            return Err(LoaderError::NotConfigured);
        }
        Ok(LoadCoordinator::new(self.clone()))
    }

    /// Drop all configuration, statuses, in-flight entries and injected
    /// elements.
    ///
    /// Loads still running finish in the background but no longer touch the
    /// context's state.
    pub fn reset(&self) {
        let abandoned = {
            let mut in_flight = self.lock_in_flight();
            let count = in_flight.len();
            in_flight.clear();
            count
        };
        *self
            .inner
            .dependencies
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.inner.status.clear();
        self.inner.loader.document().clear();
        debug!(abandoned, "loader context reset");
    }

    pub(crate) fn loader(&self) -> &ResourceLoader {
        &self.inner.loader
    }

    pub(crate) fn idle_scheduler(&self) -> Option<Arc<dyn IdleScheduler>> {
        self.inner
            .scheduler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<String, Arc<InFlightLoad>>> {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn next_attempt(&self) -> u64 {
        self.inner.next_attempt.fetch_add(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::document::ResourceKind;
    use crate::error::FetchResult;
    use crate::fetch::ResourceFetcher;
    use crate::status::DepStatus;

    struct AlwaysReady;

    #[async_trait]
    impl ResourceFetcher for AlwaysReady {
        async fn fetch(&self, _kind: ResourceKind, _url: &str) -> FetchResult<()> {
            Ok(())
        }
    }

    fn context() -> LoaderContext {
        LoaderContext::new(ResourceLoader::new(Document::new(), Arc::new(AlwaysReady)))
    }

    #[test]
    fn test_coordinator_requires_configuration() {
        let ctx = context();
        assert!(matches!(ctx.coordinator(), Err(LoaderError::NotConfigured)));

        // An empty configuration still counts as configured.
        ctx.configure(DependencyMap::new());
        assert!(ctx.coordinator().is_ok());
    }

    #[test]
    fn test_configure_merges_and_preserves_status() {
        let ctx = context();
        ctx.configure(DependencyMap::new().with("widget", DependencyConfig::new().with_js("a.js")));
        ctx.status().set("widget", DepStatus::Loaded);

        ctx.configure(
            DependencyMap::new()
                .with("widget", DependencyConfig::new().with_js("b.js"))
                .with("chart", DependencyConfig::new().with_js("chart.js")),
        );

        assert_eq!(ctx.status().get("widget"), Some(DepStatus::Loaded));
        assert_eq!(ctx.status().get("chart"), Some(DepStatus::Unloaded));
        assert_eq!(
            ctx.dependency("widget").unwrap().js,
            vec!["b.js".to_string()]
        );
        assert_eq!(ctx.dependencies().len(), 2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let ctx = context();
        ctx.configure(DependencyMap::new().with("widget", DependencyConfig::new()));
        ctx.document().append(crate::document::Element::script("a.js"));

        ctx.reset();

        assert!(!ctx.is_configured());
        assert!(ctx.status().is_empty());
        assert!(ctx.document().elements().is_empty());
        assert!(ctx.dependency("widget").is_none());
    }

    #[test]
    fn test_attempt_ids_increase() {
        let ctx = context();
        let a = ctx.next_attempt();
        let b = ctx.next_attempt();
        assert!(b > a);
    }
}
