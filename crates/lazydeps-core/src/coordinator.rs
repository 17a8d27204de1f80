//! Load coordinator: idempotent, deduplicated loading of named dependencies.
//!
//! Each name moves through `UNLOADED → LOADING → LOADED`, or back to
//! `UNLOADED` when an attempt fails. While a name is `LOADING` the context
//! holds exactly one in-flight entry for it; every caller asking for that
//! name in the meantime waits on the same entry and receives the same result.
//!
//! Attempts run on their own Tokio task, so dropping a caller's future never
//! strands a name in `LOADING`.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture, try_join_all};
use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, trace};

use crate::config::{DepNames, DependencyConfig};
use crate::context::LoaderContext;
use crate::error::{LoaderError, LoaderResult};
use crate::hooks::{LoadHooks, NoopHooks};
use crate::status::{DepStatus, StatusReceiver, StatusSnapshot};

/// Shared state of one load attempt.
pub(crate) struct InFlightLoad {
    attempt: u64,
    name: String,
    result: watch::Sender<Option<LoaderResult<()>>>,
}

impl InFlightLoad {
    fn new(name: &str, attempt: u64) -> Self {
        let (result, _) = watch::channel(None);
        Self {
            attempt,
            name: name.to_owned(),
            result,
        }
    }

    /// Future resolving to the attempt's outcome.
    fn wait(&self) -> BoxFuture<'static, LoaderResult<()>> {
        let mut rx = self.result.subscribe();
        let name = self.name.clone();
        async move {
            loop {
                let settled = rx.borrow_and_update().clone();
                if let Some(result) = settled {
                    return result;
                }
                if rx.changed().await.is_err() {
                    return Err(LoaderError::Aborted(name));
                }
            }
        }
        .boxed()
    }
}

/// Handle for loading configured dependencies.
///
/// Obtained from [`LoaderContext::coordinator`]. Coordinators are cheap to
/// clone; all coordinators of a context share its state, and differ only in
/// the hooks they carry. Hooks fire for attempts started through this
/// coordinator.
#[derive(Clone)]
pub struct LoadCoordinator {
    ctx: LoaderContext,
    hooks: Arc<dyn LoadHooks>,
}

impl std::fmt::Debug for LoadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadCoordinator")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl LoadCoordinator {
    pub(crate) fn new(ctx: LoaderContext) -> Self {
        Self {
            ctx,
            hooks: Arc::new(NoopHooks),
        }
    }

    /// Attach lifecycle hooks.
    #[must_use]
    pub fn with_hooks(self, hooks: impl LoadHooks + 'static) -> Self {
        self.with_shared_hooks(Arc::new(hooks))
    }

    /// Attach lifecycle hooks shared with other owners.
    #[must_use]
    pub fn with_shared_hooks(mut self, hooks: Arc<dyn LoadHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// The context this coordinator works on.
    #[must_use]
    pub fn context(&self) -> &LoaderContext {
        &self.ctx
    }

    /// Load one dependency.
    ///
    /// The attempt starts when this method is called, not when the returned
    /// future is first polled. If an attempt for `name` is already in flight
    /// the returned future waits on that attempt instead of starting another.
    /// If `name` is already loaded the future resolves immediately.
    ///
    /// # Errors
    ///
    /// The future yields [`LoaderError::UnknownDependency`] for unconfigured
    /// names (status is left untouched) and the attempt's error if loading
    /// fails.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime when a new attempt must be
    /// started.
    pub fn load_one(&self, name: &str) -> BoxFuture<'static, LoaderResult<()>> {
        let Some(config) = self.ctx.dependency(name) else {
            debug!(dependency = %name, "refusing to load unconfigured dependency");
            return future::ready(Err(LoaderError::UnknownDependency(name.to_owned()))).boxed();
        };

        let entry = {
            let mut in_flight = self.ctx.lock_in_flight();
            if let Some(existing) = in_flight.get(name) {
                debug!(dependency = %name, attempt = existing.attempt, "joining in-flight load");
                return existing.wait();
            }
            if self.ctx.status().get(name) == Some(DepStatus::Loaded) {
                trace!(dependency = %name, "already loaded");
                return future::ready(Ok(())).boxed();
            }

            let entry = Arc::new(InFlightLoad::new(name, self.ctx.next_attempt()));
            in_flight.insert(name.to_owned(), Arc::clone(&entry));
            self.ctx.status().set(name, DepStatus::Loading);
            entry
        };

        debug!(dependency = %name, attempt = entry.attempt, "starting load");
        let waiter = entry.wait();
        tokio::spawn(run_attempt(self.clone(), name.to_owned(), config, entry));
        waiter
    }

    /// Load several dependencies concurrently.
    ///
    /// Names that are unconfigured or already loaded are skipped. Returns the
    /// status of every dependency once all requested loads have settled.
    ///
    /// # Errors
    ///
    /// Returns the first failure. Loads of the other names keep running and
    /// update their status independently.
    pub async fn load_many(&self, names: impl Into<DepNames>) -> LoaderResult<StatusSnapshot> {
        let pending = self.pending(names.into());
        if pending.is_empty() {
            return Ok(self.status());
        }
        self.trigger(&pending).await?;
        Ok(self.status())
    }

    /// Like [`load_many`](Self::load_many), but starts the loads when the
    /// context's idle scheduler says the runtime is idle.
    ///
    /// Without an idle scheduler the loads start immediately.
    ///
    /// # Errors
    ///
    /// Same as [`load_many`](Self::load_many), plus
    /// [`LoaderError::SchedulerDropped`] if the scheduler discards the task.
    pub async fn load_many_when_idle(
        &self,
        names: impl Into<DepNames>,
    ) -> LoaderResult<StatusSnapshot> {
        let pending = self.pending(names.into());
        if pending.is_empty() {
            return Ok(self.status());
        }

        let Some(scheduler) = self.ctx.idle_scheduler() else {
            debug!(count = pending.len(), "no idle scheduler, loading immediately");
            self.trigger(&pending).await?;
            return Ok(self.status());
        };

        let (tx, rx) = oneshot::channel();
        let coordinator = self.clone();
        scheduler.schedule(
            async move {
                let result = coordinator.trigger(&pending).await;
                let _ = tx.send(result);
            }
            .boxed(),
        );

        rx.await.map_err(|_| LoaderError::SchedulerDropped)??;
        Ok(self.status())
    }

    /// Configured names that are currently unloaded.
    #[must_use]
    pub fn list_unloaded(&self) -> Vec<String> {
        self.ctx.status().names_with(DepStatus::Unloaded)
    }

    /// Snapshot of every status.
    #[must_use]
    pub fn status(&self) -> StatusSnapshot {
        self.ctx.status().snapshot()
    }

    /// Subscribe to status changes.
    #[must_use]
    pub fn subscribe(&self) -> StatusReceiver {
        self.ctx.status().subscribe()
    }

    /// Whether an attempt for `name` is in flight.
    #[must_use]
    pub fn is_in_flight(&self, name: &str) -> bool {
        self.ctx.lock_in_flight().contains_key(name)
    }

    /// Names worth triggering: configured and not yet loaded.
    fn pending(&self, names: DepNames) -> Vec<String> {
        let status = self.ctx.status();
        let mut pending = names.into_vec();
        pending.retain(|name| {
            matches!(
                status.get(name),
                Some(DepStatus::Unloaded | DepStatus::Loading)
            )
        });
        pending
    }

    async fn trigger(&self, names: &[String]) -> LoaderResult<()> {
        try_join_all(names.iter().map(|name| self.load_one(name)))
            .await
            .map(|_| ())
    }
}

async fn run_attempt(
    coordinator: LoadCoordinator,
    name: String,
    config: DependencyConfig,
    entry: Arc<InFlightLoad>,
) {
    let guard = AttemptGuard {
        coordinator,
        name,
        entry,
        settled: false,
    };

    guard.coordinator.hooks.on_loading(&guard.name);
    let result = guard
        .coordinator
        .ctx
        .loader()
        .load_dependency(&config)
        .await;
    guard.settle(result);
}

/// Settles an attempt exactly once, even if its task dies early.
struct AttemptGuard {
    coordinator: LoadCoordinator,
    name: String,
    entry: Arc<InFlightLoad>,
    settled: bool,
}

impl AttemptGuard {
    fn settle(mut self, result: LoaderResult<()>) {
        self.settled = true;
        self.finish(result, true);
    }

    fn finish(&self, result: LoaderResult<()>, run_hooks: bool) {
        let ctx = &self.coordinator.ctx;
        let attempt = self.entry.attempt;

        // Status and in-flight entry change together. After a reset the
        // entry belongs to nobody and the state is left alone.
        {
            let mut in_flight = ctx.lock_in_flight();
            let current = in_flight
                .get(&self.name)
                .is_some_and(|e| e.attempt == attempt);
            if current {
                in_flight.remove(&self.name);
                let status = if result.is_ok() {
                    DepStatus::Loaded
                } else {
                    DepStatus::Unloaded
                };
                ctx.status().set(&self.name, status);
            } else {
                debug!(dependency = %self.name, attempt, "attempt outlived its context state");
            }
        }

        match &result {
            Ok(()) => {
                info!(dependency = %self.name, attempt, "dependency loaded");
                if run_hooks {
                    self.coordinator.hooks.on_loaded(&self.name);
                }
            },
            Err(e) => {
                error!(dependency = %self.name, attempt, error = %e, "failed to load dependency");
                if run_hooks {
                    self.coordinator.hooks.on_error(&self.name, e);
                }
            },
        }

        self.entry.result.send_replace(Some(result));
    }
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let run_hooks = !std::thread::panicking();
        self.finish(Err(LoaderError::Aborted(self.name.clone())), run_hooks);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::config::DependencyMap;
    use crate::document::{Document, ResourceKind};
    use crate::error::{FetchError, FetchResult};
    use crate::fetch::ResourceFetcher;
    use crate::resource::ResourceLoader;

    #[derive(Default)]
    struct CountingFetcher {
        calls: AtomicUsize,
        fail: Mutex<bool>,
    }

    #[async_trait]
    impl ResourceFetcher for CountingFetcher {
        async fn fetch(&self, _kind: ResourceKind, url: &str) -> FetchResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            if *self.fail.lock().unwrap() {
                Err(FetchError::NotFound(url.to_owned()))
            } else {
                Ok(())
            }
        }
    }

    fn setup() -> (Arc<CountingFetcher>, LoadCoordinator) {
        let fetcher = Arc::new(CountingFetcher::default());
        let ctx = LoaderContext::new(ResourceLoader::new(
            Document::new(),
            Arc::clone(&fetcher) as Arc<dyn ResourceFetcher>,
        ));
        ctx.configure(
            DependencyMap::new().with("widget", DependencyConfig::new().with_js("widget.js")),
        );
        let coordinator = ctx.coordinator().unwrap();
        (fetcher, coordinator)
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_one_sets_loading_synchronously() {
        let (_fetcher, coordinator) = setup();
        let fut = coordinator.load_one("widget");
        assert_eq!(
            coordinator.status().get("widget"),
            Some(&DepStatus::Loading)
        );
        assert!(coordinator.is_in_flight("widget"));

        fut.await.unwrap();
        assert_eq!(coordinator.status().get("widget"), Some(&DepStatus::Loaded));
        assert!(!coordinator.is_in_flight("widget"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_calls_share_one_attempt() {
        let (fetcher, coordinator) = setup();
        let (a, b) = tokio::join!(coordinator.load_one("widget"), coordinator.load_one("widget"));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loaded_is_a_noop() {
        let (fetcher, coordinator) = setup();
        coordinator.load_one("widget").await.unwrap();
        coordinator.load_one("widget").await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reverts_and_allows_retry() {
        let (fetcher, coordinator) = setup();
        *fetcher.fail.lock().unwrap() = true;

        let err = coordinator.load_one("widget").await.unwrap_err();
        assert!(matches!(err, LoaderError::Resource { .. }));
        assert_eq!(
            coordinator.status().get("widget"),
            Some(&DepStatus::Unloaded)
        );
        assert!(!coordinator.is_in_flight("widget"));

        *fetcher.fail.lock().unwrap() = false;
        coordinator.load_one("widget").await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(coordinator.status().get("widget"), Some(&DepStatus::Loaded));
    }

    #[tokio::test]
    async fn test_unknown_name_leaves_status_untouched() {
        let (fetcher, coordinator) = setup();
        let before = coordinator.status();

        let err = coordinator.load_one("ghost").await.unwrap_err();
        assert_eq!(err, LoaderError::UnknownDependency("ghost".into()));

        let snapshot = coordinator.load_many(["ghost"]).await.unwrap();
        assert_eq!(snapshot, before);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_caller_does_not_strand_loading() {
        let (_fetcher, coordinator) = setup();
        drop(coordinator.load_one("widget"));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(coordinator.status().get("widget"), Some(&DepStatus::Loaded));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_attempt_leaves_new_state_alone() {
        let (_fetcher, coordinator) = setup();
        let ctx = coordinator.context().clone();
        let stale = coordinator.load_one("widget");

        ctx.reset();
        ctx.configure(
            DependencyMap::new().with("widget", DependencyConfig::new().with_js("widget.js")),
        );

        // The stale attempt still settles for its waiters.
        stale.await.unwrap();
        assert_eq!(ctx.status().get("widget"), Some(DepStatus::Unloaded));
    }
}
