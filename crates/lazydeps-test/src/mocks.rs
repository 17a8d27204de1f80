//! Mock implementations for testing.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;

use lazydeps_core::{
    FetchError, FetchResult, IdleScheduler, LoadHooks, LoaderError, ResourceFetcher, ResourceKind,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A fetch observed by [`MockFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    /// A fetch began.
    Started {
        /// Element kind.
        kind: ResourceKind,
        /// Requested URL.
        url: String,
    },
    /// A fetch settled.
    Finished {
        /// Element kind.
        kind: ResourceKind,
        /// Requested URL.
        url: String,
        /// Whether it succeeded.
        ok: bool,
    },
}

#[derive(Debug, Default)]
struct FetcherState {
    events: Vec<FetchEvent>,
    counts: HashMap<String, usize>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    active: usize,
    peak: usize,
}

/// Scriptable [`ResourceFetcher`] that records every fetch.
///
/// Each fetch sleeps for its configured delay (use a paused Tokio clock to
/// keep tests fast), then succeeds unless its URL is marked failing. Whether
/// a URL fails is decided when the fetch settles, so tests can flip it while
/// a load is in flight.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    state: Arc<Mutex<FetcherState>>,
}

impl MockFetcher {
    /// Create a fetcher where every URL succeeds immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every fetch by `delay`.
    #[must_use]
    pub fn with_delay(self, delay: Duration) -> Self {
        lock(&self.state).default_delay = delay;
        self
    }

    /// Delay fetches of `url` by `delay`, overriding the default.
    #[must_use]
    pub fn with_url_delay(self, url: impl Into<String>, delay: Duration) -> Self {
        lock(&self.state).delays.insert(url.into(), delay);
        self
    }

    /// Make fetches of `url` fail.
    #[must_use]
    pub fn failing(self, url: impl Into<String>) -> Self {
        self.set_failing(url, true);
        self
    }

    /// Mark or unmark `url` as failing.
    pub fn set_failing(&self, url: impl Into<String>, failing: bool) {
        let url = url.into();
        let mut state = lock(&self.state);
        if failing {
            state.failing.insert(url);
        } else {
            state.failing.remove(&url);
        }
    }

    /// Every recorded event, in order.
    #[must_use]
    pub fn events(&self) -> Vec<FetchEvent> {
        lock(&self.state).events.clone()
    }

    /// URLs in the order their fetches started.
    #[must_use]
    pub fn started_urls(&self) -> Vec<String> {
        lock(&self.state)
            .events
            .iter()
            .filter_map(|e| match e {
                FetchEvent::Started { url, .. } => Some(url.clone()),
                FetchEvent::Finished { .. } => None,
            })
            .collect()
    }

    /// URLs in the order their fetches settled.
    #[must_use]
    pub fn finished_urls(&self) -> Vec<String> {
        lock(&self.state)
            .events
            .iter()
            .filter_map(|e| match e {
                FetchEvent::Finished { url, .. } => Some(url.clone()),
                FetchEvent::Started { .. } => None,
            })
            .collect()
    }

    /// Number of fetches of `url`.
    #[must_use]
    pub fn fetch_count(&self, url: &str) -> usize {
        lock(&self.state).counts.get(url).copied().unwrap_or(0)
    }

    /// Number of fetches of any URL.
    #[must_use]
    pub fn total_fetches(&self) -> usize {
        lock(&self.state).counts.values().sum()
    }

    /// Highest number of fetches that were in flight at once.
    #[must_use]
    pub fn peak_concurrency(&self) -> usize {
        lock(&self.state).peak
    }
}

#[async_trait]
impl ResourceFetcher for MockFetcher {
    async fn fetch(&self, kind: ResourceKind, url: &str) -> FetchResult<()> {
        let delay = {
            let mut state = lock(&self.state);
            state.events.push(FetchEvent::Started {
                kind,
                url: url.to_owned(),
            });
            let count = state.counts.entry(url.to_owned()).or_insert(0);
            *count = count.saturating_add(1);
            state.active = state.active.saturating_add(1);
            state.peak = state.peak.max(state.active);
            state
                .delays
                .get(url)
                .copied()
                .unwrap_or(state.default_delay)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let ok = {
            let mut state = lock(&self.state);
            state.active = state.active.saturating_sub(1);
            let ok = !state.failing.contains(url);
            state.events.push(FetchEvent::Finished {
                kind,
                url: url.to_owned(),
                ok,
            });
            ok
        };

        if ok {
            Ok(())
        } else {
            Err(FetchError::NotFound(url.to_owned()))
        }
    }
}

/// A hook invocation observed by [`RecordingHooks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    /// `on_loading(name)`.
    Loading(String),
    /// `on_loaded(name)`.
    Loaded(String),
    /// `on_error(name, error)`, with the error rendered.
    Error(String, String),
}

/// [`LoadHooks`] that record every invocation.
#[derive(Debug, Clone, Default)]
pub struct RecordingHooks {
    events: Arc<Mutex<Vec<HookEvent>>>,
}

impl RecordingHooks {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded invocations, in order.
    #[must_use]
    pub fn events(&self) -> Vec<HookEvent> {
        lock(&self.events).clone()
    }

    /// Names passed to `on_loaded`, in order.
    #[must_use]
    pub fn loaded(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .filter_map(|e| match e {
                HookEvent::Loaded(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Names passed to `on_error`, in order.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .filter_map(|e| match e {
                HookEvent::Error(name, _) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

impl LoadHooks for RecordingHooks {
    fn on_loading(&self, name: &str) {
        lock(&self.events).push(HookEvent::Loading(name.to_owned()));
    }

    fn on_loaded(&self, name: &str) {
        lock(&self.events).push(HookEvent::Loaded(name.to_owned()));
    }

    fn on_error(&self, name: &str, error: &LoaderError) {
        lock(&self.events).push(HookEvent::Error(name.to_owned(), error.to_string()));
    }
}

/// [`IdleScheduler`] that queues tasks until the test says the runtime is
/// idle.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Arc<Mutex<Vec<BoxFuture<'static, ()>>>>,
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

impl ManualScheduler {
    /// Create a scheduler with an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Spawn every queued task. Returns how many were started.
    pub fn run_pending(&self) -> usize {
        let tasks = std::mem::take(&mut *lock(&self.queue));
        let count = tasks.len();
        for task in tasks {
            tokio::spawn(task);
        }
        count
    }

    /// Drop every queued task without running it. Returns how many were
    /// dropped.
    pub fn discard_pending(&self) -> usize {
        let tasks = std::mem::take(&mut *lock(&self.queue));
        tasks.len()
    }
}

impl IdleScheduler for ManualScheduler {
    fn schedule(&self, task: BoxFuture<'static, ()>) {
        lock(&self.queue).push(task);
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_mock_fetcher_records_and_fails() {
        let fetcher = MockFetcher::new()
            .with_delay(Duration::from_millis(5))
            .failing("bad.js");

        assert!(fetcher.fetch(ResourceKind::Script, "ok.js").await.is_ok());
        assert!(fetcher.fetch(ResourceKind::Script, "bad.js").await.is_err());

        assert_eq!(fetcher.started_urls(), vec!["ok.js", "bad.js"]);
        assert_eq!(fetcher.total_fetches(), 2);
        assert_eq!(
            fetcher.events().last(),
            Some(&FetchEvent::Finished {
                kind: ResourceKind::Script,
                url: "bad.js".into(),
                ok: false,
            })
        );

        fetcher.set_failing("bad.js", false);
        assert!(fetcher.fetch(ResourceKind::Script, "bad.js").await.is_ok());
        assert_eq!(fetcher.fetch_count("bad.js"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_fetcher_tracks_peak_concurrency() {
        let fetcher = MockFetcher::new().with_delay(Duration::from_millis(10));
        let (a, b) = tokio::join!(
            fetcher.fetch(ResourceKind::Script, "a.js"),
            fetcher.fetch(ResourceKind::Script, "b.js"),
        );
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(fetcher.peak_concurrency(), 2);
    }

    #[test]
    fn test_recording_hooks() {
        let hooks = RecordingHooks::new();
        hooks.on_loading("widget");
        hooks.on_loaded("widget");
        hooks.on_error("chart", &LoaderError::NotConfigured);

        assert_eq!(hooks.loaded(), vec!["widget"]);
        assert_eq!(hooks.errors(), vec!["chart"]);
        assert_eq!(hooks.events().len(), 3);
    }

    #[tokio::test]
    async fn test_manual_scheduler_defers_until_run() {
        let scheduler = ManualScheduler::new();
        let (tx, mut rx) = tokio::sync::oneshot::channel();
        scheduler.schedule(
            async move {
                let _ = tx.send(());
            }
            .boxed(),
        );

        assert_eq!(scheduler.pending(), 1);
        assert!(rx.try_recv().is_err());

        assert_eq!(scheduler.run_pending(), 1);
        rx.await.unwrap();
        assert_eq!(scheduler.pending(), 0);
    }
}
