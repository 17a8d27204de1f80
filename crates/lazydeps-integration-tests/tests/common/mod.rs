//! Shared setup for integration tests.

use std::time::Duration;

use lazydeps_core::{LoadCoordinator, LoaderContext};
use lazydeps_test::{MockFetcher, RecordingHooks, init_test_tracing, test_context};

/// Per-fetch latency used across scenarios.
pub const FETCH_DELAY: Duration = Duration::from_millis(10);

/// A configured context with a slow mock fetcher and recording hooks.
#[allow(dead_code)]
pub struct Harness {
    /// The fetcher every resource goes through.
    pub fetcher: MockFetcher,
    /// Hooks attached to [`Harness::coordinator`].
    pub hooks: RecordingHooks,
    /// The context under test.
    pub ctx: LoaderContext,
    /// Coordinator carrying `hooks`.
    pub coordinator: LoadCoordinator,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        Self::with_fetcher(MockFetcher::new().with_delay(FETCH_DELAY))
    }

    pub fn with_fetcher(fetcher: MockFetcher) -> Self {
        init_test_tracing();
        let hooks = RecordingHooks::new();
        let ctx = test_context(&fetcher);
        let coordinator = ctx.coordinator().unwrap().with_hooks(hooks.clone());
        Self {
            fetcher,
            hooks,
            ctx,
            coordinator,
        }
    }
}
