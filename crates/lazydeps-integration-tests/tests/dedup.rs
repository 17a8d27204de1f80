//! Integration tests for in-flight deduplication.
//!
//! However many callers ask for a dependency while it is loading, exactly one
//! load attempt runs and every caller sees its outcome.

mod common;

use common::Harness;
use lazydeps_core::DepStatus;
use lazydeps_test::HookEvent;

#[tokio::test(start_paused = true)]
async fn test_concurrent_load_one_fetches_once() {
    let h = Harness::new();

    let (a, b) = tokio::join!(
        h.coordinator.load_one("widget"),
        h.coordinator.load_one("widget")
    );

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(h.fetcher.fetch_count("widget.css"), 1);
    assert_eq!(h.fetcher.fetch_count("a.js"), 1);
    assert_eq!(h.fetcher.fetch_count("b.js"), 1);
    assert_eq!(
        h.hooks.events(),
        vec![
            HookEvent::Loading("widget".into()),
            HookEvent::Loaded("widget".into()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_load_many_share_one_cycle() {
    let h = Harness::new();

    let (a, b) = tokio::join!(
        h.coordinator.load_many(["widget", "widget"]),
        h.coordinator.load_many("widget")
    );

    let a = a.unwrap();
    let b = b.unwrap();
    assert_eq!(a.get("widget"), Some(&DepStatus::Loaded));
    assert_eq!(b.get("widget"), Some(&DepStatus::Loaded));
    assert_eq!(h.fetcher.fetch_count("a.js"), 1);
    assert_eq!(h.hooks.loaded(), vec!["widget"]);
}

#[tokio::test(start_paused = true)]
async fn test_joiners_across_coordinators_share_attempt() {
    let h = Harness::new();
    let plain = h.ctx.coordinator().unwrap();

    let first = h.coordinator.load_one("chart");
    assert!(plain.is_in_flight("chart"));
    let second = plain.load_one("chart");

    first.await.unwrap();
    second.await.unwrap();

    assert_eq!(h.fetcher.fetch_count("chart-core.js"), 1);
    // Hooks belong to the coordinator that started the attempt.
    assert_eq!(h.hooks.loaded(), vec!["chart"]);
}

#[tokio::test(start_paused = true)]
async fn test_loaded_dependency_is_not_refetched() {
    let h = Harness::new();

    h.coordinator.load_many("icons").await.unwrap();
    let snapshot = h.coordinator.load_many("icons").await.unwrap();
    h.coordinator.load_one("icons").await.unwrap();

    assert_eq!(snapshot.get("icons"), Some(&DepStatus::Loaded));
    assert_eq!(h.fetcher.fetch_count("icons.css"), 1);
    assert_eq!(h.hooks.loaded(), vec!["icons"]);
}

#[tokio::test(start_paused = true)]
async fn test_waiters_share_failure() {
    let h = Harness::with_fetcher(
        lazydeps_test::MockFetcher::new()
            .with_delay(common::FETCH_DELAY)
            .failing("b.js"),
    );

    let (a, b) = tokio::join!(
        h.coordinator.load_one("widget"),
        h.coordinator.load_one("widget")
    );

    let a = a.unwrap_err();
    let b = b.unwrap_err();
    assert_eq!(a, b);
    assert_eq!(h.fetcher.fetch_count("b.js"), 1);
    assert_eq!(h.hooks.errors(), vec!["widget"]);
}
