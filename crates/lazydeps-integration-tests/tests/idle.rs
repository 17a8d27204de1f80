//! Integration tests for idle-time loading.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::Harness;
use lazydeps_core::{DepStatus, LoaderError, TokioIdleScheduler};
use lazydeps_test::ManualScheduler;

async fn wait_for_schedule(scheduler: &ManualScheduler) {
    while scheduler.pending() == 0 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_without_scheduler_loads_immediately() {
    let h = Harness::new();
    let status = h.coordinator.load_many_when_idle("widget").await.unwrap();
    assert_eq!(status.get("widget"), Some(&DepStatus::Loaded));
}

#[tokio::test(start_paused = true)]
async fn test_manual_scheduler_defers_until_idle() {
    let h = Harness::new();
    let scheduler = ManualScheduler::new();
    h.ctx.set_idle_scheduler(Some(Arc::new(scheduler.clone())));

    let coordinator = h.coordinator.clone();
    let handle =
        tokio::spawn(async move { coordinator.load_many_when_idle(["widget", "icons"]).await });

    wait_for_schedule(&scheduler).await;
    assert_eq!(h.fetcher.total_fetches(), 0);
    assert_eq!(h.ctx.status().get("widget"), Some(DepStatus::Unloaded));

    assert_eq!(scheduler.run_pending(), 1);
    let status = handle.await.unwrap().unwrap();
    assert_eq!(status.get("widget"), Some(&DepStatus::Loaded));
    assert_eq!(status.get("icons"), Some(&DepStatus::Loaded));
}

#[tokio::test(start_paused = true)]
async fn test_nothing_pending_skips_scheduler() {
    let h = Harness::new();
    let scheduler = ManualScheduler::new();
    h.ctx.set_idle_scheduler(Some(Arc::new(scheduler.clone())));

    let status = h
        .coordinator
        .load_many_when_idle(["ghost"])
        .await
        .unwrap();
    assert_eq!(status, h.coordinator.status());
    assert_eq!(scheduler.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_discarded_task_reports_scheduler_dropped() {
    let h = Harness::new();
    let scheduler = ManualScheduler::new();
    h.ctx.set_idle_scheduler(Some(Arc::new(scheduler.clone())));

    let coordinator = h.coordinator.clone();
    let handle = tokio::spawn(async move { coordinator.load_many_when_idle("widget").await });

    wait_for_schedule(&scheduler).await;
    assert_eq!(scheduler.discard_pending(), 1);

    let err = handle.await.unwrap().unwrap_err();
    assert_eq!(err, LoaderError::SchedulerDropped);
    assert_eq!(h.ctx.status().get("widget"), Some(DepStatus::Unloaded));
}

#[tokio::test(start_paused = true)]
async fn test_idle_failure_propagates() {
    let h = Harness::with_fetcher(
        lazydeps_test::MockFetcher::new()
            .with_delay(common::FETCH_DELAY)
            .failing("icons.css"),
    );
    h.ctx
        .set_idle_scheduler(Some(Arc::new(TokioIdleScheduler::default())));

    let err = h
        .coordinator
        .load_many_when_idle("icons")
        .await
        .unwrap_err();
    assert!(matches!(err, LoaderError::Resource { .. }));
    assert_eq!(h.ctx.status().get("icons"), Some(DepStatus::Unloaded));
}

#[tokio::test(start_paused = true)]
async fn test_tokio_idle_scheduler_waits_grace() {
    let h = Harness::new();
    h.ctx.set_idle_scheduler(Some(Arc::new(TokioIdleScheduler::new(
        Duration::from_millis(100),
    ))));

    let coordinator = h.coordinator.clone();
    let handle = tokio::spawn(async move { coordinator.load_many_when_idle("icons").await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.fetcher.total_fetches(), 0);

    let status = handle.await.unwrap().unwrap();
    assert_eq!(status.get("icons"), Some(&DepStatus::Loaded));
}
