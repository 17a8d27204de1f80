//! Idle-time scheduling.
//!
//! Deferred loads are handed to an [`IdleScheduler`], which decides when the
//! runtime has slack to run them. Scheduling only affects timing: every task
//! handed to a scheduler must eventually run.

use std::time::Duration;

use futures::future::BoxFuture;
use tracing::trace;

/// Runs tasks when the runtime is idle.
pub trait IdleScheduler: Send + Sync {
    /// Run `task` once the runtime is idle, or right away if idleness cannot
    /// be detected.
    fn schedule(&self, task: BoxFuture<'static, ()>);
}

/// Runs every task immediately.
///
/// This is the fallback for runtimes without an idle signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

impl IdleScheduler for ImmediateScheduler {
    fn schedule(&self, task: BoxFuture<'static, ()>) {
        tokio::spawn(task);
    }
}

/// Approximates idle time on a Tokio runtime.
///
/// The task first yields so that already-queued work gets to run, then waits
/// out a grace period before starting.
#[derive(Debug, Clone, Copy)]
pub struct TokioIdleScheduler {
    grace: Duration,
}

impl TokioIdleScheduler {
    /// Default grace period.
    pub const DEFAULT_GRACE: Duration = Duration::from_millis(50);

    /// Create a scheduler with the given grace period.
    #[must_use]
    pub fn new(grace: Duration) -> Self {
        Self { grace }
    }

    /// The grace period.
    #[must_use]
    pub fn grace(&self) -> Duration {
        self.grace
    }
}

impl Default for TokioIdleScheduler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_GRACE)
    }
}

impl IdleScheduler for TokioIdleScheduler {
    fn schedule(&self, task: BoxFuture<'static, ()>) {
        let grace = self.grace;
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            if !grace.is_zero() {
                tokio::time::sleep(grace).await;
            }
            trace!(grace_ms = grace.as_millis(), "running idle task");
            task.await;
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use futures::FutureExt;

    use super::*;

    #[tokio::test]
    async fn test_immediate_scheduler_runs_task() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        ImmediateScheduler.schedule(
            async move {
                let _ = tx.send(());
            }
            .boxed(),
        );
        rx.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_scheduler_waits_grace_period() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);

        TokioIdleScheduler::new(Duration::from_millis(100)).schedule(
            async move {
                flag.store(true, Ordering::SeqCst);
            }
            .boxed(),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!ran.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(ran.load(Ordering::SeqCst));
    }
}
