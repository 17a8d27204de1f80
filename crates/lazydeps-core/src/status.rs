//! Observable dependency status store.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Default capacity of the status change channel.
pub const DEFAULT_STATUS_CAPACITY: usize = 256;

/// Lifecycle stage of a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepStatus {
    /// Not loaded; eligible to start a load.
    Unloaded,
    /// A load attempt is in flight.
    Loading,
    /// Successfully loaded.
    Loaded,
}

impl fmt::Display for DepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unloaded => write!(f, "UNLOADED"),
            Self::Loading => write!(f, "LOADING"),
            Self::Loaded => write!(f, "LOADED"),
        }
    }
}

/// Point-in-time copy of every status.
pub type StatusSnapshot = BTreeMap<String, DepStatus>;

/// A single status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Position of this change in the store's history.
    pub sequence: u64,
    /// Dependency name.
    pub name: String,
    /// Status before the change; `None` when the name was just registered.
    pub previous: Option<DepStatus>,
    /// Status after the change.
    pub current: DepStatus,
}

#[derive(Debug, Default)]
struct StoreState {
    statuses: StatusSnapshot,
    sequence: u64,
}

#[derive(Debug)]
struct StoreInner {
    state: RwLock<StoreState>,
    sender: broadcast::Sender<StatusChange>,
}

/// Shared name → status mapping.
///
/// Clones are cheap and observe the same statuses. Any holder can read or
/// subscribe; only the loader context and its coordinators write.
///
/// Changes are broadcast while the write lock is held, so subscribers see
/// transitions in the same order they were applied.
#[derive(Debug, Clone)]
pub struct StatusStore {
    inner: Arc<StoreInner>,
}

impl StatusStore {
    /// Create an empty store with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STATUS_CAPACITY)
    }

    /// Create an empty store with a specific channel capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(StoreState::default()),
                sender,
            }),
        }
    }

    /// Current status of `name`, or `None` if it is not configured.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<DepStatus> {
        self.read(|s| s.statuses.get(name).copied())
    }

    /// Copy of every status.
    #[must_use]
    pub fn snapshot(&self) -> StatusSnapshot {
        self.read(|s| s.statuses.clone())
    }

    /// Names currently in `status`, in name order.
    #[must_use]
    pub fn names_with(&self, status: DepStatus) -> Vec<String> {
        self.read(|s| {
            s.statuses
                .iter()
                .filter(|(_, st)| **st == status)
                .map(|(name, _)| name.clone())
                .collect()
        })
    }

    /// Number of tracked names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read(|s| s.statuses.len())
    }

    /// Whether no names are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read(|s| s.statuses.is_empty())
    }

    /// Subscribe to status changes from now on.
    #[must_use]
    pub fn subscribe(&self) -> StatusReceiver {
        StatusReceiver {
            receiver: self.inner.sender.subscribe(),
        }
    }

    /// Track `names` as unloaded. Names already tracked keep their status.
    pub(crate) fn register<'a>(&self, names: impl IntoIterator<Item = &'a str>) {
        let mut state = self.write();
        for name in names {
            if state.statuses.contains_key(name) {
                continue;
            }
            state.statuses.insert(name.to_owned(), DepStatus::Unloaded);
            self.emit(&mut state, name, None, DepStatus::Unloaded);
        }
    }

    /// Set the status of a tracked name.
    ///
    /// Unknown names are ignored. Returns `true` if the status changed.
    pub(crate) fn set(&self, name: &str, status: DepStatus) -> bool {
        let mut state = self.write();
        let Some(slot) = state.statuses.get_mut(name) else {
            trace!(dependency = %name, "ignoring status update for untracked name");
            return false;
        };
        let previous = *slot;
        if previous == status {
            return false;
        }
        *slot = status;
        self.emit(&mut state, name, Some(previous), status);
        true
    }

    /// Forget every name.
    pub(crate) fn clear(&self) {
        self.write().statuses.clear();
    }

    fn emit(
        &self,
        state: &mut StoreState,
        name: &str,
        previous: Option<DepStatus>,
        current: DepStatus,
    ) {
        state.sequence = state.sequence.wrapping_add(1);
        trace!(dependency = %name, ?previous, %current, "status changed");
        // No receivers is fine.
        let _ = self.inner.sender.send(StatusChange {
            sequence: state.sequence,
            name: name.to_owned(),
            previous,
            current,
        });
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let state = self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoreState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiver for status changes.
pub struct StatusReceiver {
    receiver: broadcast::Receiver<StatusChange>,
}

impl StatusReceiver {
    /// Receive the next change.
    ///
    /// Returns `None` once the store is gone. If this receiver fell behind,
    /// the missed changes are logged and skipped.
    pub async fn recv(&mut self) -> Option<StatusChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(skipped = count, "Status receiver lagged, changes dropped");
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Receive the next change without waiting.
    pub fn try_recv(&mut self) -> Option<StatusChange> {
        loop {
            match self.receiver.try_recv() {
                Ok(change) => return Some(change),
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    warn!(skipped = count, "Status receiver lagged, changes dropped");
                },
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }
}
