//! Prelude module - commonly used types for convenient import.
//!
//! Use `use lazydeps_core::prelude::*;` to import all essential types.

// Context and coordination
pub use crate::{LoadCoordinator, LoaderContext};

// Configuration
pub use crate::{DepNames, DependencyConfig, DependencyMap};

// Status
pub use crate::{DepStatus, StatusChange, StatusReceiver, StatusSnapshot, StatusStore};

// Resources
pub use crate::{Document, FsFetcher, HttpFetcher, ResourceFetcher, ResourceKind, ResourceLoader};

// Hooks and scheduling
pub use crate::{CallbackHooks, IdleScheduler, LoadHooks, TokioIdleScheduler};

// Errors
pub use crate::{LoaderError, LoaderResult};
