//! Lazydeps Core - on-demand loading of named script and stylesheet bundles.
//!
//! This crate provides:
//! - A resource loader that injects `<script>` and `<link>` elements into a
//!   [`Document`] and waits for them to be fetched
//! - A load coordinator with per-name status tracking and in-flight
//!   deduplication
//! - An observable status store
//! - Idle-time scheduling for deferred loads
//!
//! # Architecture
//!
//! A [`LoaderContext`] owns the dependency configuration, the
//! [`StatusStore`] and the in-flight cache. Callers obtain a
//! [`LoadCoordinator`] from it and ask for names; the coordinator turns each
//! name into one load attempt at a time, no matter how many callers ask.
//!
//! Fetching is delegated to a [`ResourceFetcher`]: [`HttpFetcher`] for
//! remote assets, [`FsFetcher`] for a local static directory.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use lazydeps_core::prelude::*;
//!
//! # async fn example() -> LoaderResult<()> {
//! let loader = ResourceLoader::new(Document::new(), Arc::new(FsFetcher::new("static")));
//! let ctx = LoaderContext::new(loader);
//! ctx.configure(DependencyMap::new().with(
//!     "widget",
//!     DependencyConfig::new()
//!         .with_css("widget.css")
//!         .with_js("a.js")
//!         .with_js("b.js")
//!         .sequential(true),
//! ));
//!
//! let coordinator = ctx.coordinator()?;
//! let status = coordinator.load_many("widget").await?;
//! assert_eq!(status.get("widget"), Some(&DepStatus::Loaded));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod config;
mod context;
mod coordinator;
mod document;
mod error;
mod fetch;
mod hooks;
mod resource;
mod scheduler;
mod status;

pub use config::{DepNames, DependencyConfig, DependencyMap};
pub use context::LoaderContext;
pub use coordinator::LoadCoordinator;
pub use document::{Document, Element, ResourceKind};
pub use error::{FetchError, FetchResult, LoaderError, LoaderResult};
pub use fetch::{FsFetcher, HttpFetcher, ResourceFetcher};
pub use hooks::{CallbackHooks, LoadHooks, NoopHooks};
pub use resource::ResourceLoader;
pub use scheduler::{IdleScheduler, ImmediateScheduler, TokioIdleScheduler};
pub use status::{
    DEFAULT_STATUS_CAPACITY, DepStatus, StatusChange, StatusReceiver, StatusSnapshot, StatusStore,
};
