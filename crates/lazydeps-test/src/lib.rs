//! Lazydeps Test - shared test utilities for lazydeps.
//!
//! This crate provides test doubles for the loader's seams and fixtures for
//! common dependency layouts. Use it as a dev-dependency:
//!
//! ```toml
//! [dev-dependencies]
//! lazydeps-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use lazydeps_test::{MockFetcher, test_context};
//!
//! #[tokio::test]
//! async fn test_widget_loads() {
//!     let fetcher = MockFetcher::new();
//!     let ctx = test_context(&fetcher);
//!     ctx.coordinator().unwrap().load_many("widget").await.unwrap();
//!     assert_eq!(fetcher.fetch_count("a.js"), 1);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
