//! Lazydeps Telemetry - logging setup for lazydeps tools.
//!
//! Everything in lazydeps logs through `tracing`. This crate installs the
//! global subscriber: an [`EnvFilter`](tracing_subscriber::EnvFilter) built
//! from a level plus per-target directives, and one formatting layer writing
//! to stderr, stdout or a rolling file.
//!
//! # Example
//!
//! ```rust,no_run
//! use lazydeps_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), lazydeps_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("lazydeps_core=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!("logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging,
    setup_logging,
};
