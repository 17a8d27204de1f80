//! Lazydeps Version Log - a build-time `index.html` transform that prints
//! build and git details to the browser console.
//!
//! The transform is active only for production builds (`NODE_ENV=production`).
//! It injects a `<script>` before the first `</body>` that logs the branch,
//! abbreviated commit hash, commit date and build date. Git failures degrade
//! to `"unknown"` rather than failing the build.
//!
//! # Example
//!
//! ```rust
//! use lazydeps_version_log::{BuildMode, GitInfo, VersionLogOptions, VersionLogPlugin};
//!
//! let plugin = VersionLogPlugin::new(VersionLogOptions::default().with_message("Release"))
//!     .with_mode(BuildMode::Production);
//!
//! let html = plugin.transform_with("<body></body>", &GitInfo::unknown(), "2026-01-01 00:00:00");
//! assert!(html.contains("Release"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod git;
mod plugin;

pub use error::{VersionLogError, VersionLogResult};
pub use git::{GitInfo, UNKNOWN};
pub use plugin::{BuildMode, DATE_FORMAT, PLUGIN_NAME, VersionLogOptions, VersionLogPlugin};
