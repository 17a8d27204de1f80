//! Git introspection for the version banner.

use std::path::Path;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Placeholder used when git information is unavailable.
pub const UNKNOWN: &str = "unknown";

/// Branch and commit of the tree being built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitInfo {
    /// Current branch name.
    pub branch: String,
    /// Abbreviated commit hash.
    pub commit_hash: String,
    /// Commit date as `YYYY-MM-DD HH:MM:SS`.
    pub commit_date: String,
}

impl GitInfo {
    /// Query git in `dir`.
    ///
    /// If any query fails (no git binary, not a repository, detached
    /// worktree weirdness) every field falls back to `"unknown"`.
    #[must_use]
    pub fn collect(dir: &Path) -> Self {
        let queried = (|| {
            Some(Self {
                branch: git(dir, &["rev-parse", "--abbrev-ref", "HEAD"])?,
                commit_hash: git(dir, &["rev-parse", "--short", "HEAD"])?,
                commit_date: git(
                    dir,
                    &[
                        "log",
                        "-1",
                        "--format=%cd",
                        "--date=format:%Y-%m-%d %H:%M:%S",
                    ],
                )?,
            })
        })();

        queried.unwrap_or_else(|| {
            debug!(dir = %dir.display(), "git information unavailable");
            Self::unknown()
        })
    }

    /// Info with every field set to `"unknown"`.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            branch: UNKNOWN.to_owned(),
            commit_hash: UNKNOWN.to_owned(),
            commit_date: UNKNOWN.to_owned(),
        }
    }
}

fn git(dir: &Path, args: &[&str]) -> Option<String> {
    Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_owned())
}
