//! The `index.html` transform.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{VersionLogError, VersionLogResult};
use crate::git::GitInfo;

/// Name the transform registers under.
pub const PLUGIN_NAME: &str = "version-log";

/// `strftime` format of the build date.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const LABEL_STYLE: &str = "color: #666";
const VALUE_STYLE: &str = "color: #2563eb; font-weight: bold";

/// Banner text options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionLogOptions {
    /// Banner title.
    pub message: String,
    /// Emoji printed before the title.
    pub emoji: String,
}

impl Default for VersionLogOptions {
    fn default() -> Self {
        Self {
            message: "Version info".to_owned(),
            emoji: "🚀".to_owned(),
        }
    }
}

impl VersionLogOptions {
    /// Set the banner title.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set the emoji.
    #[must_use]
    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = emoji.into();
        self
    }
}

/// Whether the current build is a production build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// Any non-production build. The transform is inactive.
    #[default]
    Development,
    /// `NODE_ENV=production`.
    Production,
}

impl BuildMode {
    /// Read `NODE_ENV` from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_node_env(std::env::var("NODE_ENV").ok().as_deref())
    }

    /// Production iff `node_env` is exactly `"production"`.
    #[must_use]
    pub fn from_node_env(node_env: Option<&str>) -> Self {
        if node_env == Some("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    /// Whether this is a production build.
    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Injects a console banner with build and git details before `</body>`.
///
/// Only production builds are transformed; in any other mode the HTML passes
/// through unchanged.
#[derive(Debug, Clone)]
pub struct VersionLogPlugin {
    options: VersionLogOptions,
    mode: BuildMode,
    repo_dir: PathBuf,
}

impl VersionLogPlugin {
    /// Create a plugin whose mode comes from `NODE_ENV` and which queries git
    /// in the current directory.
    #[must_use]
    pub fn new(options: VersionLogOptions) -> Self {
        Self {
            options,
            mode: BuildMode::from_env(),
            repo_dir: PathBuf::from("."),
        }
    }

    /// Override the build mode.
    #[must_use]
    pub fn with_mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    /// Query git in `dir` instead of the current directory.
    #[must_use]
    pub fn with_repo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.repo_dir = dir.into();
        self
    }

    /// Registered name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    /// The active build mode.
    #[must_use]
    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Transform an `index.html` document.
    ///
    /// Collects git details and the current local time, then injects the
    /// banner. Returns the input unchanged outside production builds.
    #[must_use]
    pub fn transform_index_html(&self, html: &str) -> String {
        if !self.mode.is_production() {
            debug!(mode = ?self.mode, "skipping version banner outside production");
            return html.to_owned();
        }
        let git = GitInfo::collect(&self.repo_dir);
        let build_date = chrono::Local::now().format(DATE_FORMAT).to_string();
        self.transform_with(html, &git, &build_date)
    }

    /// Inject the banner for explicit git details and build date.
    ///
    /// Only the first `</body>` gets the banner. HTML without one is
    /// returned unchanged.
    #[must_use]
    pub fn transform_with(&self, html: &str, git: &GitInfo, build_date: &str) -> String {
        let script = self.render_script(git, build_date);
        html.replacen("</body>", &format!("{script}</body>"), 1)
    }

    /// Read `input`, transform it, and write the result to `output`.
    ///
    /// Returns whether the banner was injected.
    ///
    /// # Errors
    ///
    /// Returns a [`VersionLogError`] if either file cannot be accessed.
    pub fn transform_file(&self, input: &Path, output: &Path) -> VersionLogResult<bool> {
        let html = std::fs::read_to_string(input).map_err(|e| VersionLogError::ReadError {
            path: input.display().to_string(),
            source: e,
        })?;

        let transformed = self.transform_index_html(&html);
        let injected = transformed != html;

        std::fs::write(output, transformed).map_err(|e| VersionLogError::WriteError {
            path: output.display().to_string(),
            source: e,
        })?;

        info!(
            input = %input.display(),
            output = %output.display(),
            injected,
            "version banner written"
        );
        Ok(injected)
    }

    fn render_script(&self, git: &GitInfo, build_date: &str) -> String {
        let title = js_escape(&format!("{} {}", self.options.emoji, self.options.message));
        let rows = [
            ("Build branch", git.branch.as_str()),
            ("Commit hash", git.commit_hash.as_str()),
            ("Commit date", git.commit_date.as_str()),
            ("Build date", build_date),
        ];

        let mut script = String::from("\n<script>\n");
        let _ = writeln!(script, "  console.log('{title}');");
        script.push_str("  console.log(\n");

        let last = rows.len().saturating_sub(1);
        for (i, (label, value)) in rows.iter().enumerate() {
            let value = js_escape(value);
            if i == last {
                let _ = writeln!(script, "    '%c{label}: %c{value}',");
            } else {
                let _ = writeln!(script, "    '%c{label}: %c{value}\\n' +");
            }
        }
        for i in 0..rows.len() {
            let sep = if i == last { "" } else { "," };
            let _ = writeln!(script, "    '{LABEL_STYLE}', '{VALUE_STYLE}'{sep}");
        }

        script.push_str("  );\n</script>\n");
        script
    }
}

/// Escape `s` for a single-quoted JavaScript string inside a `<script>` tag.
fn js_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '<' => out.push_str("\\x3C"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}
