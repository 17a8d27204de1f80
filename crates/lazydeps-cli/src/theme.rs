//! CLI theme and styling.

use colored::Colorize;

/// CLI theme configuration.
pub(crate) struct Theme;

impl Theme {
    /// Format a header.
    pub(crate) fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    /// Format a success message.
    pub(crate) fn success(text: &str) -> String {
        format!("{} {}", "✓".green(), text)
    }

    /// Format an error message.
    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "✗".red(), text.red())
    }

    /// Format a warning message.
    pub(crate) fn warning(text: &str) -> String {
        format!("{} {}", "!".yellow(), text.yellow())
    }

    /// Format a dimmed message.
    pub(crate) fn dimmed(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    /// Colored status label.
    pub(crate) fn status(status: lazydeps_core::DepStatus) -> String {
        use lazydeps_core::DepStatus;

        let label = status.to_string();
        match status {
            DepStatus::Loaded => format!("{}", label.green()),
            DepStatus::Loading => format!("{}", label.yellow()),
            DepStatus::Unloaded => format!("{}", label.dimmed()),
        }
    }
}
