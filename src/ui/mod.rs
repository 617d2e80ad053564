//! Terminal output.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for real terminal usage
//! - [`MockUI`] capturing output for tests
//! - [`BatchProgress`] progress bar for a scan run
//!
//! # Example
//!
//! ```
//! use avm_check::ui::{MockUI, Tone, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.show_stat("Unreachable repositories", 2, Tone::Bad);
//! ui.success("Analysis complete.");
//!
//! assert!(ui.has_message("Unreachable repositories: 2"));
//! assert!(ui.has_success("Analysis complete."));
//! ```

pub mod mock;
pub mod progress;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use progress::{format_age, format_duration, BatchProgress};
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, CheckTheme};

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Progress bars and status.
    #[default]
    Normal,
    /// Status only.
    Quiet,
}

impl OutputMode {
    /// Check if this mode shows progress bars.
    pub fn shows_progress(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

/// How a figure or section should read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Warning,
    Bad,
}

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show a `label: value` line.
    fn show_stat(&mut self, label: &str, value: usize, tone: Tone);

    /// Show a titled list.
    fn show_section(&mut self, title: &str, tone: Tone, entries: &[String]);

    /// Start a progress bar for `total` items.
    fn start_progress(&mut self, total: usize, message: &str) -> BatchProgress;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_mode_default_is_normal() {
        assert_eq!(OutputMode::default(), OutputMode::Normal);
    }

    #[test]
    fn quiet_hides_progress() {
        assert!(OutputMode::Normal.shows_progress());
        assert!(!OutputMode::Quiet.shows_progress());
    }
}
