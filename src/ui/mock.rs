//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.
//!
//! # Example
//!
//! ```
//! use avm_check::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.message("Processing 3 records using 5 workers...");
//! ui.warning("Run cancelled");
//!
//! assert!(ui.has_message("Processing 3 records"));
//! assert!(ui.has_warning("cancelled"));
//! ```

use super::{BatchProgress, OutputMode, Tone, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    sections: Vec<(String, Tone, Vec<String>)>,
    progress_totals: Vec<usize>,
}

impl MockUI {
    /// Create a new MockUI with Normal output mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a MockUI with a specific output mode.
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Sections shown, as `(title, tone, entries)`.
    pub fn sections(&self) -> &[(String, Tone, Vec<String>)] {
        &self.sections
    }

    /// Look up a section by title.
    pub fn section(&self, title: &str) -> Option<&[String]> {
        self.sections
            .iter()
            .find(|(t, _, _)| t == title)
            .map(|(_, _, entries)| entries.as_slice())
    }

    /// Totals of every progress bar started.
    pub fn progress_totals(&self) -> &[usize] {
        &self.progress_totals
    }

    /// Check if any message contains the given text.
    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_stat(&mut self, label: &str, value: usize, _tone: Tone) {
        self.messages.push(format!("{}: {}", label, value));
    }

    fn show_section(&mut self, title: &str, tone: Tone, entries: &[String]) {
        self.sections
            .push((title.to_string(), tone, entries.to_vec()));
    }

    fn start_progress(&mut self, total: usize, _message: &str) -> BatchProgress {
        self.progress_totals.push(total);
        BatchProgress::hidden(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_ui_captures_messages() {
        let mut ui = MockUI::new();

        ui.message("Hello");
        ui.success("Done");
        ui.warning("Careful");
        ui.error("Failed");
        ui.show_header("Detailed Analysis");

        assert_eq!(ui.messages(), ["Hello".to_string()]);
        assert_eq!(ui.successes(), ["Done".to_string()]);
        assert_eq!(ui.warnings(), ["Careful".to_string()]);
        assert!(ui.has_error("Fail"));
        assert_eq!(ui.headers(), ["Detailed Analysis".to_string()]);
    }

    #[test]
    fn mock_ui_captures_stats_as_messages() {
        let mut ui = MockUI::new();
        ui.show_stat("Dormant", 4, Tone::Warning);
        assert!(ui.has_message("Dormant: 4"));
    }

    #[test]
    fn mock_ui_captures_sections() {
        let mut ui = MockUI::new();
        ui.show_section("Unreachable Repositories", Tone::Bad, &["a".to_string()]);

        assert_eq!(ui.section("Unreachable Repositories"), Some(&["a".to_string()][..]));
        assert_eq!(ui.sections()[0].1, Tone::Bad);
        assert!(ui.section("Missing").is_none());
    }

    #[test]
    fn mock_ui_progress_is_hidden_but_recorded() {
        let mut ui = MockUI::with_mode(OutputMode::Quiet);
        let progress = ui.start_progress(7, "Processing modules");

        assert_eq!(ui.output_mode(), OutputMode::Quiet);
        assert_eq!(ui.progress_totals(), [7]);
        assert_eq!(progress.position(), 0);
    }
}
