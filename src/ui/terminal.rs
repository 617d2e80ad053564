//! Terminal UI.

use console::Term;
use std::io::Write;

use super::{should_use_colors, BatchProgress, CheckTheme, OutputMode, Tone, UserInterface};

/// Terminal UI writing to stdout.
pub struct TerminalUI {
    term: Term,
    theme: CheckTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a new terminal UI.
    pub fn new(mode: OutputMode, colors: bool) -> Self {
        Self {
            term: Term::stdout(),
            theme: CheckTheme::for_colors(colors),
            mode,
        }
    }

    fn styled(&self, tone: Tone, text: &str) -> String {
        let style = match tone {
            Tone::Good => &self.theme.success,
            Tone::Warning => &self.theme.warning,
            Tone::Bad => &self.theme.error,
        };
        style.apply_to(text).to_string()
    }
}

/// Create the terminal UI, honouring `--no-color` and `NO_COLOR`.
pub fn create_ui(mode: OutputMode, no_color: bool) -> Box<dyn UserInterface> {
    let colors = !no_color && should_use_colors();
    Box::new(TerminalUI::new(mode, colors))
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        writeln!(self.term, "{}", msg).ok();
    }

    fn success(&mut self, msg: &str) {
        writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
    }

    fn warning(&mut self, msg: &str) {
        writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
    }

    fn error(&mut self, msg: &str) {
        // Errors go to stderr.
        let mut stderr = Term::stderr();
        writeln!(stderr, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        writeln!(self.term, "\n{}", self.theme.format_header(title)).ok();
    }

    fn show_stat(&mut self, label: &str, value: usize, tone: Tone) {
        let label = self.styled(tone, &format!("{}:", label));
        writeln!(self.term, "  {} {}", label, value).ok();
    }

    fn show_section(&mut self, title: &str, tone: Tone, entries: &[String]) {
        let title = self.styled(tone, &format!("{}:", title));
        writeln!(self.term, "{}", title).ok();
        for entry in entries {
            writeln!(self.term, "  - {}", entry).ok();
        }
        writeln!(self.term).ok();
    }

    fn start_progress(&mut self, total: usize, message: &str) -> BatchProgress {
        if self.mode.shows_progress() {
            BatchProgress::new(total, message)
        } else {
            BatchProgress::hidden(total)
        }
    }
}
