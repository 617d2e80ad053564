//! Batch progress display and time formatting.

use std::time::Duration;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};

use crate::scan::{Outcome, ProgressSink};

const BAR_TEMPLATE: &str = "{msg} [{bar:40.cyan/dim}] {pos}/{len} ({elapsed})";

/// Progress bar advanced once per finished repository.
///
/// Cloning is cheap and every clone drives the same bar, so one can be handed
/// to the dispatcher while another finishes the display.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    bar: ProgressBar,
}

impl BatchProgress {
    /// A visible bar of `total` items. Drawn on stderr, and only when that
    /// is a terminal.
    pub fn new(total: usize, message: &str) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("# "));
        }
        bar.set_message(message.to_string());
        Self { bar }
    }

    /// A bar that counts but never draws.
    pub fn hidden(total: usize) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total as u64);
        Self { bar }
    }

    /// Items finished so far.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Remove the bar from the screen.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for BatchProgress {
    fn item_done(&self, outcome: &Outcome) {
        tracing::debug!("Done: {}", outcome.item.label());
        self.bar.inc(1);
    }
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs == 0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Format how long ago `timestamp` was, relative to `now`.
pub fn format_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = now.signed_duration_since(timestamp).num_days();
    let (count, unit) = match days {
        d if d < 1 => return "today".to_string(),
        1 => return "yesterday".to_string(),
        d if d < 30 => (d, "day"),
        d if d < 365 => (d / 30, "month"),
        d => (d / 365, "year"),
    };
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::WorkItem;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn hidden_bar_still_counts() {
        let progress = BatchProgress::hidden(3);
        let outcome = Outcome::new(WorkItem::from_url("https://example.com/a"));

        progress.item_done(&outcome);
        progress.clone().item_done(&outcome);

        assert_eq!(progress.position(), 2);
        progress.finish();
    }

    #[test]
    fn format_duration_ranges() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs_f64(5.3)), "5.3s");
        assert_eq!(format_duration(Duration::from_secs(192)), "3m 12s");
    }

    #[test]
    fn age_today_and_yesterday() {
        assert_eq!(format_age(now() - chrono::Duration::hours(3), now()), "today");
        assert_eq!(format_age(now() - chrono::Duration::days(1), now()), "yesterday");
    }

    #[test]
    fn age_in_days_months_years() {
        assert_eq!(format_age(now() - chrono::Duration::days(5), now()), "5 days ago");
        assert_eq!(format_age(now() - chrono::Duration::days(35), now()), "1 month ago");
        assert_eq!(format_age(now() - chrono::Duration::days(200), now()), "6 months ago");
        assert_eq!(format_age(now() - chrono::Duration::days(400), now()), "1 year ago");
        assert_eq!(format_age(now() - chrono::Duration::days(1000), now()), "2 years ago");
    }

    #[test]
    fn age_in_future_is_today() {
        assert_eq!(format_age(now() + chrono::Duration::days(2), now()), "today");
    }
}
