//! Run summaries: unreachable, non-compliant and dormant repositories.
//!
//! The categories overlap. Each is worked out independently from the
//! outcome list, so one repository can count toward all three.

use chrono::{DateTime, Months, Utc};
use serde::Serialize;

use super::outcome::Outcome;

/// Default dormancy threshold in calendar months.
pub const DEFAULT_DORMANT_MONTHS: u32 = 6;

/// Category counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub unreachable: usize,
    pub non_compliant: usize,
    pub dormant: usize,
}

/// The outcomes behind each [`Summary`] count.
#[derive(Debug, Clone, Default)]
pub struct Analysis<'a> {
    pub total: usize,
    pub non_compliant: Vec<&'a Outcome>,
    pub dormant: Vec<&'a Outcome>,
    pub unreachable: Vec<&'a Outcome>,
}

impl Analysis<'_> {
    pub fn summary(&self) -> Summary {
        Summary {
            total: self.total,
            unreachable: self.unreachable.len(),
            non_compliant: self.non_compliant.len(),
            dormant: self.dormant.len(),
        }
    }
}

/// Commits strictly before this instant count as dormant.
///
/// Falls back to the earliest representable instant if the subtraction
/// underflows, which makes nothing dormant.
pub fn dormancy_cutoff(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Count each category.
pub fn summarize(outcomes: &[Outcome], now: DateTime<Utc>, dormant_after_months: u32) -> Summary {
    analyze(outcomes, now, dormant_after_months).summary()
}

/// Sort outcomes into categories, preserving input order within each.
pub fn analyze(outcomes: &[Outcome], now: DateTime<Utc>, dormant_after_months: u32) -> Analysis<'_> {
    let cutoff = dormancy_cutoff(now, dormant_after_months);
    Analysis {
        total: outcomes.len(),
        non_compliant: outcomes.iter().filter(|o| o.is_non_compliant()).collect(),
        dormant: outcomes.iter().filter(|o| o.is_dormant_since(cutoff)).collect(),
        unreachable: outcomes.iter().filter(|o| o.is_unreachable()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{ErrorKind, WorkItem};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn outcome(url: &str) -> Outcome {
        Outcome::new(WorkItem::from_url(url))
    }

    fn committed(url: &str, date: DateTime<Utc>) -> Outcome {
        let mut o = outcome(url);
        o.last_commit_date = Some(date);
        o
    }

    #[test]
    fn just_inside_threshold_is_not_dormant() {
        let six_months_ago = now() - Months::new(6);
        let outcomes = vec![committed("a", six_months_ago + Duration::days(1))];

        assert_eq!(summarize(&outcomes, now(), 6).dormant, 0);
    }

    #[test]
    fn just_past_threshold_is_dormant() {
        let six_months_ago = now() - Months::new(6);
        let outcomes = vec![committed("a", six_months_ago - Duration::days(1))];

        assert_eq!(summarize(&outcomes, now(), 6).dormant, 1);
    }

    #[test]
    fn exactly_at_cutoff_is_not_dormant() {
        let outcomes = vec![committed("a", dormancy_cutoff(now(), 6))];
        assert_eq!(summarize(&outcomes, now(), 6).dormant, 0);
    }

    #[test]
    fn missing_commit_date_is_not_dormant() {
        assert_eq!(summarize(&[outcome("a")], now(), 6).dormant, 0);
    }

    #[test]
    fn categories_overlap() {
        let mut o = committed("a", now() - Months::new(12));
        o.compatibility.insert("azurerm".into(), false);
        o.error_kind = Some(ErrorKind::AcquisitionFailed);

        let summary = summarize(&[o], now(), 6);

        assert_eq!(
            summary,
            Summary {
                total: 1,
                unreachable: 1,
                non_compliant: 1,
                dormant: 1,
            }
        );
    }

    #[test]
    fn counts_each_category_independently() {
        let mut unreachable = outcome("u");
        unreachable.record_failure(ErrorKind::AcquisitionFailed, "failed to clone repo 'u'");

        let mut extraction = outcome("e");
        extraction.record_failure(ErrorKind::ExtractionFailed, "failed to parse Terraform module");

        let mut mixed = outcome("m");
        mixed.compatibility.insert("azurerm".into(), true);
        mixed.compatibility.insert("azapi".into(), false);

        let mut compliant = committed("c", now());
        compliant.compatibility.insert("azurerm".into(), true);

        let outcomes = vec![unreachable, extraction, mixed, compliant];
        let summary = summarize(&outcomes, now(), 6);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.unreachable, 1);
        assert_eq!(summary.non_compliant, 1);
        assert_eq!(summary.dormant, 0);
    }

    #[test]
    fn analyze_lists_outcomes_in_input_order() {
        let mut a = outcome("a");
        a.compatibility.insert("azurerm".into(), false);
        let b = outcome("b");
        let mut c = outcome("c");
        c.compatibility.insert("azapi".into(), false);
        let outcomes = vec![a, b, c];

        let analysis = analyze(&outcomes, now(), 6);

        let urls: Vec<_> = analysis
            .non_compliant
            .iter()
            .map(|o| o.item.repo_url.as_str())
            .collect();
        assert_eq!(urls, vec!["a", "c"]);
        assert_eq!(analysis.summary().non_compliant, 2);
    }

    #[test]
    fn empty_input() {
        assert_eq!(summarize(&[], now(), 6), Summary::default());
    }
}
