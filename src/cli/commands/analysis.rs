//! Analysis command implementation.
//!
//! The `avm-check analysis` command reads a JSON report and lists the
//! repositories in each summary category.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::cli::args::AnalysisArgs;
use crate::config::CheckConfig;
use crate::error::Result;
use crate::report::load_report;
use crate::scan::{analyze, Outcome};
use crate::ui::{format_age, Tone, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The analysis command implementation.
pub struct AnalysisCommand {
    working_dir: PathBuf,
    config: CheckConfig,
    args: AnalysisArgs,
}

impl AnalysisCommand {
    pub fn new(working_dir: &Path, config: CheckConfig, args: AnalysisArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            config,
            args,
        }
    }

    fn tracked_label(&self) -> String {
        let names: Vec<&str> = self
            .config
            .tracked_providers
            .keys()
            .map(String::as_str)
            .collect();
        names.join("/")
    }
}

impl Command for AnalysisCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let outcomes = load_report(&self.working_dir.join(&self.args.input))?;
        let now = Utc::now();
        let months = self.config.dormant_after_months;
        let analysis = analyze(&outcomes, now, months);

        ui.show_header("Detailed Analysis");
        ui.show_stat("Repositories processed", analysis.total, Tone::Good);
        ui.show_stat("Unreachable repositories", analysis.unreachable.len(), Tone::Bad);
        ui.show_stat(
            &format!("Not compatible with {}", self.tracked_label()),
            analysis.non_compliant.len(),
            Tone::Bad,
        );
        ui.show_stat(
            &format!("Dormant ({}+ months)", months),
            analysis.dormant.len(),
            Tone::Warning,
        );
        ui.message("");

        if !analysis.non_compliant.is_empty() {
            let entries: Vec<String> = analysis
                .non_compliant
                .iter()
                .map(|o| describe_non_compliant(o, now))
                .collect();
            ui.show_section("Not Compatible Repositories", Tone::Bad, &entries);
        }

        if !analysis.dormant.is_empty() {
            let entries: Vec<String> = analysis
                .dormant
                .iter()
                .map(|o| describe_dormant(o, now))
                .collect();
            ui.show_section("Dormant Repositories", Tone::Warning, &entries);
        }

        if !analysis.unreachable.is_empty() {
            let entries: Vec<String> = analysis
                .unreachable
                .iter()
                .map(|o| {
                    format!(
                        "{} [Error: {}]",
                        o.item.repo_url,
                        o.error.as_deref().unwrap_or("unknown")
                    )
                })
                .collect();
            ui.show_section("Unreachable Repositories", Tone::Bad, &entries);
        }

        ui.success("Analysis complete.");
        Ok(CommandResult::success())
    }
}

fn last_commit(outcome: &Outcome, now: DateTime<Utc>) -> String {
    match outcome.last_commit_date {
        Some(date) => format!("{} ({})", date.format("%Y-%m-%d"), format_age(date, now)),
        None => "unknown".to_string(),
    }
}

fn owner(outcome: &Outcome) -> &str {
    let handle = &outcome.item.primary_module_owner_gh_handle;
    if handle.is_empty() {
        "n/a"
    } else {
        handle
    }
}

fn describe_non_compliant(outcome: &Outcome, now: DateTime<Utc>) -> String {
    let failing: Vec<&str> = outcome
        .compatibility
        .iter()
        .filter(|(_, ok)| !**ok)
        .map(|(name, _)| name.as_str())
        .collect();
    format!(
        "{} (last commit: {}, author: {}, owner: {}, incompatible: {})",
        outcome.item.repo_url,
        last_commit(outcome, now),
        outcome.last_commit_author.as_deref().unwrap_or("unknown"),
        owner(outcome),
        failing.join(", ")
    )
}

fn describe_dormant(outcome: &Outcome, now: DateTime<Utc>) -> String {
    format!(
        "{} (last commit: {}, author: {}, owner: {})",
        outcome.item.repo_url,
        last_commit(outcome, now),
        outcome.last_commit_author.as_deref().unwrap_or("unknown"),
        owner(outcome)
    )
}
