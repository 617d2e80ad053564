//! Process command implementation.
//!
//! The `avm-check process` command scans every repository in the module
//! index, writes the JSON report and prints a summary.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;

use crate::cli::args::ProcessArgs;
use crate::config::CheckConfig;
use crate::error::Result;
use crate::report::write_report;
use crate::scan::{summarize, CancelToken, Dispatcher, ItemPipeline};
use crate::source::{read_work_items, SourceFetcher};
use crate::ui::{format_duration, Tone, UserInterface};

use super::dispatcher::{Command, CommandResult, EXIT_INTERRUPTED};
use super::update_source::DOWNLOAD_TIMEOUT;

/// The process command implementation.
pub struct ProcessCommand {
    working_dir: PathBuf,
    config: CheckConfig,
    args: ProcessArgs,
    cancel: CancelToken,
}

impl ProcessCommand {
    pub fn new(working_dir: &Path, config: CheckConfig, args: ProcessArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            config,
            args,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn workers(&self) -> usize {
        self.args.workers.unwrap_or(self.config.workers).max(1)
    }
}

impl Command for ProcessCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let input = self.working_dir.join(&self.args.input);
        let output = self.working_dir.join(&self.args.output);

        if self.args.download {
            let url = self.args.url.as_deref().unwrap_or(&self.config.source_url);
            SourceFetcher::new(DOWNLOAD_TIMEOUT)?.download(url, &input)?;
            ui.success("Downloaded CSV file before processing.");
        }

        let items = read_work_items(&input)?;
        let workers = self.workers();
        ui.message(&format!(
            "Processing {} records using {} workers...",
            items.len(),
            workers
        ));

        let pipeline =
            ItemPipeline::from_config(&self.config, self.cancel.clone()).quiet(self.args.quiet);
        let progress = ui.start_progress(items.len(), "Processing modules");
        let started = Instant::now();

        let outcomes = Dispatcher::new(workers, self.cancel.clone()).run(items, &pipeline, &progress);
        progress.finish();

        write_report(&output, &outcomes)?;

        let summary = summarize(&outcomes, Utc::now(), self.config.dormant_after_months);
        ui.message("");
        ui.success(&format!(
            "Processing complete in {}. Results written to '{}'",
            format_duration(started.elapsed()),
            self.args.output.display()
        ));
        ui.message("Summary:");
        ui.show_stat("Unreachable repos", summary.unreachable, Tone::Bad);
        ui.show_stat("Not-compatible repos", summary.non_compliant, Tone::Bad);
        ui.show_stat(
            &format!("Dormant repos ({}+ months)", self.config.dormant_after_months),
            summary.dormant,
            Tone::Warning,
        );

        if self.cancel.is_cancelled() {
            ui.warning("Run was cancelled; unprocessed repositories are marked as cancelled in the report.");
            return Ok(CommandResult::failure(EXIT_INTERRUPTED));
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetrySettings;
    use crate::report::load_report;
    use crate::scan::acquire::tests::{create_repo, file_url, GIT_LOCK};
    use crate::scan::ErrorKind;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn repo(parent: &Path, name: &str, versions_tf: &str) -> String {
        file_url(&create_repo(parent, name, &[("versions.tf", versions_tf)]))
    }

    fn config(temp: &Path) -> CheckConfig {
        CheckConfig {
            retry: RetrySettings {
                attempts: 1,
                delay_secs: 0,
            },
            scratch_dir: Some(temp.join("scratch")),
            ..Default::default()
        }
    }

    #[test]
    fn processes_index_and_writes_report() {
        let _lock = GIT_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let compliant = repo(
            temp.path(),
            "compliant",
            "terraform {\n  required_providers {\n    azurerm = { version = \">= 3.116, < 5.0\" }\n  }\n}\n",
        );
        let outdated = repo(
            temp.path(),
            "outdated",
            "terraform {\n  required_providers {\n    azurerm = { version = \"~> 3.0\" }\n  }\n}\n",
        );
        let missing = file_url(&temp.path().join("missing"));
        std::fs::write(
            temp.path().join("modules.csv"),
            format!(
                "ModuleName,RepoURL\ncompliant,{}\noutdated,{}\nmissing,{}\n",
                compliant, outdated, missing
            ),
        )
        .unwrap();

        let cmd = ProcessCommand::new(
            temp.path(),
            config(temp.path()),
            ProcessArgs {
                workers: Some(2),
                quiet: true,
                ..Default::default()
            },
        );
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("Processing 3 records using 2 workers..."));
        assert!(ui.has_message("Unreachable repos: 1"));
        assert!(ui.has_message("Not-compatible repos: 1"));
        assert!(ui.has_message("Dormant repos (6+ months): 0"));
        assert_eq!(ui.progress_totals(), [3]);

        let outcomes = load_report(&temp.path().join("output.json")).unwrap();
        let names: Vec<_> = outcomes.iter().map(|o| o.item.module_name.as_str()).collect();
        assert_eq!(names, vec!["compliant", "outdated", "missing"]);
        assert_eq!(outcomes[0].compatibility.get("azurerm"), Some(&true));
        assert_eq!(outcomes[0].last_commit_author.as_deref(), Some("Test Author"));
        assert_eq!(outcomes[1].compatibility.get("azurerm"), Some(&false));
        assert_eq!(outcomes[2].error_kind, Some(ErrorKind::AcquisitionFailed));

        let leftovers = std::fs::read_dir(temp.path().join("scratch"))
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn cancelled_run_still_writes_every_item() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("modules.csv"),
            "RepoURL\nhttps://example.com/a\nhttps://example.com/b\n",
        )
        .unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        let cmd = ProcessCommand::new(temp.path(), config(temp.path()), ProcessArgs::default())
            .with_cancel(cancel);
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, EXIT_INTERRUPTED);
        assert!(ui.has_warning("cancelled"));
        let outcomes = load_report(&temp.path().join("output.json")).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| o.error_kind == Some(ErrorKind::Cancelled)));
    }

    #[test]
    fn missing_input_is_an_error() {
        let temp = TempDir::new().unwrap();
        let cmd = ProcessCommand::new(temp.path(), config(temp.path()), ProcessArgs::default());
        let mut ui = MockUI::new();

        let err = cmd.execute(&mut ui).unwrap_err();

        assert!(err.to_string().contains("modules.csv"));
    }

    #[test]
    fn workers_flag_overrides_config() {
        let temp = TempDir::new().unwrap();
        let mut config = config(temp.path());
        config.workers = 9;

        let from_config = ProcessCommand::new(temp.path(), config.clone(), ProcessArgs::default());
        assert_eq!(from_config.workers(), 9);

        let from_flag = ProcessCommand::new(
            temp.path(),
            config,
            ProcessArgs {
                workers: Some(0),
                ..Default::default()
            },
        );
        assert_eq!(from_flag.workers(), 1);
    }
}
