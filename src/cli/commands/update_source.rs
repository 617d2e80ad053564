//! Update-source command implementation.
//!
//! The `avm-check update-source` command downloads the module index CSV.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::args::UpdateSourceArgs;
use crate::config::CheckConfig;
use crate::error::Result;
use crate::source::{DownloadStatus, SourceFetcher};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Request timeout for index downloads.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// The update-source command implementation.
pub struct UpdateSourceCommand {
    working_dir: PathBuf,
    config: CheckConfig,
    args: UpdateSourceArgs,
}

impl UpdateSourceCommand {
    pub fn new(working_dir: &Path, config: CheckConfig, args: UpdateSourceArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            config,
            args,
        }
    }

    fn url(&self) -> &str {
        self.args.url.as_deref().unwrap_or(&self.config.source_url)
    }
}

impl Command for UpdateSourceCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let output = self.working_dir.join(&self.args.output);
        let fetcher = SourceFetcher::new(DOWNLOAD_TIMEOUT)?;

        match fetcher.download_if_needed(self.url(), &output, self.args.force)? {
            DownloadStatus::Downloaded => ui.success("CSV source downloaded successfully."),
            DownloadStatus::AlreadyPresent => ui.message(&format!(
                "CSV source file '{}' already exists, skipping download.",
                self.args.output.display()
            )),
        }

        Ok(CommandResult::success())
    }
}
