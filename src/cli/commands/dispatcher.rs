//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::load_config;
use crate::error::Result;
use crate::scan::CancelToken;
use crate::ui::UserInterface;

/// Exit code for a run stopped by Ctrl-C.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    working_dir: PathBuf,
    cancel: CancelToken,
}

impl CommandDispatcher {
    /// Create a new dispatcher resolving relative paths against `working_dir`.
    pub fn new(working_dir: PathBuf) -> Self {
        Self {
            working_dir,
            cancel: CancelToken::new(),
        }
    }

    /// Use `cancel` to stop long-running commands.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Load configuration, then route the subcommand to its implementation.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let explicit = cli.config.as_ref().map(|path| self.working_dir.join(path));
        let config = load_config(explicit.as_deref(), &self.working_dir)?;

        match &cli.command {
            Commands::UpdateSource(args) => {
                let cmd =
                    super::update_source::UpdateSourceCommand::new(&self.working_dir, config, args.clone());
                cmd.execute(ui)
            }
            Commands::Process(args) => {
                let cmd = super::process::ProcessCommand::new(&self.working_dir, config, args.clone())
                    .with_cancel(self.cancel.clone());
                cmd.execute(ui)
            }
            Commands::Analysis(args) => {
                let cmd = super::analysis::AnalysisCommand::new(&self.working_dir, config, args.clone());
                cmd.execute(ui)
            }
        }
    }
}
