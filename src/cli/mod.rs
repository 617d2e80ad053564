//! Command-line interface for avm-check.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{AnalysisArgs, Cli, Commands, ProcessArgs, UpdateSourceArgs};
pub use commands::{Command, CommandDispatcher, CommandResult, EXIT_INTERRUPTED};
