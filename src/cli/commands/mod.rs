//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which loads the
//! configuration once and routes CLI subcommands to their implementations
//! (`avm-check update-source`, `avm-check process`, `avm-check analysis`).

pub mod analysis;
pub mod dispatcher;
pub mod process;
pub mod update_source;

pub use dispatcher::{Command, CommandDispatcher, CommandResult, EXIT_INTERRUPTED};
