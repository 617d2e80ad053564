//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// avm-check - Provider version compliance for Azure Verified Modules.
#[derive(Debug, Parser)]
#[command(name = "avm-check")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides ./avm-check.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Whether the chosen command asked for quiet output.
    pub fn quiet(&self) -> bool {
        matches!(&self.command, Commands::Process(args) if args.quiet)
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download the module index CSV
    UpdateSource(UpdateSourceArgs),

    /// Clone every module in the index, check provider constraints and write a JSON report
    Process(ProcessArgs),

    /// Show a detailed breakdown of a JSON report
    Analysis(AnalysisArgs),
}

/// Arguments for the `update-source` command.
#[derive(Debug, Clone, clap::Args)]
pub struct UpdateSourceArgs {
    /// URL of the module index CSV (defaults to the configured source_url)
    #[arg(short, long)]
    pub url: Option<String>,

    /// Where to save the CSV
    #[arg(short, long, default_value = "modules.csv")]
    pub output: PathBuf,

    /// Download even if the file already exists
    #[arg(short, long)]
    pub force: bool,
}

impl Default for UpdateSourceArgs {
    fn default() -> Self {
        Self {
            url: None,
            output: PathBuf::from("modules.csv"),
            force: false,
        }
    }
}

/// Arguments for the `process` command.
#[derive(Debug, Clone, clap::Args)]
pub struct ProcessArgs {
    /// Input CSV file containing Terraform modules
    #[arg(short, long, default_value = "modules.csv")]
    pub input: PathBuf,

    /// Output JSON file for results
    #[arg(short, long, default_value = "output.json")]
    pub output: PathBuf,

    /// Number of concurrent workers (defaults to the configured workers)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Suppress warning logs and the progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// Download the CSV before processing (overwrites the input file)
    #[arg(short, long)]
    pub download: bool,

    /// URL to download from with --download (defaults to the configured source_url)
    #[arg(short, long)]
    pub url: Option<String>,
}

impl Default for ProcessArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("modules.csv"),
            output: PathBuf::from("output.json"),
            workers: None,
            quiet: false,
            download: false,
            url: None,
        }
    }
}

/// Arguments for the `analysis` command.
#[derive(Debug, Clone, clap::Args)]
pub struct AnalysisArgs {
    /// JSON report written by `process`
    #[arg(short, long, default_value = "output.json")]
    pub input: PathBuf,
}

impl Default for AnalysisArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("output.json"),
        }
    }
}
