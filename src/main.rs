//! avm-check CLI entry point.

use std::process::ExitCode;

use avm_check::cli::{Cli, CommandDispatcher, Commands};
use avm_check::scan::CancelToken;
use avm_check::ui::{create_ui, OutputMode};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO, or ERROR with `--quiet`
fn init_tracing(debug: bool, quiet: bool) {
    let filter = if debug {
        EnvFilter::new("avm_check=debug")
    } else {
        let default = if quiet { "avm_check=error" } else { "avm_check=info" };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.quiet());

    tracing::debug!("avm-check starting with args: {:?}", cli);

    let output_mode = if cli.quiet() {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut ui = create_ui(output_mode, cli.no_color);

    // Only long-running scans need Ctrl-C to stop workers gracefully
    let cancel = match &cli.command {
        Commands::Process(_) => CancelToken::with_interrupt(),
        _ => CancelToken::new(),
    };

    let working_dir = std::env::current_dir().unwrap_or_default();
    let dispatcher = CommandDispatcher::new(working_dir).with_cancel(cancel);

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
