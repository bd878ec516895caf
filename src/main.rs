//! Till command line entry point

use std::{io, process::ExitCode};

use clap::Parser;
use tracing::error;

use till::{
    cli::{self, Cli},
    logging,
};

#[expect(
    clippy::print_stderr,
    reason = "errors must reach the operator even when logging is filtered or not initialised"
)]
fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init_subscriber(&cli.logging) {
        eprintln!("Logging error: {err}");

        return ExitCode::FAILURE;
    }

    let stdout = io::stdout();

    match cli::run(cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            eprintln!("Error: {err}");

            ExitCode::FAILURE
        }
    }
}
