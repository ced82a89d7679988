//! `dendronet` binary.
//!
//! Installs logging, runs the parsed command and prints its summary on
//! stdout. Failures are logged with their stable code and turn into a
//! non-zero exit status.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use dendronet_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};
use tracing::error;

fn execute(cli: Cli) -> anyhow::Result<()> {
    let summary = run_cli(cli).context("command failed")?;
    let mut out = BufWriter::new(io::stdout().lock());
    render_summary(&summary, &mut out).context("failed to write summary")?;
    out.flush().context("failed to flush stdout")
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.downcast_ref::<CliError>().map_or("CLI_FAILURE", CliError::code);
            error!(code, error = %format_args!("{err:#}"), "dendronet failed");
            ExitCode::FAILURE
        }
    }
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialised"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("dendronet: failed to initialise logging: {err}");
}
