//! `slpa` binary: loads an edge list, detects overlapping communities and
//! prints a run summary to stdout.

use std::{
    io::{self, BufWriter, Write},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use slpa_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};
use tracing::{error, field};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let summary = run_cli(cli).context("failed to execute command")?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&summary, &mut writer).context("failed to render summary")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        let cli_error = err.downcast_ref::<CliError>();
        let code = cli_error.and_then(CliError::code).map(field::display);
        let ingest_code = cli_error
            .and_then(CliError::ingest_code)
            .map(|code| field::display(code.as_str()));
        let engine_code = cli_error
            .and_then(CliError::engine_code)
            .map(|code| field::display(code.as_str()));

        let message = format!("{err:#}");
        error!(
            error = %message,
            code,
            engine_code,
            ingest_code,
            "command execution failed"
        );
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[allow(clippy::print_stderr, reason = "tracing is not installed yet")]
fn report_logging_error(err: &LoggingError) {
    eprintln!("failed to initialise logging: {err}");
}
