//! Small helpers shared across CLI tests.

use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
};

use tempfile::TempDir;

use super::{Cli, CliError, RunCommand, StrategyArg, commands::run_command, run_cli};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn create_text_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

/// A sequential `run` over `graph` writing into `output`.
pub(super) fn run_args(graph: Option<PathBuf>, output: PathBuf) -> RunCommand {
    RunCommand {
        graph,
        output,
        threshold: 0.0,
        supersteps: 2,
        strategy: StrategyArg::Sequential,
        skip_malformed: false,
        name: None,
    }
}

pub(super) fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}

pub(super) fn run_command_expecting_error(cmd: RunCommand, panic_msg: &str) -> CliError {
    match run_command(cmd) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
