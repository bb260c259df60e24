//! Command-line interface for SLPA community detection.
//!
//! `slpa run <GRAPH>` loads an edge list, propagates labels, prunes them and
//! writes one membership line per vertex to `<DIR>/output`.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, RunCommand, StrategyArg, render_summary, run_cli,
};

#[cfg(test)]
mod test_helpers;
