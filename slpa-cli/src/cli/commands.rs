//! Command implementations and argument parsing for the slpa CLI.

use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand, ValueEnum};
use slpa_core::{
    DEFAULT_MAX_SUPERSTEPS, DEFAULT_THRESHOLD, EngineErrorCode, ExecutionStrategy, HaltReason,
    IngestErrorCode, SlpaBuilder, SlpaError,
};
use slpa_providers_edgelist::{EdgeListError, EdgeListProvider, MalformedLinePolicy};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "slpa",
    about = "Detect overlapping communities with speaker-listener label propagation."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Propagate labels over an edge list and save the memberships.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Edge list with one `source target` pair per line.
    #[arg(value_name = "GRAPH")]
    pub graph: Option<PathBuf>,

    /// Directory that receives the `output` file.
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,

    /// Labels rarer than this fraction of a vertex's observations are pruned.
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Maximum number of supersteps.
    #[arg(long, default_value_t = DEFAULT_MAX_SUPERSTEPS)]
    pub supersteps: usize,

    /// How supersteps are scheduled across threads.
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,

    /// Skip malformed lines instead of aborting.
    #[arg(long)]
    pub skip_malformed: bool,

    /// Override name for the data source (defaults to the file stem).
    #[arg(long)]
    pub name: Option<String>,
}

/// Execution strategies selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Parallel when available.
    Auto,
    /// Single-threaded.
    Sequential,
    /// Rayon thread pool.
    Parallel,
}

impl From<StrategyArg> for ExecutionStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Auto => Self::Auto,
            StrategyArg::Sequential => Self::Sequential,
            StrategyArg::Parallel => Self::Parallel,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The graph file could not be opened.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// No graph path was supplied.
    #[error("missing required graph path; usage: slpa run <GRAPH>")]
    MissingGraph,
    /// Edge-list ingestion failed.
    #[error(transparent)]
    EdgeList(#[from] EdgeListError),
    /// Configuring or running the algorithm failed.
    #[error(transparent)]
    Core(#[from] SlpaError),
    /// Writing the memberships failed.
    #[error("failed to save results to `{path}`: {source}")]
    Save {
        /// Output directory.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: SlpaError,
    },
}

impl CliError {
    /// Returns the core error carried by this failure, if any.
    #[must_use]
    pub fn core(&self) -> Option<&SlpaError> {
        match self {
            Self::Core(error) | Self::Save { source: error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns the most specific stable code for this failure.
    ///
    /// Ingestion and engine codes take precedence over the runtime code that
    /// wraps them. Failures raised by the CLI itself carry no code.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        self.ingest_code()
            .map(IngestErrorCode::as_str)
            .or_else(|| self.engine_code().map(EngineErrorCode::as_str))
            .or_else(|| self.core().map(|core| core.code().as_str()))
    }

    /// Returns the [`IngestErrorCode`] when an input line was rejected.
    #[must_use]
    pub fn ingest_code(&self) -> Option<IngestErrorCode> {
        match self {
            Self::EdgeList(error) => error.ingest_code(),
            _ => None,
        }
    }

    /// Returns the [`EngineErrorCode`] when graph construction or saving failed.
    #[must_use]
    pub fn engine_code(&self) -> Option<EngineErrorCode> {
        match self {
            Self::EdgeList(error) => error.engine_code(),
            _ => self.core().and_then(SlpaError::engine_code),
        }
    }
}

/// Summarises the outcome of a `run` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Name of the data source.
    pub data_source: String,
    /// Vertices in the graph.
    pub vertices: usize,
    /// Directed edges in the graph.
    pub edges: usize,
    /// Malformed lines skipped during loading.
    pub skipped_lines: usize,
    /// Supersteps executed.
    pub supersteps: usize,
    /// Why propagation stopped.
    pub halt: HaltReason,
    /// Distinct surviving labels.
    pub communities: usize,
    /// Vertices that kept no label.
    pub unlabelled: usize,
    /// File the memberships were written to.
    pub output: PathBuf,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading, running or saving fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use slpa_cli::cli::{Cli, Command, RunCommand, StrategyArg, run_cli};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = tempfile::tempdir()?;
/// let graph = dir.path().join("pair.txt");
/// std::fs::write(&graph, "1 2\n2 1\n")?;
/// let cli = Cli {
///     command: Command::Run(RunCommand {
///         graph: Some(graph),
///         output: dir.path().join("out"),
///         threshold: 0.0,
///         supersteps: 1,
///         strategy: StrategyArg::Sequential,
///         skip_malformed: false,
///         name: None,
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(std::fs::read_to_string(&summary.output)?, "1 1 2\n2 1 2\n");
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(
        graph = field::Empty,
        output = %command.output.display(),
        threshold = command.threshold,
        supersteps = command.supersteps,
        strategy = ?command.strategy,
        policy = field::Empty,
    ),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let RunCommand {
        graph,
        output,
        threshold,
        supersteps,
        strategy,
        skip_malformed,
        name,
    } = command;
    let path = graph.ok_or(CliError::MissingGraph)?;
    let policy = if skip_malformed {
        MalformedLinePolicy::Skip
    } else {
        MalformedLinePolicy::Abort
    };
    let span = Span::current();
    span.record("graph", field::display(path.display()));
    span.record("policy", field::debug(policy));

    let slpa = SlpaBuilder::new()
        .with_threshold(threshold)
        .with_max_supersteps(supersteps)
        .with_execution_strategy(strategy.into())
        .build()?;

    let data_source = derive_data_source_name(&path, name.as_deref());
    let reader = open_graph_reader(&path)?;
    let provider = EdgeListProvider::try_from_reader(data_source, reader, policy)?;
    let skipped_lines = provider.skipped_lines();
    let data_source = provider.name().to_owned();
    let graph = provider.into_graph();
    let (vertices, edges) = (graph.vertex_count(), graph.edge_count());

    let run = slpa.run(&data_source, graph)?;
    let written = run.save(&output).map_err(|source| CliError::Save {
        path: output.clone(),
        source,
    })?;
    let communities = run.communities();

    let summary = ExecutionSummary {
        data_source,
        vertices,
        edges,
        skipped_lines,
        supersteps: run.report().supersteps,
        halt: run.report().halt,
        communities: communities.community_count(),
        unlabelled: communities.empty_vertex_count(),
        output: written,
    };
    info!(
        data_source = summary.data_source.as_str(),
        communities = summary.communities,
        output = %summary.output.display(),
        "command completed"
    );
    Ok(summary)
}

#[instrument(name = "cli.open_graph_reader", err, fields(path = %path.display()))]
pub(super) fn open_graph_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

pub(super) fn derive_data_source_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "graph".to_owned(), ToOwned::to_owned)
}

/// Renders `summary` to `writer` as `key: value` lines.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let halt = match summary.halt {
        HaltReason::Quiescent => "quiescent",
        HaltReason::SuperstepLimit => "superstep limit",
    };
    writeln!(writer, "data source: {}", summary.data_source)?;
    writeln!(writer, "vertices: {}", summary.vertices)?;
    writeln!(writer, "edges: {}", summary.edges)?;
    if summary.skipped_lines > 0 {
        writeln!(writer, "skipped lines: {}", summary.skipped_lines)?;
    }
    writeln!(writer, "supersteps: {} ({halt})", summary.supersteps)?;
    writeln!(writer, "communities: {}", summary.communities)?;
    writeln!(writer, "unlabelled vertices: {}", summary.unlabelled)?;
    writeln!(writer, "output: {}", summary.output.display())
}
