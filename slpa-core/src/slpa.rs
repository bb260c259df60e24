//! SLPA orchestration.
//!
//! Provides the [`Slpa`] runtime entry point, which drives propagation over a
//! seeded graph, prunes every store once, and hands back a [`SlpaRun`] that
//! can be inspected or saved.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{info, instrument, warn};

use crate::{
    Result,
    builder::{ExecutionStrategy, Threshold},
    emission::{PruneSummary, prune_labels, save_output},
    engine::{EngineConfig, EngineReport, SyncEngine},
    error::SlpaError,
    graph::{Edge, Graph},
    ingest::GraphIngestion,
    label::LabelStore,
    propagation::SlpaProgram,
    result::Communities,
};

/// Entry point for running label propagation.
///
/// # Examples
/// ```
/// use slpa_core::{GraphIngestion, SlpaBuilder};
///
/// let mut ingestion = GraphIngestion::new();
/// ingestion.ingest_line(1, "1 2")?;
/// ingestion.ingest_line(2, "2 1")?;
///
/// let slpa = SlpaBuilder::new().with_max_supersteps(1).with_threshold(0.0).build()?;
/// let run = slpa.run("pair", ingestion.finalize()?)?;
///
/// assert_eq!(run.report().supersteps, 1);
/// assert_eq!(run.communities().memberships()[0].to_string(), "1 1 2");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Slpa {
    threshold: Threshold,
    max_supersteps: usize,
    execution_strategy: ExecutionStrategy,
    parallel: bool,
}

impl Slpa {
    pub(crate) fn new(
        threshold: Threshold,
        max_supersteps: usize,
        execution_strategy: ExecutionStrategy,
        parallel: bool,
    ) -> Self {
        Self {
            threshold,
            max_supersteps,
            execution_strategy,
            parallel,
        }
    }

    /// Returns the pruning threshold.
    #[rustfmt::skip]
    #[must_use]
    pub fn threshold(&self) -> Threshold { self.threshold }

    /// Returns the superstep budget.
    #[rustfmt::skip]
    #[must_use]
    pub fn max_supersteps(&self) -> usize { self.max_supersteps }

    /// Returns the execution strategy that will be used when running.
    #[rustfmt::skip]
    #[must_use]
    pub fn execution_strategy(&self) -> ExecutionStrategy { self.execution_strategy }

    /// Runs propagation over `graph` and prunes the result.
    ///
    /// Every vertex is active in superstep 0. Execution stops when no vertex
    /// is signalled or the superstep budget is spent, whichever comes first.
    ///
    /// # Errors
    /// Returns [`SlpaError::EmptyGraph`] when `graph` has no vertices.
    #[instrument(
        name = "core.run",
        err,
        skip(self, graph),
        fields(
            data_source = %data_source,
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            threshold = self.threshold.get(),
            max_supersteps = self.max_supersteps,
            strategy = ?self.execution_strategy,
        ),
    )]
    pub fn run(&self, data_source: &str, graph: Graph<LabelStore>) -> Result<SlpaRun> {
        if graph.is_empty() {
            warn!(data_source, "graph has no vertices, returning error");
            return Err(SlpaError::EmptyGraph {
                data_source: Arc::from(data_source),
            });
        }

        let config = EngineConfig::new()
            .with_max_supersteps(self.max_supersteps)
            .with_parallel(self.parallel);
        let mut engine = SyncEngine::new(SlpaProgram, graph, config);
        engine.signal_all();
        let report = engine.start();
        let pruning = prune_labels(&mut engine, self.threshold);

        info!(
            supersteps = report.supersteps,
            halt = ?report.halt,
            emptied = pruning.emptied_vertices,
            "propagation completed"
        );
        Ok(SlpaRun {
            data_source: Arc::from(data_source),
            engine,
            report,
            pruning,
        })
    }

    /// Builds the graph from an edge iterator and runs it.
    ///
    /// # Errors
    /// Returns [`SlpaError::EmptyGraph`] when `edges` is empty.
    pub fn run_edges<I>(&self, data_source: &str, edges: I) -> Result<SlpaRun>
    where
        I: IntoIterator<Item = Edge>,
    {
        let mut ingestion = GraphIngestion::new();
        for edge in edges {
            ingestion.ingest_edge(edge);
        }
        self.run(data_source, ingestion.finalize()?)
    }
}

/// A finished, pruned propagation run.
pub struct SlpaRun {
    data_source: Arc<str>,
    engine: SyncEngine<SlpaProgram>,
    report: EngineReport,
    pruning: PruneSummary,
}

impl SlpaRun {
    /// Returns the name of the graph source.
    #[rustfmt::skip]
    #[must_use]
    pub fn data_source(&self) -> &str { &self.data_source }

    /// Returns how the engine ran.
    #[rustfmt::skip]
    #[must_use]
    pub fn report(&self) -> EngineReport { self.report }

    /// Returns pruning totals.
    #[rustfmt::skip]
    #[must_use]
    pub fn pruning(&self) -> PruneSummary { self.pruning }

    /// Returns the pruned graph.
    #[must_use]
    pub fn graph(&self) -> &Graph<LabelStore> {
        self.engine.graph()
    }

    /// Collects community memberships.
    #[must_use]
    pub fn communities(&self) -> Communities {
        Communities::from_graph(self.engine.graph())
    }

    /// Writes the memberships to the `output` file inside `dir`, creating
    /// `dir` when missing, and returns the file path.
    ///
    /// # Errors
    /// Returns [`SlpaError::Engine`] when the file cannot be written.
    #[instrument(name = "core.save", err, skip(self), fields(data_source = %self.data_source, dir = %dir.display()))]
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        let path = save_output(&self.engine, dir)?;
        info!(path = %path.display(), "communities saved");
        Ok(path)
    }

    /// Consumes the run and returns the pruned graph.
    #[must_use]
    pub fn into_graph(self) -> Graph<LabelStore> {
        self.engine.into_graph()
    }
}

impl std::fmt::Debug for SlpaRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlpaRun")
            .field("data_source", &self.data_source)
            .field("vertices", &self.engine.graph().vertex_count())
            .field("report", &self.report)
            .field("pruning", &self.pruning)
            .finish()
    }
}
