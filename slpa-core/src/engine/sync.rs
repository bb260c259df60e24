//! Single-process synchronous engine.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, debug_span, field, info, instrument};

use crate::{
    error::EngineError,
    graph::{Edge, Graph, VertexId},
};

use super::{Context, EdgeDirection, EdgeRef, Signals, VertexMut, VertexProgram, VertexRef};

/// Scheduling options for [`SyncEngine`].
///
/// # Examples
/// ```
/// use slpa_core::EngineConfig;
///
/// let config = EngineConfig::new().with_max_supersteps(10);
/// assert_eq!(config.max_supersteps(), Some(10));
/// assert!(!config.parallel());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    max_supersteps: Option<usize>,
    parallel: bool,
}

impl EngineConfig {
    /// Runs until no vertex is active, sequentially.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of supersteps a single [`SyncEngine::start`] may run.
    #[must_use]
    pub const fn with_max_supersteps(mut self, limit: usize) -> Self {
        self.max_supersteps = Some(limit);
        self
    }

    /// Runs each phase on the Rayon pool. Ignored when the crate is built
    /// without the `parallel` feature.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the superstep cap, if any.
    #[rustfmt::skip]
    #[must_use]
    pub const fn max_supersteps(&self) -> Option<usize> { self.max_supersteps }

    /// Returns whether phases run in parallel.
    #[rustfmt::skip]
    #[must_use]
    pub const fn parallel(&self) -> bool { self.parallel }
}

/// Why [`SyncEngine::start`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// No vertex was signalled for the next superstep.
    Quiescent,
    /// The configured superstep cap was reached.
    SuperstepLimit,
}

/// Summary of one [`SyncEngine::start`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineReport {
    /// Supersteps executed.
    pub supersteps: usize,
    /// Vertex activations across all executed supersteps.
    pub activations: u64,
    /// Why execution stopped.
    pub halt: HaltReason,
}

/// Runs a [`VertexProgram`] over a graph in synchronised supersteps.
///
/// # Examples
/// ```
/// use slpa_core::{
///     Context, EdgeDirection, EdgeRef, EngineConfig, GraphBuilder, Signals, SyncEngine,
///     VertexId, VertexMut, VertexProgram, VertexRef,
/// };
///
/// /// Counts how many times each vertex has run.
/// struct Tick;
///
/// impl VertexProgram for Tick {
///     type Data = u32;
///     type Gather = ();
///
///     fn gather_edges(&self) -> EdgeDirection { EdgeDirection::None }
///     fn gather(&self, _: &Context, _: VertexRef<'_, u32>, _: EdgeRef<'_, u32>) {}
///     fn combine(&self, _: (), _: ()) {}
///     fn apply(&self, _: &Context, mut vertex: VertexMut<'_, u32>, _: Option<()>) {
///         *vertex.data_mut() += 1;
///     }
///     fn scatter_edges(&self) -> EdgeDirection { EdgeDirection::Out }
///     fn scatter(&self, _: &Context, _: VertexRef<'_, u32>, edge: EdgeRef<'_, u32>, signals: &mut Signals) {
///         signals.signal(edge.target());
///     }
/// }
///
/// let mut builder = GraphBuilder::new();
/// builder.add_vertex(VertexId::new(1), 0);
/// builder.add_vertex(VertexId::new(2), 0);
/// builder.add_edge(VertexId::new(1), VertexId::new(2));
///
/// let mut engine = SyncEngine::new(Tick, builder.finalize()?, EngineConfig::new());
/// engine.signal_all();
/// let report = engine.start();
///
/// assert_eq!(report.supersteps, 2);
/// assert_eq!(engine.graph().vertex(VertexId::new(1)), Some(&1));
/// assert_eq!(engine.graph().vertex(VertexId::new(2)), Some(&2));
/// # Ok::<(), slpa_core::EngineError>(())
/// ```
pub struct SyncEngine<P: VertexProgram> {
    program: P,
    graph: Graph<P::Data>,
    active: Vec<bool>,
    config: EngineConfig,
    superstep: usize,
}

impl<P: VertexProgram> SyncEngine<P> {
    /// Creates an engine with no active vertices.
    #[must_use]
    pub fn new(program: P, graph: Graph<P::Data>, config: EngineConfig) -> Self {
        let active = vec![false; graph.vertex_count()];
        Self {
            program,
            graph,
            active,
            config,
            superstep: 0,
        }
    }

    /// Activates every vertex for the next superstep.
    pub fn signal_all(&mut self) {
        self.active.fill(true);
    }

    /// Activates a single vertex. Returns `false` when `id` is unknown.
    pub fn signal(&mut self, id: VertexId) -> bool {
        match self.graph.position(id) {
            Some(index) => {
                self.active[index] = true;
                true
            }
            None => false,
        }
    }

    /// Returns the number of vertices scheduled for the next superstep.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|active| **active).count()
    }

    /// Returns the total number of supersteps executed by this engine.
    #[must_use]
    pub const fn supersteps_completed(&self) -> usize {
        self.superstep
    }

    /// Executes supersteps until no vertex is active or the configured cap is
    /// reached. Stopping always happens at a superstep boundary.
    #[instrument(
        name = "engine.start",
        skip(self),
        fields(
            vertices = self.graph.vertex_count(),
            edges = self.graph.edge_count(),
            max_supersteps = field::Empty,
            parallel = self.config.parallel,
        ),
    )]
    pub fn start(&mut self) -> EngineReport {
        if let Some(limit) = self.config.max_supersteps {
            tracing::Span::current().record("max_supersteps", limit);
        }

        let mut supersteps = 0usize;
        let mut activations = 0u64;
        let halt = loop {
            let active: Vec<usize> = self
                .active
                .iter()
                .enumerate()
                .filter_map(|(index, active)| active.then_some(index))
                .collect();
            if active.is_empty() {
                break HaltReason::Quiescent;
            }
            if self
                .config
                .max_supersteps
                .is_some_and(|limit| supersteps >= limit)
            {
                break HaltReason::SuperstepLimit;
            }

            let span = debug_span!(
                "engine.superstep",
                superstep = self.superstep,
                active = active.len()
            );
            let signals = span.in_scope(|| self.run_superstep(&active));
            debug!(
                superstep = self.superstep,
                active = active.len(),
                requests = signals.len(),
                "superstep completed"
            );
            record_superstep(active.len());

            self.active = signals.into_activation(self.graph.vertex_count());
            activations += active.len() as u64;
            supersteps += 1;
            self.superstep += 1;
        };

        info!(supersteps, activations, halt = ?halt, "engine halted");
        EngineReport {
            supersteps,
            activations,
            halt,
        }
    }

    /// Applies `transform` once to every vertex.
    ///
    /// Meant for post-processing after [`Self::start`]; there is no ordering
    /// between vertices.
    pub fn transform_vertices<F>(&mut self, transform: F)
    where
        F: Fn(VertexMut<'_, P::Data>) + Send + Sync,
    {
        let (ids, data) = self.graph.ids_and_data_mut();

        #[cfg(feature = "parallel")]
        {
            if self.config.parallel {
                data.par_iter_mut()
                    .zip(ids.par_iter())
                    .for_each(|(vertex, id)| transform(VertexMut::new(*id, vertex)));
                return;
            }
        }
        for (vertex, id) in data.iter_mut().zip(ids) {
            transform(VertexMut::new(*id, vertex));
        }
    }

    /// Writes every vertex and then every edge to `path`, one line per
    /// formatter result. Formatters return the line without its trailing
    /// newline, or `None` to skip the element. Missing parent directories
    /// are created.
    ///
    /// # Errors
    /// Returns [`EngineError::Save`] when the file cannot be created or written.
    #[instrument(name = "engine.save", err, skip(self, format_vertex, format_edge), fields(path = %path.display()))]
    pub fn save<VF, EF>(
        &self,
        path: &Path,
        format_vertex: VF,
        format_edge: EF,
    ) -> Result<(), EngineError>
    where
        VF: Fn(VertexId, &P::Data) -> Option<String>,
        EF: Fn(Edge) -> Option<String>,
    {
        self.write_to(path, format_vertex, format_edge)
            .map_err(|source| EngineError::Save {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Returns the graph and its current vertex data.
    #[rustfmt::skip]
    #[must_use]
    pub const fn graph(&self) -> &Graph<P::Data> { &self.graph }

    /// Returns the vertex program.
    #[rustfmt::skip]
    #[must_use]
    pub const fn program(&self) -> &P { &self.program }

    /// Consumes the engine and returns the graph.
    #[must_use]
    pub fn into_graph(self) -> Graph<P::Data> {
        self.graph
    }

    fn write_to<VF, EF>(&self, path: &Path, format_vertex: VF, format_edge: EF) -> io::Result<()>
    where
        VF: Fn(VertexId, &P::Data) -> Option<String>,
        EF: Fn(Edge) -> Option<String>,
    {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        for (id, data) in self.graph.vertices() {
            if let Some(line) = format_vertex(id, data) {
                writeln!(writer, "{line}")?;
            }
        }
        for edge in self.graph.edges() {
            if let Some(line) = format_edge(edge) {
                writeln!(writer, "{line}")?;
            }
        }
        writer.flush()
    }

    /// Runs gather, apply and scatter for `active` and returns the activation
    /// set for the next superstep.
    fn run_superstep(&mut self, active: &[usize]) -> Signals {
        let context = Context::new(self.superstep);
        let gathered = self.gather_phase(&context, active);
        self.apply_phase(&context, active, gathered);
        self.scatter_phase(&context, active)
    }

    fn gather_phase(&self, context: &Context, active: &[usize]) -> Vec<Option<P::Gather>> {
        #[cfg(feature = "parallel")]
        {
            if self.config.parallel {
                return active
                    .par_iter()
                    .map(|&index| self.gather_vertex(context, index))
                    .collect();
            }
        }
        active
            .iter()
            .map(|&index| self.gather_vertex(context, index))
            .collect()
    }

    fn gather_vertex(&self, context: &Context, index: usize) -> Option<P::Gather> {
        let vertex = self.vertex_ref(index);
        let mut total: Option<P::Gather> = None;
        self.for_each_edge(index, self.program.gather_edges(), |edge| {
            let partial = self.program.gather(context, vertex, edge);
            total = Some(match total.take() {
                Some(accumulated) => self.program.combine(accumulated, partial),
                None => partial,
            });
        });
        total
    }

    fn apply_phase(
        &mut self,
        context: &Context,
        active: &[usize],
        gathered: Vec<Option<P::Gather>>,
    ) {
        let program = &self.program;
        let (ids, data) = self.graph.ids_and_data_mut();

        #[cfg(feature = "parallel")]
        {
            if self.config.parallel {
                let mut slots: Vec<Option<Option<P::Gather>>> =
                    std::iter::repeat_with(|| None).take(data.len()).collect();
                for (&index, total) in active.iter().zip(gathered) {
                    slots[index] = Some(total);
                }
                data.par_iter_mut()
                    .zip(slots.into_par_iter())
                    .enumerate()
                    .for_each(|(index, (vertex, slot))| {
                        if let Some(total) = slot {
                            program.apply(context, VertexMut::new(ids[index], vertex), total);
                        }
                    });
                return;
            }
        }
        for (&index, total) in active.iter().zip(gathered) {
            program.apply(context, VertexMut::new(ids[index], &mut data[index]), total);
        }
    }

    fn scatter_phase(&self, context: &Context, active: &[usize]) -> Signals {
        #[cfg(feature = "parallel")]
        {
            if self.config.parallel {
                return active
                    .par_iter()
                    .fold(Signals::default, |mut signals, &index| {
                        self.scatter_vertex(context, index, &mut signals);
                        signals
                    })
                    .reduce(Signals::default, Signals::merge);
            }
        }

        let mut signals = Signals::default();
        for &index in active {
            self.scatter_vertex(context, index, &mut signals);
        }
        signals
    }

    fn scatter_vertex(&self, context: &Context, index: usize, signals: &mut Signals) {
        let vertex = self.vertex_ref(index);
        self.for_each_edge(index, self.program.scatter_edges(), |edge| {
            self.program.scatter(context, vertex, edge, signals);
        });
    }

    fn vertex_ref(&self, index: usize) -> VertexRef<'_, P::Data> {
        VertexRef::new(index, self.graph.id_at(index), self.graph.data_at(index))
    }

    fn for_each_edge<'g>(
        &'g self,
        index: usize,
        direction: EdgeDirection,
        mut visit: impl FnMut(EdgeRef<'g, P::Data>),
    ) {
        let vertex = self.vertex_ref(index);
        if matches!(direction, EdgeDirection::In | EdgeDirection::All) {
            for &source in self.graph.in_of(index) {
                visit(EdgeRef::new(self.vertex_ref(source), vertex));
            }
        }
        if matches!(direction, EdgeDirection::Out | EdgeDirection::All) {
            for &target in self.graph.out_of(index) {
                visit(EdgeRef::new(vertex, self.vertex_ref(target)));
            }
        }
    }
}

#[cfg(feature = "metrics")]
fn record_superstep(active: usize) {
    metrics::counter!("slpa_supersteps_total").increment(1);
    metrics::counter!("slpa_vertex_activations_total").increment(active as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_superstep(_active: usize) {}
