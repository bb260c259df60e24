//! Seeded planted-partition graphs for benchmarking.
//!
//! Vertices are split into contiguous blocks. Each vertex draws most of its
//! out-edges from its own block and a few from anywhere, which gives
//! propagation a community structure to recover.

use std::fmt::Write as _;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use slpa_core::{Edge, EngineError, Graph, GraphIngestion, LabelStore, VertexId};

/// Errors that may occur during synthetic graph generation.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum SyntheticError {
    /// The requested vertex count was zero.
    #[error("vertex count must be greater than zero")]
    ZeroVertices,
    /// The requested community count was zero.
    #[error("community count must be greater than zero")]
    ZeroCommunities,
    /// More communities than vertices were requested.
    #[error("{communities} communities cannot be planted in {vertices} vertices")]
    TooManyCommunities {
        /// Requested communities.
        communities: usize,
        /// Requested vertices.
        vertices: usize,
    },
}

/// Configuration for planted-partition generation.
#[derive(Clone, Debug)]
pub struct SyntheticGraphConfig {
    /// Number of vertices.
    pub vertex_count: usize,
    /// Number of planted communities.
    pub communities: usize,
    /// Out-edges per vertex that stay inside its community.
    pub intra_degree: usize,
    /// Out-edges per vertex to any vertex.
    pub inter_degree: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// A generated directed edge list.
///
/// # Examples
///
/// ```
/// use slpa_benches::source::{SyntheticGraph, SyntheticGraphConfig};
///
/// let config = SyntheticGraphConfig {
///     vertex_count: 20,
///     communities: 4,
///     intra_degree: 3,
///     inter_degree: 1,
///     seed: 7,
/// };
/// let graph = SyntheticGraph::generate(&config).expect("valid config");
/// assert_eq!(graph.edges().len(), 80);
/// ```
#[derive(Clone, Debug)]
pub struct SyntheticGraph {
    edges: Vec<Edge>,
    vertex_count: usize,
}

impl SyntheticGraph {
    /// Generates edges eagerly from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SyntheticError`] when the vertex or community count is zero,
    /// or when there are more communities than vertices.
    pub fn generate(config: &SyntheticGraphConfig) -> Result<Self, SyntheticError> {
        if config.vertex_count == 0 {
            return Err(SyntheticError::ZeroVertices);
        }
        if config.communities == 0 {
            return Err(SyntheticError::ZeroCommunities);
        }
        if config.communities > config.vertex_count {
            return Err(SyntheticError::TooManyCommunities {
                communities: config.communities,
                vertices: config.vertex_count,
            });
        }

        let n = config.vertex_count;
        let block = n.div_ceil(config.communities);
        let per_vertex = config.intra_degree.saturating_add(config.inter_degree);
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut edges = Vec::with_capacity(n.saturating_mul(per_vertex));

        for source in 0..n {
            let start = source - source % block;
            let end = start.saturating_add(block).min(n);
            for _ in 0..config.intra_degree {
                let target = rng.gen_range(start..end);
                edges.push(edge(source, target));
            }
            for _ in 0..config.inter_degree {
                let target = rng.gen_range(0..n);
                edges.push(edge(source, target));
            }
        }

        Ok(Self {
            edges,
            vertex_count: n,
        })
    }

    /// Returns the generated edges in generation order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the configured vertex count. Vertices that no edge mentions
    /// are absent from built graphs.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Renders the edges as edge-list text.
    #[must_use]
    pub fn to_edge_list(&self) -> String {
        let mut text = String::with_capacity(self.edges.len().saturating_mul(12));
        for edge in &self.edges {
            let _ = writeln!(text, "{} {}", edge.source(), edge.target());
        }
        text
    }

    /// Builds a seeded graph from the edges.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineError`] from graph finalisation.
    pub fn build(&self) -> Result<Graph<LabelStore>, EngineError> {
        let mut ingestion = GraphIngestion::new();
        for edge in &self.edges {
            ingestion.ingest_edge(*edge);
        }
        ingestion.finalize()
    }
}

fn edge(source: usize, target: usize) -> Edge {
    Edge::new(VertexId::new(source as u64), VertexId::new(target as u64))
}
