//! Edge-list parsing and graph construction.
//!
//! Every vertex enters the graph seeded with a singleton label equal to its
//! own identifier, whichever edge mentions it first.

use std::sync::Arc;

use crate::{
    error::{EngineError, IngestError, LineError},
    graph::{Edge, Graph, GraphBuilder, VertexId},
    label::{Label, LabelStore},
};

/// Parses one `source target` line.
///
/// Returns `Ok(None)` for blank lines. Surrounding whitespace, including a
/// trailing carriage return, is ignored.
///
/// # Errors
/// Returns [`LineError`] when the line does not hold exactly two
/// non-negative integers.
///
/// # Examples
/// ```
/// use slpa_core::{Edge, VertexId, parse_edge_line};
///
/// let edge = parse_edge_line(" 3\t8\r")?;
/// assert_eq!(edge, Some(Edge::new(VertexId::new(3), VertexId::new(8))));
/// assert_eq!(parse_edge_line("   ")?, None);
/// assert!(parse_edge_line("3").is_err());
/// # Ok::<(), slpa_core::LineError>(())
/// ```
pub fn parse_edge_line(line: &str) -> Result<Option<Edge>, LineError> {
    let mut tokens = line.split_whitespace();
    let Some(source) = tokens.next() else {
        return Ok(None);
    };
    let target = tokens.next().ok_or(LineError::MissingTarget)?;
    let extra = tokens.count();
    if extra > 0 {
        return Err(LineError::TrailingTokens { extra });
    }
    Ok(Some(Edge::new(parse_id(source)?, parse_id(target)?)))
}

fn parse_id(token: &str) -> Result<VertexId, LineError> {
    token
        .parse::<u64>()
        .map(VertexId::new)
        .map_err(|_| LineError::InvalidVertexId {
            token: Arc::from(token),
        })
}

/// Accumulates SLPA-seeded vertices and edges prior to finalisation.
///
/// # Examples
/// ```
/// use slpa_core::{GraphIngestion, Label, VertexId};
///
/// let mut ingestion = GraphIngestion::new();
/// assert!(ingestion.ingest_line(1, "1 2")?);
/// assert!(!ingestion.ingest_line(2, "")?);
/// assert!(ingestion.ingest_line(3, "1 x").is_err());
///
/// let graph = ingestion.finalize()?;
/// assert_eq!(graph.vertex_count(), 2);
/// let seed = graph.vertex(VertexId::new(2)).and_then(|store| store.dominant_label());
/// assert_eq!(seed, Some(Label::new(2)));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct GraphIngestion {
    builder: GraphBuilder<LabelStore>,
}

impl GraphIngestion {
    /// Creates an empty ingestion buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `edge`, seeding either endpoint when it is new.
    pub fn ingest_edge(&mut self, edge: Edge) {
        for id in [edge.source(), edge.target()] {
            self.builder.add_vertex_with(id, seed_store);
        }
        self.builder.add_edge(edge.source(), edge.target());
    }

    /// Adds a standalone vertex with no edges. Returns `false` when the
    /// vertex already exists.
    pub fn ingest_vertex(&mut self, id: VertexId) -> bool {
        self.builder.add_vertex_with(id, seed_store)
    }

    /// Parses and ingests one line. `number` is the one-based line number
    /// reported on failure. Returns `Ok(false)` for blank lines.
    ///
    /// # Errors
    /// Returns [`IngestError::MalformedLine`] without touching the buffer
    /// when the line cannot be parsed.
    pub fn ingest_line(&mut self, number: usize, line: &str) -> Result<bool, IngestError> {
        match parse_edge_line(line) {
            Ok(Some(edge)) => {
                self.ingest_edge(edge);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(reason) => Err(IngestError::MalformedLine {
                line: number,
                content: Arc::from(line.trim()),
                reason,
            }),
        }
    }

    /// Returns the number of vertices seen so far.
    #[rustfmt::skip]
    #[must_use]
    pub fn vertex_count(&self) -> usize { self.builder.vertex_count() }

    /// Returns the number of edges ingested so far.
    #[rustfmt::skip]
    #[must_use]
    pub fn edge_count(&self) -> usize { self.builder.edge_count() }

    /// Freezes the topology.
    ///
    /// # Errors
    /// Propagates [`EngineError`] from [`GraphBuilder::finalize`]; ingestion
    /// always adds both endpoints first, so this does not fail in practice.
    pub fn finalize(self) -> Result<Graph<LabelStore>, EngineError> {
        self.builder.finalize()
    }
}

fn seed_store(id: VertexId) -> LabelStore {
    LabelStore::init(Label::new(id.get()))
}
