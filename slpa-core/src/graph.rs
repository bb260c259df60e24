//! Directed graph topology with per-vertex data.
//!
//! [`GraphBuilder`] collects vertices and edges in any order. Finalising it
//! produces an immutable [`Graph`]: vertices sorted by identifier, adjacency
//! compressed into offset/target arrays for both directions. Only vertex data
//! may change after that point.

use std::{collections::BTreeMap, fmt};

use crate::error::EngineError;

/// Unique vertex identifier.
///
/// # Examples
/// ```
/// use slpa_core::VertexId;
///
/// let id = VertexId::new(3);
/// assert_eq!(id.get(), 3);
/// assert_eq!(id.to_string(), "3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(u64);

impl VertexId {
    /// Creates a vertex identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Directed edge between two vertices. Edges carry no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    source: VertexId,
    target: VertexId,
}

impl Edge {
    /// Creates an edge `source -> target`.
    #[must_use]
    pub const fn new(source: VertexId, target: VertexId) -> Self {
        Self { source, target }
    }

    /// Returns the tail of the edge.
    #[rustfmt::skip]
    #[must_use]
    pub const fn source(&self) -> VertexId { self.source }

    /// Returns the head of the edge.
    #[rustfmt::skip]
    #[must_use]
    pub const fn target(&self) -> VertexId { self.target }

    /// Returns `true` for an edge from a vertex to itself.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Mutable staging area for graph construction.
///
/// # Examples
/// ```
/// use slpa_core::{GraphBuilder, VertexId};
///
/// let mut builder = GraphBuilder::new();
/// builder.add_vertex(VertexId::new(2), "b");
/// builder.add_vertex(VertexId::new(1), "a");
/// builder.add_edge(VertexId::new(1), VertexId::new(2));
/// let graph = builder.finalize()?;
///
/// assert_eq!(graph.vertex_count(), 2);
/// assert_eq!(graph.ids(), [VertexId::new(1), VertexId::new(2)]);
/// # Ok::<(), slpa_core::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GraphBuilder<V> {
    vertices: BTreeMap<VertexId, V>,
    edges: Vec<Edge>,
}

impl<V> Default for GraphBuilder<V> {
    fn default() -> Self {
        Self {
            vertices: BTreeMap::new(),
            edges: Vec::new(),
        }
    }
}

impl<V> GraphBuilder<V> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex unless one with the same id exists. Returns `true` when
    /// the vertex was inserted; an existing vertex keeps its original data.
    pub fn add_vertex(&mut self, id: VertexId, data: V) -> bool {
        self.add_vertex_with(id, |_| data)
    }

    /// Adds a vertex whose data is produced by `seed` only when the id is new.
    pub fn add_vertex_with(&mut self, id: VertexId, seed: impl FnOnce(VertexId) -> V) -> bool {
        if self.vertices.contains_key(&id) {
            return false;
        }
        self.vertices.insert(id, seed(id));
        true
    }

    /// Records a directed edge. Endpoints are resolved at [`Self::finalize`].
    pub fn add_edge(&mut self, source: VertexId, target: VertexId) {
        self.edges.push(Edge::new(source, target));
    }

    /// Returns `true` when a vertex with `id` has been added.
    #[must_use]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    /// Returns the number of vertices added so far.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of edges added so far.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Freezes the topology.
    ///
    /// Edges keep their insertion order within each source (for out-edges)
    /// and each target (for in-edges).
    ///
    /// # Errors
    /// Returns [`EngineError::UnknownVertex`] when an edge endpoint was never
    /// added as a vertex.
    pub fn finalize(self) -> Result<Graph<V>, EngineError> {
        let (ids, data): (Vec<VertexId>, Vec<V>) = self.vertices.into_iter().unzip();
        let mut resolved = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            let source = resolve(&ids, edge, edge.source())?;
            let target = resolve(&ids, edge, edge.target())?;
            resolved.push((source, target));
        }

        let (out_offsets, out_targets) = compress(ids.len(), resolved.iter().copied());
        let (in_offsets, in_sources) = compress(
            ids.len(),
            resolved.iter().map(|&(source, target)| (target, source)),
        );

        Ok(Graph {
            ids,
            data,
            out_offsets,
            out_targets,
            in_offsets,
            in_sources,
        })
    }
}

fn resolve(ids: &[VertexId], edge: &Edge, endpoint: VertexId) -> Result<usize, EngineError> {
    ids.binary_search(&endpoint)
        .map_err(|_| EngineError::UnknownVertex {
            source_id: edge.source(),
            target_id: edge.target(),
            missing: endpoint,
        })
}

/// Builds offset/neighbour arrays from `(from, to)` index pairs, preserving
/// the relative order of pairs that share `from`.
fn compress(
    vertex_count: usize,
    pairs: impl Iterator<Item = (usize, usize)> + Clone,
) -> (Vec<usize>, Vec<usize>) {
    let mut offsets = vec![0usize; vertex_count + 1];
    for (from, _) in pairs.clone() {
        offsets[from + 1] += 1;
    }
    for index in 0..vertex_count {
        offsets[index + 1] += offsets[index];
    }
    let mut cursor = offsets.clone();
    let mut neighbours = vec![0usize; offsets[vertex_count]];
    for (from, to) in pairs {
        neighbours[cursor[from]] = to;
        cursor[from] += 1;
    }
    (offsets, neighbours)
}

/// Immutable topology plus mutable per-vertex data.
///
/// Vertices are addressed internally by their dense position in ascending
/// id order.
#[derive(Debug, Clone)]
pub struct Graph<V> {
    ids: Vec<VertexId>,
    data: Vec<V>,
    out_offsets: Vec<usize>,
    out_targets: Vec<usize>,
    in_offsets: Vec<usize>,
    in_sources: Vec<usize>,
}

impl<V> Graph<V> {
    /// Returns the number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.ids.len()
    }

    /// Returns the number of directed edges, parallel edges included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.out_targets.len()
    }

    /// Returns `true` when the graph has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns vertex identifiers in ascending order.
    #[must_use]
    pub fn ids(&self) -> &[VertexId] {
        &self.ids
    }

    /// Returns the data attached to `id`.
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> Option<&V> {
        self.position(id).and_then(|index| self.data.get(index))
    }

    /// Iterates `(id, data)` pairs in ascending id order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &V)> + '_ {
        self.ids.iter().copied().zip(self.data.iter())
    }

    /// Returns the out-neighbours of `id` in edge insertion order, repeated
    /// once per parallel edge.
    #[must_use]
    pub fn out_neighbours(&self, id: VertexId) -> Vec<VertexId> {
        self.position(id)
            .map(|index| self.ids_of(self.out_of(index)))
            .unwrap_or_default()
    }

    /// Returns the in-neighbours of `id` in edge insertion order, repeated
    /// once per parallel edge.
    #[must_use]
    pub fn in_neighbours(&self, id: VertexId) -> Vec<VertexId> {
        self.position(id)
            .map(|index| self.ids_of(self.in_of(index)))
            .unwrap_or_default()
    }

    /// Iterates every edge grouped by source in ascending id order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.ids.len()).flat_map(move |source| {
            self.out_of(source)
                .iter()
                .map(move |&target| Edge::new(self.ids[source], self.ids[target]))
        })
    }

    /// Consumes the graph and returns `(id, data)` pairs in ascending id order.
    pub fn into_vertices(self) -> impl Iterator<Item = (VertexId, V)> {
        self.ids.into_iter().zip(self.data)
    }

    pub(crate) fn position(&self, id: VertexId) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }

    pub(crate) fn id_at(&self, index: usize) -> VertexId {
        self.ids[index]
    }

    pub(crate) fn data_at(&self, index: usize) -> &V {
        &self.data[index]
    }

    pub(crate) fn out_of(&self, index: usize) -> &[usize] {
        &self.out_targets[self.out_offsets[index]..self.out_offsets[index + 1]]
    }

    pub(crate) fn in_of(&self, index: usize) -> &[usize] {
        &self.in_sources[self.in_offsets[index]..self.in_offsets[index + 1]]
    }

    /// Splits the graph into read-only identifiers and mutable vertex data.
    pub(crate) fn ids_and_data_mut(&mut self) -> (&[VertexId], &mut [V]) {
        (&self.ids, &mut self.data)
    }

    fn ids_of(&self, indices: &[usize]) -> Vec<VertexId> {
        indices.iter().map(|&index| self.ids[index]).collect()
    }
}
