//! Bulk-synchronous vertex-program engine.
//!
//! A [`VertexProgram`] describes one superstep of work for a single vertex as
//! gather/combine/apply/scatter callbacks. [`SyncEngine`] runs such a program
//! over a finalised [`crate::Graph`] superstep by superstep: gather for every
//! active vertex reads the state left by the previous superstep, apply then
//! mutates each active vertex exactly once, and scatter decides which
//! vertices run in the next superstep.
//!
//! Programs are plain values passed by generic parameter, so an engine is
//! monomorphised per program and no callback goes through a vtable.

mod sync;

use crate::graph::VertexId;

pub use self::sync::{EngineConfig, EngineReport, HaltReason, SyncEngine};

/// Which incident edges a gather or scatter phase visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    /// Visit no edges.
    None,
    /// Visit edges whose target is the vertex.
    In,
    /// Visit edges whose source is the vertex.
    Out,
    /// Visit in-edges followed by out-edges.
    All,
}

/// Per-superstep state handed to every callback in place of a global
/// engine handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    superstep: usize,
}

impl Context {
    pub(crate) const fn new(superstep: usize) -> Self {
        Self { superstep }
    }

    /// Returns the zero-based index of the running superstep.
    #[must_use]
    pub const fn superstep(&self) -> usize {
        self.superstep
    }
}

/// Read-only view of a vertex during gather and scatter.
#[derive(Debug)]
pub struct VertexRef<'a, V> {
    index: usize,
    id: VertexId,
    data: &'a V,
}

impl<V> Clone for VertexRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for VertexRef<'_, V> {}

impl<'a, V> VertexRef<'a, V> {
    pub(crate) const fn new(index: usize, id: VertexId, data: &'a V) -> Self {
        Self { index, id, data }
    }

    /// Returns the vertex identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn id(&self) -> VertexId { self.id }

    /// Returns the vertex data as of the end of the previous superstep.
    #[rustfmt::skip]
    #[must_use]
    pub const fn data(&self) -> &'a V { self.data }
}

/// Mutable view of a vertex during apply and vertex transforms.
#[derive(Debug)]
pub struct VertexMut<'a, V> {
    id: VertexId,
    data: &'a mut V,
}

impl<'a, V> VertexMut<'a, V> {
    pub(crate) const fn new(id: VertexId, data: &'a mut V) -> Self {
        Self { id, data }
    }

    /// Returns the vertex identifier.
    #[must_use]
    pub const fn id(&self) -> VertexId {
        self.id
    }

    /// Returns the vertex data.
    #[must_use]
    pub fn data(&self) -> &V {
        self.data
    }

    /// Returns the vertex data for mutation.
    pub fn data_mut(&mut self) -> &mut V {
        self.data
    }
}

/// View of one directed edge and both of its endpoints.
#[derive(Debug)]
pub struct EdgeRef<'a, V> {
    source: VertexRef<'a, V>,
    target: VertexRef<'a, V>,
}

impl<V> Clone for EdgeRef<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for EdgeRef<'_, V> {}

impl<'a, V> EdgeRef<'a, V> {
    pub(crate) const fn new(source: VertexRef<'a, V>, target: VertexRef<'a, V>) -> Self {
        Self { source, target }
    }

    /// Returns the tail vertex.
    #[must_use]
    pub const fn source(&self) -> VertexRef<'a, V> {
        self.source
    }

    /// Returns the head vertex.
    #[must_use]
    pub const fn target(&self) -> VertexRef<'a, V> {
        self.target
    }
}

/// Activation requests collected during scatter for the next superstep.
///
/// Signals never affect the superstep that issues them.
#[derive(Debug, Clone, Default)]
pub struct Signals {
    pending: Vec<usize>,
}

impl Signals {
    /// Requests that `vertex` runs in the next superstep.
    pub fn signal<V>(&mut self, vertex: VertexRef<'_, V>) {
        self.pending.push(vertex.index);
    }

    /// Returns the number of requests recorded, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` when nothing has been signalled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn merge(mut self, mut other: Self) -> Self {
        self.pending.append(&mut other.pending);
        self
    }

    pub(crate) fn into_activation(self, vertex_count: usize) -> Vec<bool> {
        let mut active = vec![false; vertex_count];
        for index in self.pending {
            active[index] = true;
        }
        active
    }
}

/// Per-vertex behaviour executed by [`SyncEngine`] in every superstep.
///
/// `combine` must be associative and commutative: the engine folds partial
/// gather results in adjacency order, but implementations may not rely on
/// that order.
pub trait VertexProgram: Sync {
    /// Data stored on every vertex.
    type Data: Send + Sync;
    /// Partial and combined gather result.
    type Gather: Send;

    /// Edges visited by [`Self::gather`].
    fn gather_edges(&self) -> EdgeDirection;

    /// Produces the contribution of one edge to `vertex`.
    fn gather(
        &self,
        context: &Context,
        vertex: VertexRef<'_, Self::Data>,
        edge: EdgeRef<'_, Self::Data>,
    ) -> Self::Gather;

    /// Merges two partial gather results.
    fn combine(&self, left: Self::Gather, right: Self::Gather) -> Self::Gather;

    /// Updates `vertex` from the combined gather result, or `None` when the
    /// vertex had no gather edges.
    fn apply(
        &self,
        context: &Context,
        vertex: VertexMut<'_, Self::Data>,
        total: Option<Self::Gather>,
    );

    /// Edges visited by [`Self::scatter`].
    fn scatter_edges(&self) -> EdgeDirection;

    /// Runs once per scatter edge after apply; may signal either endpoint.
    fn scatter(
        &self,
        context: &Context,
        vertex: VertexRef<'_, Self::Data>,
        edge: EdgeRef<'_, Self::Data>,
        signals: &mut Signals,
    );
}
