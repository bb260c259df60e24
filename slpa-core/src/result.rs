//! Community membership produced by a finished run.
//!
//! A vertex belongs to every community whose label survived pruning in its
//! store, so communities may overlap and a vertex may belong to none.

use std::{
    collections::BTreeSet,
    fmt,
    io::{self, Write},
};

use crate::{
    graph::{Graph, VertexId},
    label::{Label, LabelStore},
};

/// Renders one output record: the vertex id followed by every held label in
/// ascending order, separated by single spaces.
///
/// # Examples
/// ```
/// use slpa_core::{Label, LabelStore, VertexId, format_vertex};
///
/// let mut store = LabelStore::init(Label::new(3));
/// store.record_observation(Label::new(1));
/// assert_eq!(format_vertex(VertexId::new(3), &store), "3 1 3");
///
/// store.prune(1.0);
/// assert_eq!(format_vertex(VertexId::new(3), &store), "3");
/// ```
#[must_use]
pub fn format_vertex(id: VertexId, store: &LabelStore) -> String {
    render(id, store.labels())
}

fn render(id: VertexId, labels: impl Iterator<Item = Label>) -> String {
    let mut line = id.to_string();
    for label in labels {
        line.push(' ');
        line.push_str(&label.to_string());
    }
    line
}

/// Labels one vertex retained after pruning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    vertex: VertexId,
    labels: Vec<Label>,
}

impl Membership {
    /// Returns the vertex.
    #[rustfmt::skip]
    #[must_use]
    pub const fn vertex(&self) -> VertexId { self.vertex }

    /// Returns the retained labels in ascending order.
    #[rustfmt::skip]
    #[must_use]
    pub fn labels(&self) -> &[Label] { &self.labels }

    /// Returns `true` when pruning left the vertex without any label.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self.vertex, self.labels.iter().copied()))
    }
}

/// Overlapping community assignment for every vertex, in ascending vertex
/// order.
///
/// # Examples
/// ```
/// use slpa_core::{Communities, GraphIngestion, Label, VertexId};
///
/// let mut ingestion = GraphIngestion::new();
/// ingestion.ingest_line(1, "1 2")?;
/// let communities = Communities::from_graph(&ingestion.finalize()?);
///
/// assert_eq!(communities.vertex_count(), 2);
/// assert_eq!(communities.community_count(), 2);
/// assert_eq!(communities.members(Label::new(2)), [VertexId::new(2)]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Communities {
    memberships: Vec<Membership>,
}

impl Communities {
    /// Snapshots the labels currently held by every vertex of `graph`.
    #[must_use]
    pub fn from_graph(graph: &Graph<LabelStore>) -> Self {
        let memberships = graph
            .vertices()
            .map(|(vertex, store)| Membership {
                vertex,
                labels: store.labels().collect(),
            })
            .collect();
        Self { memberships }
    }

    /// Returns one membership record per vertex.
    #[rustfmt::skip]
    #[must_use]
    pub fn memberships(&self) -> &[Membership] { &self.memberships }

    /// Returns the number of vertices.
    #[rustfmt::skip]
    #[must_use]
    pub fn vertex_count(&self) -> usize { self.memberships.len() }

    /// Returns the number of distinct labels held by at least one vertex.
    #[must_use]
    pub fn community_count(&self) -> usize {
        self.memberships
            .iter()
            .flat_map(|membership| membership.labels.iter().copied())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Returns the number of vertices left without any label.
    #[must_use]
    pub fn empty_vertex_count(&self) -> usize {
        self.memberships
            .iter()
            .filter(|membership| membership.is_empty())
            .count()
    }

    /// Returns the vertices that retained `label`, in ascending order.
    #[must_use]
    pub fn members(&self, label: Label) -> Vec<VertexId> {
        self.memberships
            .iter()
            .filter(|membership| membership.labels.binary_search(&label).is_ok())
            .map(Membership::vertex)
            .collect()
    }
}

/// Writes one line per membership, each terminated by `\n`.
///
/// # Errors
/// Propagates any error returned by `writer`.
pub fn write_communities<W: Write>(mut writer: W, communities: &Communities) -> io::Result<()> {
    for membership in communities.memberships() {
        writeln!(writer, "{membership}")?;
    }
    writer.flush()
}
