//! The SLPA vertex program.
//!
//! Each active vertex listens to the dominant label of every out-neighbour,
//! keeps the most frequently announced one, and wakes its out-neighbours for
//! the next superstep.

use std::collections::BTreeMap;

use crate::{
    engine::{Context, EdgeDirection, EdgeRef, Signals, VertexMut, VertexProgram, VertexRef},
    label::{Label, LabelStore, select_mode},
};

/// Multiset of labels announced to one listener during a superstep.
///
/// Merging adds counts, so the result is independent of the order in which
/// partial gathers are combined.
///
/// # Examples
/// ```
/// use slpa_core::{Announcements, Label};
///
/// let heard = Announcements::from_label(Label::new(4))
///     .merge(Announcements::from_label(Label::new(2)))
///     .merge(Announcements::from_label(Label::new(4)));
/// assert_eq!(heard.len(), 3);
/// assert_eq!(heard.winner(), Some(Label::new(4)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Announcements {
    tally: BTreeMap<Label, u64>,
}

impl Announcements {
    /// Creates a multiset holding a single announcement.
    #[must_use]
    pub fn from_label(label: Label) -> Self {
        Self {
            tally: BTreeMap::from([(label, 1)]),
        }
    }

    /// Adds every announcement in `other` to `self`.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        // Fold the smaller tally into the larger one.
        let (mut into, from) = if self.tally.len() >= other.tally.len() {
            (std::mem::take(&mut self.tally), other.tally)
        } else {
            (other.tally, std::mem::take(&mut self.tally))
        };
        for (label, count) in from {
            *into.entry(label).or_insert(0) += count;
        }
        Self { tally: into }
    }

    /// Returns the most announced label, ties going to the smallest.
    #[must_use]
    pub fn winner(&self) -> Option<Label> {
        select_mode(self.iter())
    }

    /// Iterates `(label, count)` pairs in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, u64)> + '_ {
        self.tally.iter().map(|(label, count)| (*label, *count))
    }

    /// Returns the number of announcements, duplicates included.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.tally.values().sum()
    }

    /// Returns `true` when nothing was announced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tally.is_empty()
    }
}

/// Speaker-listener label propagation over out-edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlpaProgram;

impl VertexProgram for SlpaProgram {
    type Data = LabelStore;
    type Gather = Announcements;

    fn gather_edges(&self) -> EdgeDirection {
        EdgeDirection::Out
    }

    fn gather(
        &self,
        _context: &Context,
        _vertex: VertexRef<'_, LabelStore>,
        edge: EdgeRef<'_, LabelStore>,
    ) -> Announcements {
        // Stores only empty during pruning, after the last superstep.
        edge.target()
            .data()
            .dominant_label()
            .map(Announcements::from_label)
            .unwrap_or_default()
    }

    fn combine(&self, left: Announcements, right: Announcements) -> Announcements {
        left.merge(right)
    }

    fn apply(
        &self,
        _context: &Context,
        mut vertex: VertexMut<'_, LabelStore>,
        heard: Option<Announcements>,
    ) {
        if let Some(winner) = heard.as_ref().and_then(Announcements::winner) {
            vertex.data_mut().record_observation(winner);
        }
    }

    fn scatter_edges(&self) -> EdgeDirection {
        EdgeDirection::Out
    }

    fn scatter(
        &self,
        _context: &Context,
        _vertex: VertexRef<'_, LabelStore>,
        edge: EdgeRef<'_, LabelStore>,
        signals: &mut Signals,
    ) {
        signals.signal(edge.target());
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        engine::{EngineConfig, SyncEngine},
        graph::{GraphBuilder, VertexId},
    };

    fn seeded_engine(vertices: &[u64], edges: &[(u64, u64)], supersteps: usize) -> SyncEngine<SlpaProgram> {
        let mut builder = GraphBuilder::new();
        for &id in vertices {
            builder.add_vertex_with(VertexId::new(id), |id| LabelStore::init(Label::new(id.get())));
        }
        for &(source, target) in edges {
            builder.add_edge(VertexId::new(source), VertexId::new(target));
        }
        let graph = builder.finalize().expect("graph must finalize");
        SyncEngine::new(
            SlpaProgram,
            graph,
            EngineConfig::new().with_max_supersteps(supersteps),
        )
    }

    fn store(engine: &SyncEngine<SlpaProgram>, id: u64) -> Vec<(u64, u64)> {
        engine
            .graph()
            .vertex(VertexId::new(id))
            .expect("vertex must exist")
            .iter()
            .map(|(label, count)| (label.get(), count))
            .collect()
    }

    #[rstest]
    #[case::tie_goes_to_smallest(&[3, 1], 1)]
    #[case::majority(&[3, 1, 3], 3)]
    #[case::single(&[8], 8)]
    fn announcements_pick_mode(#[case] heard: &[u64], #[case] expected: u64) {
        let merged = heard
            .iter()
            .map(|id| Announcements::from_label(Label::new(*id)))
            .fold(Announcements::default(), Announcements::merge);
        assert_eq!(merged.winner(), Some(Label::new(expected)));
        assert_eq!(merged.len(), heard.len() as u64);
    }

    #[test]
    fn merge_is_order_independent() {
        let a = Announcements::from_label(Label::new(1)).merge(Announcements::from_label(Label::new(2)));
        let b = Announcements::from_label(Label::new(2)).merge(Announcements::from_label(Label::new(1)));
        let left = a.clone().merge(b.clone());
        let right = b.merge(a);
        assert_eq!(left, right);
        assert_eq!(left.iter().collect::<Vec<_>>(), [(Label::new(1), 2), (Label::new(2), 2)]);
    }

    #[test]
    fn empty_announcements_have_no_winner() {
        let empty = Announcements::default();
        assert!(empty.is_empty());
        assert_eq!(empty.winner(), None);
    }

    #[test]
    fn mutual_edge_exchanges_seeds_in_one_superstep() {
        let mut engine = seeded_engine(&[1, 2], &[(1, 2), (2, 1)], 1);
        engine.signal_all();
        let report = engine.start();

        assert_eq!(report.supersteps, 1);
        assert_eq!(store(&engine, 1), [(1, 1), (2, 1)]);
        assert_eq!(store(&engine, 2), [(1, 1), (2, 1)]);
    }

    #[test]
    fn listener_ignores_in_neighbours() {
        let mut engine = seeded_engine(&[1, 2], &[(1, 2)], 3);
        engine.signal_all();
        engine.start();

        // 1 hears 2 every time it runs; 2 has no out-edges and never records.
        assert_eq!(store(&engine, 1), [(1, 1), (2, 1)]);
        assert_eq!(store(&engine, 2), [(2, 1)]);
    }

    #[test]
    fn duplicate_edges_weigh_announcements() {
        let mut engine = seeded_engine(&[1, 2, 3], &[(1, 3), (1, 3), (1, 2)], 1);
        engine.signal_all();
        engine.start();
        assert_eq!(store(&engine, 1), [(1, 1), (3, 1)]);
    }

    #[test]
    fn isolated_vertex_keeps_its_seed() {
        let mut engine = seeded_engine(&[1, 2, 9], &[(1, 2), (2, 1)], 5);
        engine.signal_all();
        engine.start();
        let isolated = engine
            .graph()
            .vertex(VertexId::new(9))
            .expect("vertex must exist");
        assert_eq!(isolated.iter().collect::<Vec<_>>(), [(Label::new(9), 1)]);
        assert_eq!(isolated.total_observations(), 1);
    }
}
