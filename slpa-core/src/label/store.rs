//! Ordered label memory owned by each vertex.

use std::collections::BTreeMap;

use super::{Label, select_mode};

/// Ordered multiset of labels heard by a vertex.
///
/// Keys iterate in ascending label order, which both the tie-break rule and
/// the output format depend on. `total` always equals the sum of all counts
/// until [`LabelStore::prune`] runs.
///
/// # Examples
/// ```
/// use slpa_core::{Label, LabelStore};
///
/// let mut store = LabelStore::init(Label::new(4));
/// store.record_observation(Label::new(9));
/// store.record_observation(Label::new(9));
/// assert_eq!(store.dominant_label(), Some(Label::new(9)));
/// assert_eq!(store.total_observations(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelStore {
    counts: BTreeMap<Label, u64>,
    total: u64,
}

/// Summary of a single [`LabelStore::prune`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PruneOutcome {
    /// Labels that met the threshold.
    pub kept: usize,
    /// Labels removed for falling below the threshold.
    pub removed: usize,
}

impl PruneOutcome {
    /// Returns `true` when pruning removed every label.
    #[must_use]
    pub const fn emptied(&self) -> bool {
        self.kept == 0
    }
}

impl LabelStore {
    /// Creates a store holding only the seed label with count one.
    #[must_use]
    pub fn init(seed: Label) -> Self {
        Self {
            counts: BTreeMap::from([(seed, 1)]),
            total: 1,
        }
    }

    /// Records one observation of `label`, inserting it when absent.
    pub fn record_observation(&mut self, label: Label) {
        *self.counts.entry(label).or_insert(0) += 1;
        self.total += 1;
    }

    /// Returns the most frequently observed label, ties going to the
    /// smallest identifier. `None` only once pruning has emptied the store.
    #[must_use]
    pub fn dominant_label(&self) -> Option<Label> {
        select_mode(self.iter())
    }

    /// Removes every label whose normalised frequency is below `threshold`.
    ///
    /// The frequencies are computed against the observation total as it
    /// stood before the call; the total itself is left untouched so the
    /// surviving counts remain interpretable. The store may end up empty.
    ///
    /// # Examples
    /// ```
    /// use slpa_core::{Label, LabelStore};
    ///
    /// let mut store = LabelStore::init(Label::new(5));
    /// store.record_observation(Label::new(5));
    /// store.record_observation(Label::new(5));
    /// store.record_observation(Label::new(7));
    ///
    /// let outcome = store.prune(0.5);
    /// assert_eq!((outcome.kept, outcome.removed), (1, 1));
    /// assert_eq!(store.labels().collect::<Vec<_>>(), [Label::new(5)]);
    /// ```
    pub fn prune(&mut self, threshold: f64) -> PruneOutcome {
        let before = self.counts.len();
        let total = self.total;
        self.counts
            .retain(|_, count| normalised(*count, total) >= threshold);
        let kept = self.counts.len();
        PruneOutcome {
            kept,
            removed: before - kept,
        }
    }

    /// Returns how often `label` has been observed.
    #[must_use]
    pub fn count(&self, label: Label) -> u64 {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    /// Returns `count(label) / total_observations()`.
    #[must_use]
    pub fn frequency(&self, label: Label) -> f64 {
        normalised(self.count(label), self.total)
    }

    /// Returns the number of observations recorded so far, seed included.
    #[rustfmt::skip]
    #[must_use]
    pub fn total_observations(&self) -> u64 { self.total }

    /// Returns the number of distinct labels held.
    #[rustfmt::skip]
    #[must_use]
    pub fn len(&self) -> usize { self.counts.len() }

    /// Returns `true` when no label is held.
    #[rustfmt::skip]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.counts.is_empty() }

    /// Iterates `(label, count)` pairs in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, u64)> + '_ {
        self.counts.iter().map(|(label, count)| (*label, *count))
    }

    /// Iterates the held labels in ascending order.
    pub fn labels(&self) -> impl Iterator<Item = Label> + '_ {
        self.counts.keys().copied()
    }
}

fn normalised(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64
}
