//! Labels, per-vertex label memories, and the shared mode selection rule.
//!
//! Both the speaker role (announcing a vertex's dominant label) and the
//! listener role (picking a winner among announcements) go through
//! [`select_mode`], so the two roles can never disagree on tie-breaking.

mod store;

use std::fmt;

pub use self::store::{LabelStore, PruneOutcome};

/// Opaque community label. Every vertex is seeded with a label equal to its
/// own identifier.
///
/// # Examples
/// ```
/// use slpa_core::Label;
///
/// let label = Label::new(7);
/// assert_eq!(label.get(), 7);
/// assert_eq!(label.to_string(), "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u64);

impl Label {
    /// Creates a label from its raw identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(id: u64) -> Self { Self(id) }

    /// Returns the raw identifier.
    #[rustfmt::skip]
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns the label with the highest count.
///
/// `tally` must yield labels in ascending order. Only a strictly greater
/// count replaces the current best, so among tied maxima the first (and
/// therefore smallest) label wins. Returns `None` for an empty tally.
///
/// # Examples
/// ```
/// use slpa_core::{Label, select_mode};
///
/// let tally = [(Label::new(2), 3), (Label::new(5), 3), (Label::new(9), 1)];
/// assert_eq!(select_mode(tally), Some(Label::new(2)));
/// assert_eq!(select_mode(std::iter::empty()), None);
/// ```
pub fn select_mode<I>(tally: I) -> Option<Label>
where
    I: IntoIterator<Item = (Label, u64)>,
{
    let mut best: Option<(Label, u64)> = None;
    for (label, count) in tally {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((label, count)),
        }
    }
    best.map(|(label, _)| label)
}
