//! Final pruning pass and serialisation of surviving labels.

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use tracing::{debug, info};

use crate::{
    builder::Threshold,
    engine::SyncEngine,
    error::EngineError,
    propagation::SlpaProgram,
    result::format_vertex,
};

/// File written inside the output directory.
pub const OUTPUT_FILE_NAME: &str = "output";

/// Totals gathered by one pruning pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PruneSummary {
    /// Labels kept across all vertices.
    pub kept_labels: usize,
    /// Labels removed across all vertices.
    pub removed_labels: usize,
    /// Vertices whose store ended up empty.
    pub emptied_vertices: usize,
}

/// Prunes every vertex once against `threshold`.
pub(crate) fn prune_labels(engine: &mut SyncEngine<SlpaProgram>, threshold: Threshold) -> PruneSummary {
    let kept = AtomicUsize::new(0);
    let removed = AtomicUsize::new(0);
    let emptied = AtomicUsize::new(0);

    engine.transform_vertices(|mut vertex| {
        let outcome = vertex.data_mut().prune(threshold.get());
        kept.fetch_add(outcome.kept, Ordering::Relaxed);
        removed.fetch_add(outcome.removed, Ordering::Relaxed);
        if outcome.emptied() {
            emptied.fetch_add(1, Ordering::Relaxed);
            debug!(vertex = %vertex.id(), threshold = threshold.get(), "pruning emptied label store");
        }
    });

    let summary = PruneSummary {
        kept_labels: kept.into_inner(),
        removed_labels: removed.into_inner(),
        emptied_vertices: emptied.into_inner(),
    };
    record_pruned(summary.removed_labels);
    info!(
        threshold = threshold.get(),
        kept = summary.kept_labels,
        removed = summary.removed_labels,
        emptied = summary.emptied_vertices,
        "pruned label stores"
    );
    summary
}

/// Writes one record per vertex to `dir/output` and returns the file path.
pub(crate) fn save_output(engine: &SyncEngine<SlpaProgram>, dir: &Path) -> Result<PathBuf, EngineError> {
    let path = dir.join(OUTPUT_FILE_NAME);
    engine.save(&path, |id, store| Some(format_vertex(id, store)), |_| None)?;
    Ok(path)
}

#[cfg(feature = "metrics")]
fn record_pruned(removed: usize) {
    metrics::counter!("slpa_labels_pruned_total").increment(removed as u64);
}

#[cfg(not(feature = "metrics"))]
fn record_pruned(_removed: usize) {}
