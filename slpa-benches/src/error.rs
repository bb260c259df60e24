//! Benchmark setup error type.

use slpa_core::{EngineError, SlpaError};

use crate::source::SyntheticError;

/// Errors that may occur while preparing benchmark inputs.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic graph generation failed.
    #[error("synthetic graph generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// Building the graph from generated edges failed.
    #[error("graph construction failed: {0}")]
    Engine(#[from] EngineError),
    /// Configuring or running propagation failed.
    #[error("propagation failed: {0}")]
    Slpa(#[from] SlpaError),
}
