//! Error type for edge-list loading.

use std::io;

use slpa_core::{EngineError, EngineErrorCode, IngestError, IngestErrorCode};
use thiserror::Error;

/// Failure while loading an edge list.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EdgeListError {
    /// Reading the source failed, including on invalid UTF-8.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// A line was not `source target` under [`crate::MalformedLinePolicy::Abort`].
    #[error("edge list `{name}`: {source}")]
    MalformedLine {
        /// Data-source name.
        name: String,
        /// The rejected line.
        #[source]
        source: IngestError,
    },
    /// The loaded edges did not form a valid graph.
    #[error("graph construction failed: {0}")]
    Graph(#[from] EngineError),
    /// No edge was read.
    #[error("edge list `{name}` contains no edges")]
    EmptyInput {
        /// Data-source name.
        name: String,
    },
}

impl EdgeListError {
    /// Retrieve the inner [`IngestErrorCode`] when a line was rejected.
    #[must_use]
    pub const fn ingest_code(&self) -> Option<IngestErrorCode> {
        match self {
            Self::MalformedLine { source, .. } => Some(source.code()),
            _ => None,
        }
    }

    /// Retrieve the inner [`EngineErrorCode`] when graph construction failed.
    #[must_use]
    pub const fn engine_code(&self) -> Option<EngineErrorCode> {
        match self {
            Self::Graph(error) => Some(error.code()),
            _ => None,
        }
    }
}
