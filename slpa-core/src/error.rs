//! Error types for the SLPA core library.
//!
//! Defines the error enums exposed by the public API, their stable
//! machine-readable codes, and a convenient result alias.

use std::{fmt, io, path::PathBuf, sync::Arc};

use thiserror::Error;

use crate::{builder::ExecutionStrategy, graph::VertexId};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Reason a single edge-list line could not be parsed.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LineError {
    /// The line named a source vertex but no target.
    #[error("expected `source target` but found a single token")]
    MissingTarget,
    /// A token was not a non-negative integer.
    #[error("`{token}` is not a valid vertex identifier")]
    InvalidVertexId {
        /// The offending token.
        token: Arc<str>,
    },
    /// The line carried more than two tokens.
    #[error("found {extra} unexpected trailing token(s)")]
    TrailingTokens {
        /// Number of tokens after the target.
        extra: usize,
    },
}

/// An error produced while turning edge-list text into graph topology.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum IngestError {
    /// A non-blank line could not be parsed into an edge.
    #[error("line {line} (`{content}`) is malformed: {reason}")]
    MalformedLine {
        /// One-based line number within the source.
        line: usize,
        /// Raw line content with surrounding whitespace removed.
        content: Arc<str>,
        /// Why the line was rejected.
        #[source]
        reason: LineError,
    },
}

define_error_codes! {
    /// Stable codes describing [`IngestError`] variants.
    enum IngestErrorCode for IngestError {
        /// A non-blank line could not be parsed into an edge.
        MalformedLine => MalformedLine { .. } => "INGEST_MALFORMED_LINE",
    }
}

/// An error raised by the synchronous engine.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EngineError {
    /// An edge referenced a vertex that was never added.
    #[error("edge {source_id} -> {target_id} references unknown vertex {missing}")]
    UnknownVertex {
        /// Source of the offending edge.
        source_id: VertexId,
        /// Target of the offending edge.
        target_id: VertexId,
        /// The endpoint that has no vertex record.
        missing: VertexId,
    },
    /// Writing the graph to disk failed.
    #[error("failed to save graph to `{path}`: {source}")]
    Save {
        /// Destination that could not be written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

define_error_codes! {
    /// Stable codes describing [`EngineError`] variants.
    enum EngineErrorCode for EngineError {
        /// An edge referenced a vertex that was never added.
        UnknownVertex => UnknownVertex { .. } => "ENGINE_UNKNOWN_VERTEX",
        /// Writing the graph to disk failed.
        Save => Save { .. } => "ENGINE_SAVE_FAILED",
    }
}

/// Error type produced when configuring or running [`crate::Slpa`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SlpaError {
    /// The pruning threshold was not a finite fraction in `[0, 1]`.
    #[error("threshold must be a finite value in [0, 1] (got {got})")]
    InvalidThreshold {
        /// The rejected threshold.
        got: f64,
    },
    /// The graph handed to the runtime contained no vertices.
    #[error("graph `{data_source}` contains no vertices")]
    EmptyGraph {
        /// Identifier for the empty graph source.
        data_source: Arc<str>,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
    /// The engine failed while building, running or saving the graph.
    #[error("engine failure: {error}")]
    Engine {
        /// Underlying engine failure.
        #[source]
        error: EngineError,
    },
}

define_error_codes! {
    /// Stable codes describing [`SlpaError`] variants.
    enum SlpaErrorCode for SlpaError {
        /// The pruning threshold was not a finite fraction in `[0, 1]`.
        InvalidThreshold => InvalidThreshold { .. } => "SLPA_INVALID_THRESHOLD",
        /// The graph handed to the runtime contained no vertices.
        EmptyGraph => EmptyGraph { .. } => "SLPA_EMPTY_GRAPH",
        /// The requested execution strategy is unavailable in the current build.
        BackendUnavailable => BackendUnavailable { .. } => "SLPA_BACKEND_UNAVAILABLE",
        /// The engine failed while building, running or saving the graph.
        EngineFailure => Engine { .. } => "SLPA_ENGINE_FAILURE",
    }
}

impl SlpaError {
    /// Retrieve the inner [`EngineErrorCode`] when the error originated in the engine.
    #[must_use]
    pub const fn engine_code(&self) -> Option<EngineErrorCode> {
        match self {
            Self::Engine { error } => Some(error.code()),
            _ => None,
        }
    }
}

impl From<EngineError> for SlpaError {
    fn from(error: EngineError) -> Self {
        Self::Engine { error }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, SlpaError>;

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(SlpaError::InvalidThreshold { got: 2.0 }, "SLPA_INVALID_THRESHOLD")]
    #[case(SlpaError::EmptyGraph { data_source: Arc::from("g") }, "SLPA_EMPTY_GRAPH")]
    #[case(
        SlpaError::BackendUnavailable { requested: ExecutionStrategy::Parallel },
        "SLPA_BACKEND_UNAVAILABLE"
    )]
    fn slpa_error_codes_are_stable(#[case] error: SlpaError, #[case] expected: &str) {
        assert_eq!(error.code().as_str(), expected);
        assert_eq!(error.code().to_string(), expected);
        assert!(error.engine_code().is_none());
    }

    #[test]
    fn malformed_lines_carry_a_stable_code() {
        let error = IngestError::MalformedLine {
            line: 3,
            content: Arc::from("1 x"),
            reason: LineError::InvalidVertexId {
                token: Arc::from("x"),
            },
        };
        assert_eq!(error.code().as_str(), "INGEST_MALFORMED_LINE");
        assert_eq!(
            error.to_string(),
            "line 3 (`1 x`) is malformed: `x` is not a valid vertex identifier"
        );
    }

    #[test]
    fn engine_errors_convert_into_slpa_errors() {
        let error: SlpaError = EngineError::UnknownVertex {
            source_id: VertexId::new(1),
            target_id: VertexId::new(9),
            missing: VertexId::new(9),
        }
        .into();
        assert_eq!(error.engine_code(), Some(EngineErrorCode::UnknownVertex));
        assert_eq!(error.code().as_str(), "SLPA_ENGINE_FAILURE");
    }
}
