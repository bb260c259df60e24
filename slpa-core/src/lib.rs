//! Overlapping community detection with speaker-listener label propagation.
//!
//! Every vertex starts with a label equal to its own id. In each superstep an
//! active vertex hears the dominant label of each out-neighbour, keeps the
//! most announced one, and wakes its out-neighbours. After the last
//! superstep labels whose normalised frequency falls below a threshold are
//! pruned; the survivors are the vertex's communities.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod emission;
mod engine;
mod error;
mod graph;
mod ingest;
mod label;
mod propagation;
mod result;
mod slpa;

pub use crate::{
    builder::{
        DEFAULT_MAX_SUPERSTEPS, DEFAULT_THRESHOLD, ExecutionStrategy, SlpaBuilder, Threshold,
    },
    emission::{OUTPUT_FILE_NAME, PruneSummary},
    engine::{
        Context, EdgeDirection, EdgeRef, EngineConfig, EngineReport, HaltReason, Signals,
        SyncEngine, VertexMut, VertexProgram, VertexRef,
    },
    error::{
        EngineError, EngineErrorCode, IngestError, IngestErrorCode, LineError, Result, SlpaError,
        SlpaErrorCode,
    },
    graph::{Edge, Graph, GraphBuilder, VertexId},
    ingest::{GraphIngestion, parse_edge_line},
    label::{Label, LabelStore, PruneOutcome, select_mode},
    propagation::{Announcements, SlpaProgram},
    result::{Communities, Membership, format_vertex, write_communities},
    slpa::{Slpa, SlpaRun},
};
