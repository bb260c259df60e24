//! Benchmark support crate for slpa.
//!
//! Provides seeded planted-partition graphs and parameter types used by the
//! Criterion benchmarks for edge-list ingestion and label propagation.

pub mod error;
pub mod params;
pub mod source;
