//! Benchmark parameter types.

use std::fmt;

/// Parameters for one propagation benchmark run.
#[derive(Clone, Debug)]
pub struct PropagationBenchParams {
    /// Number of vertices in the graph.
    pub vertex_count: usize,
    /// Superstep budget.
    pub supersteps: usize,
}

impl fmt::Display for PropagationBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},T={}", self.vertex_count, self.supersteps)
    }
}

/// Parameters for one ingestion benchmark run.
#[derive(Clone, Debug)]
pub struct IngestBenchParams {
    /// Number of edge lines parsed.
    pub edge_count: usize,
}

impl fmt::Display for IngestBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m={}", self.edge_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_render_compact_identifiers() {
        let propagation = PropagationBenchParams {
            vertex_count: 1_000,
            supersteps: 20,
        };
        assert_eq!(propagation.to_string(), "n=1000,T=20");
        assert_eq!(IngestBenchParams { edge_count: 5 }.to_string(), "m=5");
    }
}
