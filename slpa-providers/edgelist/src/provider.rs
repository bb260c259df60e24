//! Line-by-line edge-list loading.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use slpa_core::{Graph, GraphIngestion, LabelStore};
use tracing::{info, instrument, warn};

use crate::errors::EdgeListError;

/// What to do with a line that is not `source target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedLinePolicy {
    /// Stop at the first malformed line.
    #[default]
    Abort,
    /// Log the line, count it and continue.
    Skip,
}

/// A finalised graph loaded from an edge list.
#[derive(Debug)]
pub struct EdgeListProvider {
    name: String,
    graph: Graph<LabelStore>,
    skipped_lines: usize,
}

impl EdgeListProvider {
    /// Loads an edge list from `path`.
    ///
    /// # Errors
    /// Returns [`EdgeListError::Io`] when the file cannot be read, otherwise
    /// as [`Self::try_from_reader`].
    pub fn try_from_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        policy: MalformedLinePolicy,
    ) -> Result<Self, EdgeListError> {
        let file = File::open(path)?;
        Self::try_from_reader(name, BufReader::new(file), policy)
    }

    /// Loads an edge list from any buffered reader.
    ///
    /// # Errors
    /// Returns [`EdgeListError::MalformedLine`] for the first bad line under
    /// [`MalformedLinePolicy::Abort`], [`EdgeListError::EmptyInput`] when no
    /// edge was read, and [`EdgeListError::Io`] on read failures, including
    /// invalid UTF-8.
    ///
    /// # Examples
    /// ```
    /// use slpa_providers_edgelist::{EdgeListProvider, MalformedLinePolicy};
    ///
    /// let text = "1 2\n\n2 3\n";
    /// let provider = EdgeListProvider::try_from_reader("demo", text.as_bytes(), MalformedLinePolicy::Abort)?;
    /// assert_eq!(provider.graph().vertex_count(), 3);
    /// assert_eq!(provider.graph().edge_count(), 2);
    /// # Ok::<(), slpa_providers_edgelist::EdgeListError>(())
    /// ```
    #[instrument(name = "edgelist.load", err, skip(name, reader), fields(name = tracing::field::Empty))]
    pub fn try_from_reader<R: BufRead>(
        name: impl Into<String>,
        reader: R,
        policy: MalformedLinePolicy,
    ) -> Result<Self, EdgeListError> {
        let name = name.into();
        tracing::Span::current().record("name", name.as_str());

        let mut ingestion = GraphIngestion::new();
        let mut skipped_lines = 0usize;
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            match ingestion.ingest_line(index + 1, &line) {
                Ok(_) => {}
                Err(error) if policy == MalformedLinePolicy::Skip => {
                    warn!(source = %name, %error, "skipping malformed line");
                    skipped_lines += 1;
                }
                Err(source) => return Err(EdgeListError::MalformedLine { name, source }),
            }
        }

        if ingestion.edge_count() == 0 {
            return Err(EdgeListError::EmptyInput { name });
        }
        info!(
            source = %name,
            vertices = ingestion.vertex_count(),
            edges = ingestion.edge_count(),
            skipped = skipped_lines,
            "edge list loaded"
        );
        let graph = ingestion.finalize()?;
        Ok(Self {
            name,
            graph,
            skipped_lines,
        })
    }

    /// Returns the data-source name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the loaded graph.
    #[must_use]
    pub fn graph(&self) -> &Graph<LabelStore> {
        &self.graph
    }

    /// Returns how many malformed lines were skipped.
    #[must_use]
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Consumes the provider and returns the graph.
    #[must_use]
    pub fn into_graph(self) -> Graph<LabelStore> {
        self.graph
    }
}
