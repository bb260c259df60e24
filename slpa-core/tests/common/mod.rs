use slpa_core::{Graph, GraphIngestion, LabelStore, SlpaRun, write_communities};

/// Builds a seeded graph from edge-list text, panicking on malformed lines.
#[must_use]
pub fn graph_from(text: &str) -> Graph<LabelStore> {
    let mut ingestion = GraphIngestion::new();
    for (index, line) in text.lines().enumerate() {
        ingestion
            .ingest_line(index + 1, line)
            .expect("fixture lines must parse");
    }
    ingestion.finalize().expect("fixture graph must finalize")
}

/// Renders the memberships of a run exactly as they are saved.
#[must_use]
pub fn render(run: &SlpaRun) -> String {
    let mut buffer = Vec::new();
    write_communities(&mut buffer, &run.communities()).expect("in-memory write must succeed");
    String::from_utf8(buffer).expect("output must be UTF-8")
}
