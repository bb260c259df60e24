//! Integration tests for loading edge lists.

use std::{fs, io::Cursor};

use rstest::rstest;
use slpa_core::{IngestErrorCode, Label, VertexId};
use slpa_providers_edgelist::{EdgeListError, EdgeListProvider, MalformedLinePolicy};
use slpa_test_support::tracing::RecordingLayer;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

fn load(text: &str, policy: MalformedLinePolicy) -> Result<EdgeListProvider, EdgeListError> {
    EdgeListProvider::try_from_reader("demo", Cursor::new(text.to_owned()), policy)
}

#[rstest]
#[case::plain("1 2\n2 3\n", 3, 2)]
#[case::blank_lines("\n1 2\n   \n\n2 3\n\n", 3, 2)]
#[case::crlf("1 2\r\n2 1\r\n", 2, 2)]
#[case::duplicates_and_loops("1 2\n1 2\n2 2\n", 2, 3)]
#[case::no_trailing_newline("4 5", 2, 1)]
fn loads_well_formed_lists(#[case] text: &str, #[case] vertices: usize, #[case] edges: usize) {
    let provider = load(text, MalformedLinePolicy::Abort).expect("edge list must load");
    assert_eq!(provider.name(), "demo");
    assert_eq!(provider.graph().vertex_count(), vertices);
    assert_eq!(provider.graph().edge_count(), edges);
    assert_eq!(provider.skipped_lines(), 0);
}

#[rstest]
fn vertices_start_with_their_own_label() {
    let provider = load("7 3\n", MalformedLinePolicy::Abort).expect("edge list must load");
    let graph = provider.into_graph();
    for id in [3, 7] {
        let store = graph.vertex(VertexId::new(id)).expect("vertex must exist");
        assert_eq!(store.dominant_label(), Some(Label::new(id)));
        assert_eq!(store.total_observations(), 1);
    }
}

#[rstest]
fn abort_reports_first_malformed_line() {
    let err = load("1 2\n2 x\n3\n", MalformedLinePolicy::Abort)
        .expect_err("malformed line must abort");
    assert_eq!(err.ingest_code(), Some(IngestErrorCode::MalformedLine));
    assert!(err.engine_code().is_none());
    assert!(
        err.to_string().starts_with("edge list `demo`: line 2 (`2 x`)"),
        "message must name the source and the line: {err}"
    );
    let EdgeListError::MalformedLine { name, source } = err else {
        panic!("expected malformed line error, got {err:?}");
    };
    assert_eq!(name, "demo");
    assert_eq!(source.code(), IngestErrorCode::MalformedLine);
}

#[rstest]
fn skip_counts_and_logs_malformed_lines() {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let provider = tracing::subscriber::with_default(subscriber, || {
        load("1 2\n2 x\n3\n2 3 9\n3 1\n", MalformedLinePolicy::Skip)
    })
    .expect("skip policy must load the valid lines");

    assert_eq!(provider.skipped_lines(), 3);
    assert_eq!(provider.graph().edge_count(), 2);
    let warnings = layer
        .events()
        .into_iter()
        .filter(|event| event.level == Level::WARN)
        .count();
    assert_eq!(warnings, 3);
    assert!(layer.has_event(Level::INFO, "edge list loaded"));
    let span = layer.span("edgelist.load").expect("load span must exist");
    assert_eq!(span.field("name"), Some("demo"));
}

#[rstest]
#[case::empty("")]
#[case::only_blank("\n  \n\t\n")]
fn rejects_inputs_without_edges(#[case] text: &str) {
    let err = load(text, MalformedLinePolicy::Abort).expect_err("empty input must fail");
    assert!(matches!(err, EdgeListError::EmptyInput { ref name } if name == "demo"));
}

#[rstest]
fn rejects_when_every_line_is_skipped() {
    let err = load("a b\n", MalformedLinePolicy::Skip).expect_err("nothing usable must fail");
    assert!(matches!(err, EdgeListError::EmptyInput { .. }));
}

#[rstest]
fn invalid_utf8_is_an_io_error() {
    let bytes: &[u8] = b"1 2\n\xff\xfe 3\n";
    let err = EdgeListProvider::try_from_reader("bytes", bytes, MalformedLinePolicy::Skip)
        .expect_err("invalid UTF-8 must fail");
    assert!(matches!(err, EdgeListError::Io(_)));
}

#[rstest]
fn loads_from_path() {
    let dir = tempfile::tempdir().expect("temp dir must be created");
    let path = dir.path().join("graph.txt");
    fs::write(&path, "1 2\n2 3\n3 1\n").expect("fixture must be written");

    let provider = EdgeListProvider::try_from_path("file", &path, MalformedLinePolicy::Abort)
        .expect("file must load");
    assert_eq!(provider.graph().edge_count(), 3);

    let missing = EdgeListProvider::try_from_path(
        "missing",
        dir.path().join("absent.txt"),
        MalformedLinePolicy::Abort,
    )
    .expect_err("missing file must fail");
    assert!(matches!(missing, EdgeListError::Io(_)));
}
