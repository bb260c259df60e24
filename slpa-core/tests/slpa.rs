//! Tests for the `Slpa` orchestration API.

mod common;

use std::fs;

use common::{graph_from, render};
use rstest::{fixture, rstest};
use slpa_core::{
    Edge, ExecutionStrategy, GraphIngestion, HaltReason, Label, OUTPUT_FILE_NAME, SlpaBuilder,
    SlpaError, VertexId,
};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

use slpa_test_support::tracing::RecordingLayer;

const TRIANGLE: &str = "1 2\n2 3\n3 1\n";

#[fixture]
fn triangle() -> slpa_core::Graph<slpa_core::LabelStore> {
    graph_from(TRIANGLE)
}

#[rstest]
fn builder_defaults() {
    let builder = SlpaBuilder::new();
    assert_eq!(builder.threshold(), 0.1);
    assert_eq!(builder.max_supersteps(), 20);
    assert_eq!(builder.execution_strategy(), ExecutionStrategy::Auto);

    let slpa = builder.build().expect("defaults valid");
    assert_eq!(slpa.threshold().get(), 0.1);
    assert_eq!(slpa.max_supersteps(), 20);
}

#[rstest]
fn builder_rejects_out_of_range_threshold() {
    let err = SlpaBuilder::new()
        .with_threshold(1.5)
        .build()
        .expect_err("builder must reject thresholds above one");
    assert!(matches!(err, SlpaError::InvalidThreshold { got } if got == 1.5));
}

#[rstest]
fn zero_supersteps_keep_seed_labels() {
    let slpa = SlpaBuilder::new()
        .with_max_supersteps(0)
        .with_threshold(0.0)
        .build()
        .expect("configuration must be valid");
    let run = slpa
        .run("baseline", graph_from("1 2\n2 3\n5 1\n"))
        .expect("run must succeed");

    assert_eq!(run.report().supersteps, 0);
    assert_eq!(render(&run), "1 1\n2 2\n3 3\n5 5\n");
    for (id, store) in run.graph().vertices() {
        assert_eq!(store.iter().collect::<Vec<_>>(), [(Label::new(id.get()), 1)]);
    }
}

#[rstest]
fn mutual_pair_exchanges_labels() {
    let slpa = SlpaBuilder::new()
        .with_max_supersteps(1)
        .with_threshold(0.0)
        .build()
        .expect("configuration must be valid");
    let run = slpa
        .run("pair", graph_from("1 2\n2 1\n"))
        .expect("run must succeed");

    assert_eq!(render(&run), "1 1 2\n2 1 2\n");
    for (_, store) in run.graph().vertices() {
        assert_eq!(store.total_observations(), 2);
    }
}

#[rstest]
#[case::keep_everything(0.0, "1 1 2\n2 1 2 3\n3 1 3\n", 3, 0)]
#[case::majority_only(0.5, "1 2\n2\n3 1\n", 2, 1)]
#[case::third_is_kept(1.0 / 3.0, "1 1 2\n2 1 2 3\n3 1 3\n", 3, 0)]
fn triangle_after_two_supersteps(
    triangle: slpa_core::Graph<slpa_core::LabelStore>,
    #[case] threshold: f64,
    #[case] expected: &str,
    #[case] communities: usize,
    #[case] empty: usize,
) {
    let slpa = SlpaBuilder::new()
        .with_max_supersteps(2)
        .with_threshold(threshold)
        .build()
        .expect("configuration must be valid");
    let run = slpa.run("triangle", triangle).expect("run must succeed");

    assert_eq!(run.report().halt, HaltReason::SuperstepLimit);
    assert_eq!(render(&run), expected);
    let summary = run.communities();
    assert_eq!(summary.community_count(), communities);
    assert_eq!(summary.empty_vertex_count(), empty);
    assert_eq!(run.pruning().emptied_vertices, empty);
}

#[rstest]
fn isolated_vertex_survives_full_threshold() {
    let mut ingestion = GraphIngestion::new();
    ingestion.ingest_edge(Edge::new(VertexId::new(1), VertexId::new(2)));
    ingestion.ingest_edge(Edge::new(VertexId::new(2), VertexId::new(1)));
    ingestion.ingest_vertex(VertexId::new(9));
    let graph = ingestion.finalize().expect("graph must finalize");

    let slpa = SlpaBuilder::new()
        .with_threshold(1.0)
        .build()
        .expect("configuration must be valid");
    let run = slpa.run("isolated", graph).expect("run must succeed");

    let isolated = run
        .graph()
        .vertex(VertexId::new(9))
        .expect("vertex must exist");
    assert_eq!(isolated.iter().collect::<Vec<_>>(), [(Label::new(9), 1)]);
}

#[rstest]
fn repeated_runs_are_identical() {
    let text = "1 2\n2 3\n3 1\n3 4\n4 5\n5 6\n6 4\n6 1\n2 5\n";
    let slpa = SlpaBuilder::new()
        .with_max_supersteps(15)
        .build()
        .expect("configuration must be valid");
    let first = render(&slpa.run("ring", graph_from(text)).expect("run must succeed"));
    let second = render(&slpa.run("ring", graph_from(text)).expect("run must succeed"));
    assert_eq!(first, second);
}

#[cfg(feature = "parallel")]
#[rstest]
fn strategies_produce_identical_output() {
    let text = "1 2\n2 3\n3 1\n3 4\n4 5\n5 6\n6 4\n6 1\n2 5\n5 5\n";
    let outputs: Vec<String> = [ExecutionStrategy::Sequential, ExecutionStrategy::Parallel]
        .into_iter()
        .map(|strategy| {
            let slpa = SlpaBuilder::new()
                .with_max_supersteps(10)
                .with_threshold(0.2)
                .with_execution_strategy(strategy)
                .build()
                .expect("configuration must be valid");
            render(&slpa.run("ring", graph_from(text)).expect("run must succeed"))
        })
        .collect();
    assert_eq!(outputs[0], outputs[1]);
}

#[rstest]
fn run_edges_builds_and_runs() {
    let slpa = SlpaBuilder::new()
        .with_max_supersteps(1)
        .with_threshold(0.0)
        .build()
        .expect("configuration must be valid");
    let edges = [(1, 2), (2, 1)].map(|(s, t)| Edge::new(VertexId::new(s), VertexId::new(t)));
    let run = slpa.run_edges("pair", edges).expect("run must succeed");
    assert_eq!(run.data_source(), "pair");
    assert_eq!(render(&run), "1 1 2\n2 1 2\n");
}

#[rstest]
fn save_writes_output_file() {
    let dir = tempfile::tempdir().expect("temp dir must be created");
    let slpa = SlpaBuilder::new()
        .with_max_supersteps(2)
        .with_threshold(0.5)
        .build()
        .expect("configuration must be valid");
    let run = slpa.run("triangle", graph_from(TRIANGLE)).expect("run must succeed");

    let out = dir.path().join("results");
    let path = run.save(&out).expect("save must succeed");

    assert_eq!(path, out.join(OUTPUT_FILE_NAME));
    let written = fs::read_to_string(&path).expect("output must be readable");
    assert_eq!(written, render(&run));
}

#[rstest]
fn run_records_core_tracing(triangle: slpa_core::Graph<slpa_core::LabelStore>) {
    let slpa = SlpaBuilder::new()
        .with_max_supersteps(2)
        .with_threshold(0.5)
        .with_execution_strategy(ExecutionStrategy::Sequential)
        .build()
        .expect("configuration must be valid");
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let run = tracing::subscriber::with_default(subscriber, || slpa.run("triangle", triangle))
        .expect("run must succeed");
    assert_eq!(run.communities().vertex_count(), 3);

    let spans = layer.spans();
    let run_span = spans
        .iter()
        .find(|span| span.name == "core.run")
        .expect("core.run span must exist");
    assert_eq!(run_span.fields.get("data_source"), Some(&"triangle".to_owned()));
    assert_eq!(run_span.fields.get("vertices"), Some(&"3".to_owned()));
    assert_eq!(run_span.fields.get("edges"), Some(&"3".to_owned()));
    assert_eq!(run_span.fields.get("max_supersteps"), Some(&"2".to_owned()));
    assert_eq!(run_span.fields.get("strategy"), Some(&"Sequential".to_owned()));
    assert!(spans.iter().any(|span| span.name == "engine.start"));

    let events = layer.events();
    assert!(events.iter().any(|event| {
        event.level == Level::DEBUG
            && event
                .fields
                .get("message")
                .is_some_and(|value| value == "pruning emptied label store")
            && event.fields.get("vertex").is_some_and(|value| value == "2")
    }));
    assert!(events.iter().any(|event| {
        event.level == Level::INFO
            && event
                .fields
                .get("message")
                .is_some_and(|value| value == "propagation completed")
    }));
}

#[rstest]
fn run_logs_empty_graph_warning() {
    let slpa = SlpaBuilder::new().build().expect("configuration must be valid");
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());

    let empty = GraphIngestion::new()
        .finalize()
        .expect("empty graph must finalize");
    let err = tracing::subscriber::with_default(subscriber, || slpa.run("nothing", empty))
        .expect_err("empty graphs must fail");
    assert!(matches!(err, SlpaError::EmptyGraph { .. }));
    assert_eq!(err.code().as_str(), "SLPA_EMPTY_GRAPH");

    let spans = layer.spans();
    let run_span = spans
        .iter()
        .find(|span| span.name == "core.run")
        .expect("core.run span must exist");
    assert_eq!(run_span.fields.get("vertices"), Some(&"0".to_owned()));

    let events = layer.events();
    assert!(events.iter().any(|event| {
        event.level == Level::WARN
            && event
                .fields
                .get("message")
                .is_some_and(|value| value == "graph has no vertices, returning error")
    }));
}
