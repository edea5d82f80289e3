mod helpers;

use sluice::{Aggregator, JsonLinesSink, MemorySink, RecordSink, SluiceError, persist_report};
use sluice_mock::MockPartner;

use helpers::{arc, rec, window};

async fn report() -> sluice::AggregationReport {
    Aggregator::builder()
        .with_partner(arc(&MockPartner::returning("FalconX", vec![rec("fx-1"), rec("fx-2")])))
        .with_partner(arc(&MockPartner::returning("Talos", vec![])))
        .with_partner(arc(&MockPartner::venue_error("Aquanow", "bad signature")))
        .build()
        .unwrap()
        .aggregate(&window())
        .await
        .unwrap()
}

#[tokio::test]
async fn writes_successful_partners_to_raw_tables() {
    let sink = MemorySink::new();
    let written = persist_report(&report().await, &sink).await.unwrap();

    assert_eq!(written, 2);
    let batches = sink.batches().await;
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].0, "raw_falconx_trades");
    assert_eq!(sink.rows("raw_falconx_trades").await, vec![rec("fx-1"), rec("fx-2")]);
    assert!(sink.rows("raw_talos_trades").await.is_empty());
}

#[tokio::test]
async fn json_lines_sink_appends_one_document_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonLinesSink::new(dir.path().join("raw"));

    persist_report(&report().await, &sink).await.unwrap();
    persist_report(&report().await, &sink).await.unwrap();

    let text = std::fs::read_to_string(sink.path_for("raw_falconx_trades")).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["id"], "fx-1");
    assert!(!sink.path_for("raw_talos_trades").exists());
}

#[tokio::test]
async fn json_lines_sink_rejects_unsafe_table_names() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonLinesSink::new(dir.path());
    let err = sink.write_batch("../escape", &[rec("x")]).await.unwrap_err();
    assert!(matches!(err, SluiceError::Sink { .. }));
}

#[tokio::test]
async fn partners_sharing_a_table_are_not_merged() {
    let report = Aggregator::builder()
        .with_partner(arc(&MockPartner::returning("Talos EU", vec![rec("a-1")])))
        .with_partner(arc(&MockPartner::returning("Talos-EU", vec![rec("b-1")])))
        .build()
        .unwrap()
        .aggregate(&window())
        .await
        .unwrap();
    assert_eq!(report.successful_partners.len(), 2);

    let sink = MemorySink::new();
    match persist_report(&report, &sink).await {
        Err(SluiceError::Sink { table, msg }) => {
            assert_eq!(table, "raw_talos_eu_trades");
            assert!(msg.contains("Talos EU") && msg.contains("Talos-EU"));
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(sink.batches().await.is_empty());
}
