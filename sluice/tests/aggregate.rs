mod helpers;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sluice::{
    Aggregator, AggregationResponse, FailureKind, PartnerAdapter, PartnerOutcome, SluiceError,
    TimeWindow,
};
use sluice_mock::{MockBehavior, MockPartner};

use helpers::{arc, rec, window};

#[tokio::test]
async fn all_partners_succeed() {
    let partners: Vec<MockPartner> = ["Talos", "FalconX", "Aquanow", "Fireblocks"]
        .iter()
        .map(|n| MockPartner::returning(*n, vec![rec(&format!("{n}-1"))]))
        .collect();

    let mut builder = Aggregator::builder();
    for p in &partners {
        builder = builder.with_partner(arc(p));
    }
    let report = builder.build().unwrap().aggregate(&window()).await.unwrap();

    let summary = report.summary();
    assert_eq!(summary.successful, 4);
    assert_eq!(summary.failed, 0);
    assert_eq!(report.data.len(), 4);
    for d in &report.data {
        assert_eq!(d.records.len(), 1);
    }
    assert!(partners.iter().all(|p| p.calls() == 1));
}

#[tokio::test]
async fn partial_failure_is_isolated() {
    let x = MockPartner::returning("X", vec![rec("x-1")]);
    let y = MockPartner::venue_error("Y", "Invalid API Key");
    let z = MockPartner::panicking("Z", "Connection Timeout");

    let agg = Aggregator::builder()
        .with_partner(arc(&x))
        .with_partner(arc(&y))
        .with_partner(arc(&z))
        .build()
        .unwrap();
    let report = agg.aggregate(&window()).await.unwrap();

    assert_eq!(report.successful_partners, vec!["X"]);
    let y_fail = report.failure_for("Y").unwrap();
    assert_eq!(y_fail.reason, "Invalid API Key");
    assert_eq!(y_fail.kind, FailureKind::Venue);
    let z_fail = report.failure_for("Z").unwrap();
    assert_eq!(z_fail.reason, "Connection Timeout");
    assert_eq!(z_fail.kind, FailureKind::Rejected);
    assert_eq!(report.data.len(), 1);
    assert_eq!(report.records_for("X").unwrap(), &[rec("x-1")]);
}

#[tokio::test]
async fn configuration_failure_is_not_transport() {
    let missing = MockPartner::new(
        "Talos",
        MockBehavior::Fail(SluiceError::configuration(
            "Talos",
            "API secret for Talos is not configured",
        )),
    );
    let report = Aggregator::builder()
        .with_partner(arc(&missing))
        .build()
        .unwrap()
        .aggregate(&window())
        .await
        .unwrap();
    let f = report.failure_for("Talos").unwrap();
    assert_eq!(f.kind, FailureKind::Configuration);
    assert_ne!(f.kind, FailureKind::Transport);
}

#[tokio::test(start_paused = true)]
async fn slow_partner_times_out_without_delaying_others() {
    let fast = MockPartner::new(
        "Fast",
        MockBehavior::Delay(Duration::from_millis(10), vec![rec("f-1")]),
    );
    let stuck = MockPartner::hanging("Stuck");

    let agg = Aggregator::builder()
        .with_partner(arc(&stuck))
        .with_partner(arc(&fast))
        .partner_timeout(Duration::from_millis(250))
        .build()
        .unwrap();

    let started = tokio::time::Instant::now();
    let report = agg.aggregate(&window()).await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(250));
    assert!(elapsed < Duration::from_secs(1));
    assert_eq!(report.successful_partners, vec!["Fast"]);
    let f = report.failure_for("Stuck").unwrap();
    assert_eq!(f.kind, FailureKind::Transport);
    assert_eq!(f.reason, "partner call timed out after 250ms");
}

#[tokio::test]
async fn lists_follow_registry_order_not_completion_order() {
    let slow = MockPartner::new(
        "Slow",
        MockBehavior::Delay(Duration::from_millis(60), vec![rec("s")]),
    );
    let quick = MockPartner::returning("Quick", vec![rec("q")]);
    let bad_slow = MockPartner::new(
        "BadSlow",
        MockBehavior::Fail(SluiceError::transport("BadSlow", "reset")),
    );
    let bad_quick = MockPartner::venue_error("BadQuick", "rate limited");

    let report = Aggregator::builder()
        .with_partner(arc(&slow))
        .with_partner(arc(&bad_slow))
        .with_partner(arc(&quick))
        .with_partner(arc(&bad_quick))
        .build()
        .unwrap()
        .aggregate(&window())
        .await
        .unwrap();

    assert_eq!(report.successful_partners, vec!["Slow", "Quick"]);
    let failed: Vec<_> = report
        .failed_partners
        .iter()
        .map(|f| f.partner.as_str())
        .collect();
    assert_eq!(failed, vec!["BadSlow", "BadQuick"]);
    let keys: Vec<_> = report.data.iter().map(|d| d.partner.as_str()).collect();
    assert_eq!(keys, vec!["Slow", "Quick"]);
}

#[tokio::test]
async fn repeated_runs_serialize_identically() {
    let agg = Aggregator::builder()
        .with_partner(arc(&MockPartner::returning("A", vec![rec("a-1"), rec("a-2")])))
        .with_partner(arc(&MockPartner::venue_error("B", "bad signature")))
        .with_partner(arc(&MockPartner::returning("C", vec![])))
        .build()
        .unwrap();

    let first = agg.aggregate(&window()).await.unwrap();
    let second = agg.aggregate(&window()).await.unwrap();
    assert_eq!(
        serde_json::to_string(&AggregationResponse::from(&first)).unwrap(),
        serde_json::to_string(&AggregationResponse::from(&second)).unwrap()
    );
}

#[tokio::test]
async fn every_partner_sees_the_same_window() {
    let a = MockPartner::returning("A", vec![]);
    let b = MockPartner::returning("B", vec![]);
    Aggregator::builder()
        .with_partner(arc(&a))
        .with_partner(arc(&b))
        .build()
        .unwrap()
        .aggregate(&window())
        .await
        .unwrap();
    assert_eq!(a.windows().await, vec![window()]);
    assert_eq!(b.windows().await, vec![window()]);
}

#[test]
fn builder_rejects_empty_and_duplicate_registries() {
    assert!(matches!(
        Aggregator::builder().build(),
        Err(SluiceError::InvalidArg(_))
    ));

    let dup = Aggregator::builder()
        .with_partner(arc(&MockPartner::returning("Talos", vec![])))
        .with_partner(arc(&MockPartner::returning("Talos", vec![])))
        .build();
    match dup {
        Err(SluiceError::InvalidArg(msg)) => assert!(msg.contains("Talos")),
        other => panic!("unexpected: {:?}", other.err()),
    }

    // Names are case-sensitive.
    assert!(
        Aggregator::builder()
            .with_partner(arc(&MockPartner::returning("talos", vec![])))
            .with_partner(arc(&MockPartner::returning("Talos", vec![])))
            .build()
            .is_ok()
    );
}

#[tokio::test(start_paused = true)]
async fn overall_deadline_fails_the_run() {
    let agg = Aggregator::builder()
        .with_partner(arc(&MockPartner::hanging("Stuck")))
        .with_partner(arc(&MockPartner::returning("Ok", vec![])))
        .partner_timeout(Duration::from_secs(30))
        .request_timeout(Duration::from_secs(1))
        .build()
        .unwrap();

    let err = agg.aggregate(&window()).await.unwrap_err();
    assert!(matches!(err, SluiceError::RequestTimeout { .. }));
    assert!(err.is_fatal());
}

struct DropFlag {
    dropped: Arc<AtomicBool>,
}

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

struct Cancellable {
    dropped: Arc<AtomicBool>,
}

#[async_trait]
impl PartnerAdapter for Cancellable {
    fn name(&self) -> &str {
        "Cancellable"
    }

    async fn fetch(&self, _window: &TimeWindow) -> PartnerOutcome {
        let _flag = DropFlag {
            dropped: Arc::clone(&self.dropped),
        };
        std::future::pending::<PartnerOutcome>().await
    }
}

#[tokio::test(start_paused = true)]
async fn dropping_the_run_drops_pending_partner_calls() {
    let dropped = Arc::new(AtomicBool::new(false));
    let agg = Aggregator::builder()
        .with_partner(Arc::new(Cancellable {
            dropped: Arc::clone(&dropped),
        }))
        .build()
        .unwrap();

    let w = window();
    let run = agg.aggregate(&w);
    let res = tokio::time::timeout(Duration::from_millis(50), run).await;
    assert!(res.is_err());
    assert!(dropped.load(Ordering::SeqCst));
}

/// Panics while creating its future, before the orchestrator polls it.
struct PanicsOnCall;

impl PartnerAdapter for PanicsOnCall {
    fn name(&self) -> &str {
        "Eager"
    }

    fn fetch<'life0, 'life1, 'async_trait>(
        &'life0 self,
        _window: &'life1 TimeWindow,
    ) -> Pin<Box<dyn Future<Output = PartnerOutcome> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        panic!("adapter misconfigured")
    }
}

#[tokio::test]
async fn panic_before_first_poll_is_isolated() {
    let ok = MockPartner::returning("Talos", vec![rec("t-1")]);
    let report = Aggregator::builder()
        .with_partner(arc(&ok))
        .with_partner(Arc::new(PanicsOnCall))
        .build()
        .unwrap()
        .aggregate(&window())
        .await
        .unwrap();

    assert_eq!(report.successful_partners, vec!["Talos".to_string()]);
    let failed = report.failure_for("Eager").unwrap();
    assert_eq!(failed.kind, FailureKind::Rejected);
    assert_eq!(failed.reason, "adapter misconfigured");
}
