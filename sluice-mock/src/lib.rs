//! Mock partners for CI-safe tests and demos.
//!
//! [`MockPartner`] follows a scripted [`MockBehavior`]; [`fixtures`] holds
//! deterministic records shaped like each venue's payload.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use sluice_core::{PartnerAdapter, PartnerOutcome, RawRecord, SluiceError, TimeWindow};

pub mod fixtures;

/// Instruction for how a mock partner's `fetch` should behave.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return these records immediately.
    Return(Vec<RawRecord>),
    /// Fail immediately with the provided error.
    Fail(SluiceError),
    /// Hang indefinitely (simulate a stalled venue).
    Hang,
    /// Panic with this message (simulate a call that aborts without an outcome).
    Panic(String),
    /// Sleep, then return these records.
    Delay(Duration, Vec<RawRecord>),
}

/// Partner whose `fetch` follows a scripted behavior.
///
/// Clones share the behavior, call counter, and window log.
#[derive(Debug, Clone)]
pub struct MockPartner {
    name: String,
    behavior: Arc<Mutex<MockBehavior>>,
    calls: Arc<AtomicUsize>,
    windows: Arc<Mutex<Vec<TimeWindow>>>,
}

impl MockPartner {
    /// New mock partner.
    pub fn new(name: impl Into<String>, behavior: MockBehavior) -> Self {
        Self {
            name: name.into(),
            behavior: Arc::new(Mutex::new(behavior)),
            calls: Arc::new(AtomicUsize::new(0)),
            windows: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Partner returning `records`.
    pub fn returning(name: impl Into<String>, records: Vec<RawRecord>) -> Self {
        Self::new(name, MockBehavior::Return(records))
    }

    /// Partner reporting a venue error with `msg`.
    pub fn venue_error(name: impl Into<String>, msg: &str) -> Self {
        let name = name.into();
        let err = SluiceError::venue(name.clone(), None, msg);
        Self::new(name, MockBehavior::Fail(err))
    }

    /// Partner that never answers.
    pub fn hanging(name: impl Into<String>) -> Self {
        Self::new(name, MockBehavior::Hang)
    }

    /// Partner that panics with `msg`.
    pub fn panicking(name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::new(name, MockBehavior::Panic(msg.into()))
    }

    /// Replace the scripted behavior.
    pub async fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock().await = behavior;
    }

    /// Number of `fetch` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Windows passed to `fetch`, in call order.
    pub async fn windows(&self) -> Vec<TimeWindow> {
        self.windows.lock().await.clone()
    }
}

#[async_trait]
impl PartnerAdapter for MockPartner {
    fn name(&self) -> &str {
        &self.name
    }

    fn vendor(&self) -> &str {
        "Mock"
    }

    async fn fetch(&self, window: &TimeWindow) -> PartnerOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.windows.lock().await.push(*window);
        let behavior = self.behavior.lock().await.clone();
        match behavior {
            MockBehavior::Return(records) => PartnerOutcome::success(&self.name, records),
            MockBehavior::Fail(e) => PartnerOutcome::failure(&self.name, e),
            MockBehavior::Hang => std::future::pending::<PartnerOutcome>().await,
            MockBehavior::Panic(msg) => panic!("{msg}"),
            MockBehavior::Delay(d, records) => {
                tokio::time::sleep(d).await;
                PartnerOutcome::success(&self.name, records)
            }
        }
    }
}

/// One mock partner per fixture venue (Talos, FalconX, Aquanow, Fireblocks),
/// each returning its fixture records.
#[must_use]
pub fn fixture_partners() -> Vec<Arc<dyn PartnerAdapter>> {
    [
        MockPartner::returning("Talos", fixtures::talos::execution_reports()),
        MockPartner::returning("FalconX", fixtures::falconx::trades()),
        MockPartner::returning("Aquanow", fixtures::aquanow::orders()),
        MockPartner::returning("Fireblocks", fixtures::fireblocks::transactions()),
    ]
    .into_iter()
    .map(|p| Arc::new(p) as Arc<dyn PartnerAdapter>)
    .collect()
}
