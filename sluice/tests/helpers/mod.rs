#![allow(dead_code)]
// Shared fixtures so tests can `use helpers::*;`

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use sluice::{PartnerAdapter, RawRecord, TimeWindow};
use sluice_mock::MockPartner;

/// `2024-03-01T12:05:00Z`.
pub fn window_end() -> DateTime<Utc> {
    sluice_mock::fixtures::window_end()
}

/// The five minutes ending at [`window_end`].
pub fn window() -> TimeWindow {
    TimeWindow::ending_at(window_end(), Duration::from_secs(300)).expect("valid window")
}

/// A minimal record with only `id` populated.
pub fn rec(id: &str) -> RawRecord {
    let mut r = RawRecord::new();
    r.insert("id".to_string(), json!(id));
    r
}

/// Erase a mock's type for registration.
pub fn arc(p: &MockPartner) -> Arc<dyn PartnerAdapter> {
    Arc::new(p.clone())
}

/// Fixed clock returning [`window_end`].
pub fn fixed_clock() -> sluice::Clock {
    Arc::new(window_end)
}
