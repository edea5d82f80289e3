//! Deterministic records shaped like each venue's payload.
//!
//! All fixture timestamps fall inside the five minutes ending at
//! [`window_end`].
use chrono::{DateTime, Utc};
use serde_json::Value;

use sluice_core::RawRecord;

pub mod aquanow;
pub mod falconx;
pub mod fireblocks;
pub mod talos;

/// `2024-03-01T12:05:00Z`, the end of the window the fixtures are built for.
#[must_use]
pub fn window_end() -> DateTime<Utc> {
    DateTime::from_timestamp(1_709_294_700, 0).unwrap_or_default()
}

/// Record from `(field, value)` pairs, in order.
pub(crate) fn record<const N: usize>(fields: [(&str, Value); N]) -> RawRecord {
    fields
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
