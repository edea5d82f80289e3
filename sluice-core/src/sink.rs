//! Persistence-sink contract for raw partner records.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use sluice_types::{RawRecord, SluiceError};

/// Destination table for a partner's raw records: `raw_<partner-lowercase>_trades`.
///
/// Characters outside `[a-z0-9_]` become `_`, so `"Talos EU"` maps to
/// `raw_talos_eu_trades`. The mapping is not injective: `"Talos-EU"` and
/// `"talos eu"` land on the same table, and `sluice::persist_report` refuses
/// to write a report containing such a pair.
#[must_use]
pub fn table_name_for(partner: &str) -> String {
    let slug: String = partner
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("raw_{slug}_trades")
}

/// Batch writer for raw records.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Write `records` to `table` and return how many were written.
    ///
    /// Implementations skip empty batches and return `Ok(0)`.
    ///
    /// # Errors
    /// Returns `SluiceError::Sink` when the batch cannot be written.
    async fn write_batch(&self, table: &str, records: &[RawRecord]) -> Result<usize, SluiceError>;
}

/// In-memory sink that records every batch it receives.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    batches: Arc<Mutex<Vec<(String, Vec<RawRecord>)>>>,
}

impl MemorySink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all batches written so far, in write order.
    pub async fn batches(&self) -> Vec<(String, Vec<RawRecord>)> {
        self.batches.lock().await.clone()
    }

    /// All records written to `table`.
    pub async fn rows(&self, table: &str) -> Vec<RawRecord> {
        self.batches
            .lock()
            .await
            .iter()
            .filter(|(t, _)| t == table)
            .flat_map(|(_, rows)| rows.iter().cloned())
            .collect()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn write_batch(&self, table: &str, records: &[RawRecord]) -> Result<usize, SluiceError> {
        if records.is_empty() {
            return Ok(0);
        }
        self.batches
            .lock()
            .await
            .push((table.to_string(), records.to_vec()));
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_are_lowercase_slugs() {
        assert_eq!(table_name_for("FalconX"), "raw_falconx_trades");
        assert_eq!(table_name_for("Talos EU"), "raw_talos_eu_trades");
        assert_eq!(table_name_for("aqua-now"), "raw_aqua_now_trades");
    }

    #[tokio::test]
    async fn memory_sink_skips_empty_batches() {
        let sink = MemorySink::new();
        assert_eq!(sink.write_batch("raw_x_trades", &[]).await.unwrap(), 0);
        assert!(sink.batches().await.is_empty());

        let mut row = RawRecord::new();
        row.insert("id".into(), "1".into());
        assert_eq!(
            sink.write_batch("raw_x_trades", &[row.clone()]).await.unwrap(),
            1
        );
        assert_eq!(sink.rows("raw_x_trades").await, vec![row]);
    }
}
