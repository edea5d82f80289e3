use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use sluice_core::{AggregationReport, RawRecord, RecordSink, SluiceError, table_name_for};

/// Write every successful partner's records to its raw table.
///
/// Partners are written in registry order to `raw_<partner>_trades`; partners
/// without records are skipped. Returns the total number of records written.
///
/// # Errors
/// Returns a `Sink` error without writing anything when two partners map to
/// the same table (e.g. `"Talos EU"` and `"Talos-EU"`). Otherwise returns the
/// first `Sink` error; batches already written are kept.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "sluice::persist::persist_report", skip_all)
)]
pub async fn persist_report(
    report: &AggregationReport,
    sink: &dyn RecordSink,
) -> Result<usize, SluiceError> {
    let mut owners: HashMap<String, &str> = HashMap::new();
    let mut batches = Vec::with_capacity(report.data.len());
    for entry in &report.data {
        let table = table_name_for(&entry.partner);
        if let Some(other) = owners.insert(table.clone(), &entry.partner) {
            return Err(SluiceError::sink(
                table,
                format!("partners '{other}' and '{}' share this table", entry.partner),
            ));
        }
        batches.push((table, entry));
    }

    let mut written = 0;
    for (table, entry) in batches {
        if entry.records.is_empty() {
            continue;
        }
        let n = sink.write_batch(&table, &entry.records).await?;
        #[cfg(feature = "tracing")]
        tracing::debug!(table = %table, rows = n, "batch written");
        written += n;
    }
    Ok(written)
}

/// Sink appending one JSON document per line to `<dir>/<table>.jsonl`.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    dir: PathBuf,
}

impl JsonLinesSink {
    /// Sink rooted at `dir`; the directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `table`.
    #[must_use]
    pub fn path_for(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.jsonl"))
    }
}

fn valid_table(table: &str) -> bool {
    !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[async_trait]
impl RecordSink for JsonLinesSink {
    async fn write_batch(&self, table: &str, records: &[RawRecord]) -> Result<usize, SluiceError> {
        if records.is_empty() {
            return Ok(0);
        }
        if !valid_table(table) {
            return Err(SluiceError::sink(table, "invalid table name"));
        }

        let mut buf = Vec::new();
        for record in records {
            serde_json::to_writer(&mut buf, record)
                .map_err(|e| SluiceError::sink(table, e.to_string()))?;
            buf.push(b'\n');
        }

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SluiceError::sink(table, e.to_string()))?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(table))
            .await
            .map_err(|e| SluiceError::sink(table, e.to_string()))?;
        file.write_all(&buf)
            .await
            .map_err(|e| SluiceError::sink(table, e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| SluiceError::sink(table, e.to_string()))?;

        Ok(records.len())
    }
}
