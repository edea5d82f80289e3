use serde_json::json;

use sluice_core::RawRecord;

use super::record;

/// One completed transfer.
#[must_use]
pub fn transactions() -> Vec<RawRecord> {
    vec![record([
        ("transactionId", json!("fb_txn_123")),
        ("symbol", json!("BTC/USD")),
        ("amount", json!(1.49)),
        ("value", json!(59990.80)),
        ("timestamp", json!("2024-03-01T12:00:30.000Z")),
        ("id", json!("fb_txn_123")),
        ("quantity", json!(1.49)),
    ])]
}
