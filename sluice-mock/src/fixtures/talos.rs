use serde_json::json;

use sluice_core::RawRecord;

use super::record;

/// Two execution reports with canonical fields already attached.
#[must_use]
pub fn execution_reports() -> Vec<RawRecord> {
    vec![
        record([
            ("ExecID", json!("tal_exec_001")),
            ("OrderID", json!("tal_ord_001")),
            ("Symbol", json!("BTC-USD")),
            ("Side", json!("Buy")),
            ("LastQty", json!("0.25")),
            ("LastPx", json!("64010.50")),
            ("TransactTime", json!("2024-03-01T12:01:12.345000Z")),
            ("id", json!("tal_exec_001")),
            ("symbol", json!("BTC-USD")),
            ("quantity", json!("0.25")),
            ("price", json!("64010.50")),
            ("timestamp", json!("2024-03-01T12:01:12.345000Z")),
        ]),
        record([
            ("ExecID", json!("tal_exec_002")),
            ("OrderID", json!("tal_ord_002")),
            ("Symbol", json!("ETH-USD")),
            ("Side", json!("Sell")),
            ("LastQty", json!("3.0")),
            ("LastPx", json!("3401.25")),
            ("TransactTime", json!("2024-03-01T12:03:40.000000Z")),
            ("id", json!("tal_exec_002")),
            ("symbol", json!("ETH-USD")),
            ("quantity", json!("3.0")),
            ("price", json!("3401.25")),
            ("timestamp", json!("2024-03-01T12:03:40.000000Z")),
        ]),
    ]
}
