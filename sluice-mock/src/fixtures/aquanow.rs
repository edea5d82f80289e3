use serde_json::json;

use sluice_core::RawRecord;

use super::record;

/// One filled order.
#[must_use]
pub fn orders() -> Vec<RawRecord> {
    vec![record([
        ("orderId", json!("aq_ord_789")),
        ("symbol", json!("ETH/USD")),
        ("quantity", json!(20.1)),
        ("price", json!(3001.05)),
        ("timestamp", json!("2024-03-01T12:04:05.000Z")),
        ("id", json!("aq_ord_789")),
    ])]
}
