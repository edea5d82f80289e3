use serde_json::json;

use sluice_core::RawRecord;

use super::record;

/// One executed quote in the mapped trade shape.
#[must_use]
pub fn trades() -> Vec<RawRecord> {
    vec![record([
        ("tradeId", json!("fx_quote_001")),
        ("orderId", json!("client_ord_001")),
        ("venue", json!(null)),
        ("subaccount", json!(null)),
        ("baseToken", json!("BTC")),
        ("quoteToken", json!("USD")),
        ("symbol", json!("BTC/USD")),
        ("productType", json!(null)),
        ("tradeTime", json!("2024-03-01T12:02:00.000000+00:00")),
        ("quantityBase", json!(0.5)),
        ("quantityQuote", json!(32005.0)),
        ("price", json!(64010.0)),
        ("side", json!("buy")),
        ("platform", json!("api")),
        ("orderType", json!("market")),
        ("feesGross", json!(3.2)),
        ("feesToken", json!("USD")),
        ("id", json!("fx_quote_001")),
        ("quantity", json!(0.5)),
        ("timestamp", json!("2024-03-01T12:02:00.000000+00:00")),
    ])]
}
