/// A partner-specific trade or transaction record.
///
/// Records are opaque string-keyed JSON objects. Connectors may add the
/// canonical keys from [`fields`] alongside the venue's own keys.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Canonical keys added to records by normalization.
pub mod fields {
    /// Venue-assigned trade/transaction identifier.
    pub const ID: &str = "id";
    /// Trading pair or instrument symbol.
    pub const SYMBOL: &str = "symbol";
    /// Executed quantity in base units.
    pub const QUANTITY: &str = "quantity";
    /// Execution price.
    pub const PRICE: &str = "price";
    /// Execution or creation time as reported by the venue.
    pub const TIMESTAMP: &str = "timestamp";

    /// All canonical keys, in a stable order.
    pub const ALL: [&str; 5] = [ID, SYMBOL, QUANTITY, PRICE, TIMESTAMP];
}
