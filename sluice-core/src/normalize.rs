use serde_json::Value;

use sluice_types::{RawRecord, fields};

/// Venue keys that feed each canonical field, in priority order.
///
/// The first key present with a non-null value wins. Canonical keys are only
/// added when the record does not already carry them, so venue data is never
/// overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    /// Candidates for [`fields::ID`].
    pub id: &'static [&'static str],
    /// Candidates for [`fields::SYMBOL`].
    pub symbol: &'static [&'static str],
    /// Candidates for [`fields::QUANTITY`].
    pub quantity: &'static [&'static str],
    /// Candidates for [`fields::PRICE`].
    pub price: &'static [&'static str],
    /// Candidates for [`fields::TIMESTAMP`].
    pub timestamp: &'static [&'static str],
}

impl FieldMap {
    /// A map that adds nothing.
    pub const EMPTY: Self = Self {
        id: &[],
        symbol: &[],
        quantity: &[],
        price: &[],
        timestamp: &[],
    };

    fn candidates(&self) -> [(&'static str, &'static [&'static str]); 5] {
        [
            (fields::ID, self.id),
            (fields::SYMBOL, self.symbol),
            (fields::QUANTITY, self.quantity),
            (fields::PRICE, self.price),
            (fields::TIMESTAMP, self.timestamp),
        ]
    }
}

/// Add canonical fields to `record` according to `map`.
#[must_use]
pub fn normalize_record(mut record: RawRecord, map: &FieldMap) -> RawRecord {
    for (canonical, keys) in map.candidates() {
        if record.contains_key(canonical) {
            continue;
        }
        let found = keys
            .iter()
            .filter_map(|k| record.get(*k))
            .find(|v| !v.is_null())
            .cloned();
        if let Some(value) = found {
            record.insert(canonical.to_string(), value);
        }
    }
    record
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Message from a JSON error payload, if the venue provided one.
///
/// Looks at `error` (string), `error.msg`, `error.message`, `message`, and
/// `msg`, in that order.
#[must_use]
pub fn error_message_of(body: &Value) -> Option<String> {
    let error = body.get("error");
    non_empty(error)
        .or_else(|| error.and_then(|e| non_empty(e.get("msg"))))
        .or_else(|| error.and_then(|e| non_empty(e.get("message"))))
        .or_else(|| non_empty(body.get("message")))
        .or_else(|| non_empty(body.get("msg")))
}

/// Best available reason for a non-2xx response.
///
/// Prefers the venue's own message over a generic status line, so a 401
/// carrying `{"error":"Invalid API Key"}` reports `Invalid API Key`.
#[must_use]
pub fn venue_error_message(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body)
        && let Some(msg) = error_message_of(&json)
    {
        return msg;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.to_string()
    }
}

/// Error reported inside a 2xx body, if any.
///
/// A body counts as an error report when its `error` field is `true`, an
/// object, or a non-blank string, or when its `status` is `"error"` or
/// `"failure"`. `"error": false`, `""` and `null` mark a healthy body.
#[must_use]
pub fn embedded_venue_error(body: &Value) -> Option<String> {
    let Value::Object(obj) = body else {
        return None;
    };
    let has_error = match obj.get("error") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Object(_)) => true,
        _ => false,
    };
    let failed_status = obj
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| s.eq_ignore_ascii_case("error") || s.eq_ignore_ascii_case("failure"));
    if !(has_error || failed_status) {
        return None;
    }
    Some(error_message_of(body).unwrap_or_else(|| sluice_types::UNKNOWN_ERROR.to_string()))
}
