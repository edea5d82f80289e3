//! Inbound trigger: turns an optional window into a JSON response document.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use sluice_core::{AggregationResponse, FAILED_MESSAGE, SluiceError, TimeWindow};

use crate::Aggregator;

/// Trigger payload. Both bounds are optional.
///
/// A missing `end` means "now"; a missing `start` means `end` minus the
/// aggregator's default lookback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEvent {
    /// Inclusive window start.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// Exclusive window end.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl TriggerEvent {
    /// Explicit window.
    #[must_use]
    pub const fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Resolve the window against `now` and `lookback`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when the resolved window is empty or inverted.
    pub fn window(
        &self,
        now: DateTime<Utc>,
        lookback: std::time::Duration,
    ) -> Result<TimeWindow, SluiceError> {
        let end = self.end.unwrap_or(now);
        match self.start {
            Some(start) => TimeWindow::new(start, end),
            None => TimeWindow::ending_at(end, lookback),
        }
    }
}

/// Status, headers, and body returned to the trigger's caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    /// HTTP-style status code.
    pub status_code: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// JSON body.
    pub body: String,
}

impl HandlerResponse {
    fn json(status_code: u16, body: String) -> Self {
        Self {
            status_code,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body,
        }
    }

    fn failed(error: &SluiceError) -> Self {
        let status = match error {
            SluiceError::InvalidArg(_) => 400,
            _ => 500,
        };
        let body = json!({ "message": FAILED_MESSAGE, "error": error.to_string() });
        Self::json(status, format!("{body:#}"))
    }

    /// Parse the body as JSON.
    ///
    /// # Errors
    /// Returns the `serde_json` error if the body is not valid JSON.
    pub fn body_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Run one aggregation for `event`.
///
/// A completed run always answers 200, however many partners failed. An
/// invalid window answers 400 and any other run-level failure answers 500.
pub async fn handle(aggregator: &Aggregator, event: TriggerEvent) -> HandlerResponse {
    let window = match event.window(aggregator.now(), aggregator.config().default_lookback) {
        Ok(w) => w,
        Err(e) => return HandlerResponse::failed(&e),
    };

    let report = match aggregator.aggregate(&window).await {
        Ok(r) => r,
        Err(e) => {
            #[cfg(feature = "tracing")]
            tracing::error!(error = %e, "aggregation process failed");
            return HandlerResponse::failed(&e);
        }
    };

    match serde_json::to_string_pretty(&AggregationResponse::from(&report)) {
        Ok(body) => HandlerResponse::json(200, body),
        Err(e) => HandlerResponse::failed(&SluiceError::Internal(format!(
            "failed to serialize report: {e}"
        ))),
    }
}

/// Like [`handle`], but takes the raw event body.
///
/// An empty body is treated as an event without bounds; malformed JSON
/// answers 400.
pub async fn handle_json(aggregator: &Aggregator, body: &str) -> HandlerResponse {
    let event = if body.trim().is_empty() {
        TriggerEvent::default()
    } else {
        match serde_json::from_str::<TriggerEvent>(body) {
            Ok(ev) => ev,
            Err(e) => {
                return HandlerResponse::failed(&SluiceError::InvalidArg(format!(
                    "invalid trigger event: {e}"
                )));
            }
        }
    };
    handle(aggregator, event).await
}
