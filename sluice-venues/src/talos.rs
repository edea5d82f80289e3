use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use sluice_core::{
    AuthContext, Clock, FieldMap, HttpClient, PartnerAdapter, PartnerOutcome, RawRecord,
    SluiceError, TalosSigner, TimeWindow, millisecond_timestamp,
};

use crate::env::Env;
use crate::request::{VenueClient, records_from, type_name};

const FIELDS: FieldMap = FieldMap {
    id: &["ExecID", "OrderID"],
    symbol: &["Symbol"],
    quantity: &["LastQty", "Quantity"],
    price: &["LastPx", "Price"],
    timestamp: &["TransactTime", "Timestamp"],
};

/// Talos execution-reports adapter.
///
/// Requests `GET /v1/execution-reports?StartDate=..&EndDate=..` and follows
/// the `next` cursor (sent back as `after=`) up to [`TalosAdapter::max_pages`]
/// pages. Every page is signed with a fresh timestamp.
pub struct TalosAdapter {
    client: VenueClient,
    max_pages: usize,
}

impl TalosAdapter {
    /// Default partner name.
    pub const NAME: &'static str = "Talos";
    /// Execution reports endpoint.
    pub const PATH: &'static str = "/v1/execution-reports";
    /// Default page limit.
    pub const DEFAULT_MAX_PAGES: usize = 10;

    /// API key variable.
    pub const KEY_VAR: &'static str = "TALOS_API_KEY";
    /// API secret variable.
    pub const SECRET_VAR: &'static str = "TALOS_API_SECRET";
    /// API host variable; a bare host name is accepted.
    pub const HOST_VAR: &'static str = "TALOS_API_HOST";

    /// Adapter with explicit credentials.
    #[must_use]
    pub fn new(auth: AuthContext) -> Self {
        Self::with_auth(Ok(auth))
    }

    /// Adapter configured from the environment.
    ///
    /// Missing variables do not fail here; every `fetch` reports them as a
    /// configuration failure without touching the network.
    #[must_use]
    pub fn from_env(env: &Env) -> Self {
        let auth = env.auth_context(
            Self::NAME,
            Self::KEY_VAR,
            Self::SECRET_VAR,
            None,
            env.url_or(Self::HOST_VAR, None),
        );
        Self::with_auth(auth)
    }

    fn with_auth(auth: Result<AuthContext, SluiceError>) -> Self {
        Self {
            client: VenueClient::new(Self::NAME, auth),
            max_pages: Self::DEFAULT_MAX_PAGES,
        }
    }

    /// Override the registered name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.client.name = name.into();
        self
    }

    /// Override the HTTP transport.
    #[must_use]
    pub fn with_http(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.client.http = http;
        self
    }

    /// Override the signing clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.client.clock = clock;
        self
    }

    /// Maximum number of pages fetched per window (at least one).
    #[must_use]
    pub fn max_pages(mut self, pages: usize) -> Self {
        self.max_pages = pages.max(1);
        self
    }

    fn query(window: &TimeWindow, cursor: Option<&str>) -> String {
        let mut query = format!(
            "StartDate={}&EndDate={}",
            millisecond_timestamp(window.start()),
            millisecond_timestamp(window.end())
        );
        if let Some(cursor) = cursor {
            let encoded: String = url::form_urlencoded::byte_serialize(cursor.as_bytes()).collect();
            query.push_str("&after=");
            query.push_str(&encoded);
        }
        query
    }

    fn next_cursor(&self, body: &Value) -> Result<Option<String>, SluiceError> {
        match body.get("next") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(SluiceError::parse(
                &self.client.name,
                format!("expected `next` to be a string, got {}", type_name(other)),
            )),
        }
    }

    async fn fetch_all(&self, window: &TimeWindow) -> Result<Vec<RawRecord>, SluiceError> {
        let signer = TalosSigner;
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        for _page in 0..self.max_pages {
            let query = Self::query(window, cursor.as_deref());
            let body = self
                .client
                .signed_get(&signer, Self::PATH, &query)
                .await?;
            cursor = self.next_cursor(&body)?;
            records.extend(records_from(&self.client.name, body, &FIELDS)?);

            #[cfg(feature = "tracing")]
            tracing::debug!(
                partner = %self.client.name,
                page = _page + 1,
                records = records.len(),
                more = cursor.is_some(),
                "talos page fetched"
            );

            if cursor.is_none() {
                return Ok(records);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::warn!(
            partner = %self.client.name,
            max_pages = self.max_pages,
            "page limit reached; remaining pages skipped"
        );
        Ok(records)
    }
}

#[async_trait]
impl PartnerAdapter for TalosAdapter {
    fn name(&self) -> &str {
        &self.client.name
    }

    fn vendor(&self) -> &str {
        "Talos"
    }

    async fn fetch(&self, window: &TimeWindow) -> PartnerOutcome {
        PartnerOutcome::from_result(&self.client.name, self.fetch_all(window).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn query_uses_millisecond_iso_and_encodes_cursor() {
        let w = TimeWindow::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 5, 0).unwrap(),
        )
        .unwrap();
        assert_eq!(
            TalosAdapter::query(&w, None),
            "StartDate=2024-03-01T12:00:00.000Z&EndDate=2024-03-01T12:05:00.000Z"
        );
        assert!(TalosAdapter::query(&w, Some("a b/c")).ends_with("&after=a+b%2Fc"));
    }
}
