use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use sluice_core::{
    AquanowSigner, AuthContext, Clock, FieldMap, HttpClient, PartnerAdapter, PartnerOutcome,
    RawRecord, SluiceError, TimeWindow,
};

use crate::env::Env;
use crate::request::{VenueClient, records_from};

const FIELDS: FieldMap = FieldMap {
    id: &["txId", "orderId"],
    symbol: &["symbol"],
    quantity: &["quantity"],
    price: &["price"],
    timestamp: &["createdAt"],
};

/// `createdAt` as epoch milliseconds or an RFC 3339 string.
fn created_at(record: &RawRecord) -> Option<DateTime<Utc>> {
    match record.get("createdAt")? {
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .or_else(|| {
                DateTime::parse_from_rfc3339(s.trim())
                    .ok()
                    .map(|t| t.with_timezone(&Utc))
            }),
        _ => None,
    }
}

/// Aquanow account-transactions adapter.
///
/// Requests `GET /accounts/v1/transaction?startTime=<ms>&limit=1000`. The
/// venue filters by start only, so transactions created at or after the
/// window end are dropped here; records without a readable `createdAt` are
/// kept.
pub struct AquanowAdapter {
    client: VenueClient,
    limit: u32,
}

impl AquanowAdapter {
    /// Default partner name.
    pub const NAME: &'static str = "Aquanow";
    /// Transactions endpoint.
    pub const PATH: &'static str = "/accounts/v1/transaction";
    /// Production base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.aquanow.io";
    /// Default page size.
    pub const DEFAULT_LIMIT: u32 = 1000;

    /// API key variable.
    pub const KEY_VAR: &'static str = "AQUANOW_API_KEY";
    /// API secret variable.
    pub const SECRET_VAR: &'static str = "AQUANOW_API_SECRET";
    /// Optional base URL override variable.
    pub const BASE_URL_VAR: &'static str = "AQUANOW_BASE_URL";

    /// Adapter with explicit credentials.
    #[must_use]
    pub fn new(auth: AuthContext) -> Self {
        Self::with_auth(Ok(auth))
    }

    /// Adapter configured from the environment.
    #[must_use]
    pub fn from_env(env: &Env) -> Self {
        let auth = env.auth_context(
            Self::NAME,
            Self::KEY_VAR,
            Self::SECRET_VAR,
            None,
            env.url_or(Self::BASE_URL_VAR, Some(Self::DEFAULT_BASE_URL)),
        );
        Self::with_auth(auth)
    }

    fn with_auth(auth: Result<AuthContext, SluiceError>) -> Self {
        Self {
            client: VenueClient::new(Self::NAME, auth),
            limit: Self::DEFAULT_LIMIT,
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

    /// Override the page size.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    fn query(&self, window: &TimeWindow) -> String {
        format!(
            "startTime={}&limit={}",
            window.start().timestamp_millis(),
            self.limit
        )
    }

    async fn fetch_transactions(&self, window: &TimeWindow) -> Result<Vec<RawRecord>, SluiceError> {
        let body = self
            .client
            .signed_get(&AquanowSigner, Self::PATH, &self.query(window))
            .await?;
        let mut records = records_from(&self.client.name, body, &FIELDS)?;
        records.retain(|r| created_at(r).is_none_or(|t| t < window.end()));
        Ok(records)
    }
}

#[async_trait]
impl PartnerAdapter for AquanowAdapter {
    fn name(&self) -> &str {
        &self.client.name
    }

    fn vendor(&self) -> &str {
        "Aquanow"
    }

    async fn fetch(&self, window: &TimeWindow) -> PartnerOutcome {
        PartnerOutcome::from_result(&self.client.name, self.fetch_transactions(window).await)
    }
}
