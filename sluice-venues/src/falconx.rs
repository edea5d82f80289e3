use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use sluice_core::{
    AuthContext, Clock, FalconxSigner, FieldMap, HttpClient, PartnerAdapter, PartnerOutcome,
    RawRecord, SluiceError, TimeWindow, millisecond_timestamp, normalize_record,
};

use crate::env::Env;
use crate::request::{VenueClient, type_name};

const FIELDS: FieldMap = FieldMap {
    id: &["tradeId"],
    symbol: &["symbol"],
    quantity: &["quantityBase"],
    price: &["price"],
    timestamp: &["tradeTime"],
};

#[derive(Debug, Deserialize)]
struct TokenPair {
    base_token: String,
    quote_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct Amount {
    #[serde(default)]
    value: Value,
}

/// One executed quote from `GET /v1/quotes`.
#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    fx_quote_id: Value,
    #[serde(default)]
    client_order_id: Value,
    token_pair: TokenPair,
    #[serde(default)]
    side_executed: Option<String>,
    #[serde(default)]
    buy_price: Value,
    #[serde(default)]
    sell_price: Value,
    #[serde(default)]
    position_in: Option<Amount>,
    #[serde(default)]
    position_out: Option<Amount>,
    #[serde(default)]
    quantity_requested: Option<Amount>,
    #[serde(default)]
    t_execute: Value,
    #[serde(default)]
    platform: Value,
    #[serde(default)]
    order_type: Value,
    #[serde(default)]
    gross_fee_usd: Value,
}

/// Numbers arrive either as JSON numbers or decimal strings.
fn number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn amount(a: Option<&Amount>) -> Option<f64> {
    a.and_then(|a| number(&a.value))
}

impl Quote {
    /// Flatten into the trade shape; price and quote quantity follow the executed side.
    fn into_trade(self) -> RawRecord {
        let sell = self
            .side_executed
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("sell"));
        let (price, quantity_quote) = if sell {
            (number(&self.sell_price), amount(self.position_in.as_ref()))
        } else {
            (number(&self.buy_price), amount(self.position_out.as_ref()))
        };
        let base = self.token_pair.base_token;
        let quote = self.token_pair.quote_token;

        let fields: [(&str, Value); 17] = [
            ("tradeId", self.fx_quote_id),
            ("orderId", self.client_order_id),
            ("venue", Value::Null),
            ("subaccount", Value::Null),
            ("symbol", Value::from(format!("{base}/{quote}"))),
            ("baseToken", Value::from(base)),
            ("quoteToken", Value::from(quote.clone())),
            ("productType", Value::Null),
            ("tradeTime", self.t_execute),
            ("quantityBase", Value::from(amount(self.quantity_requested.as_ref()))),
            ("quantityQuote", Value::from(quantity_quote)),
            ("price", Value::from(price)),
            ("side", Value::from(self.side_executed)),
            ("platform", self.platform),
            ("orderType", self.order_type),
            ("feesGross", self.gross_fee_usd),
            ("feesToken", Value::from(quote)),
        ];
        let trade: RawRecord = fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        normalize_record(trade, &FIELDS)
    }
}

/// FalconX executed-quotes adapter.
///
/// Requests `GET /v1/quotes?t_start=..&t_end=..&status=success` and maps
/// each executed quote to a flat trade record.
pub struct FalconxAdapter {
    client: VenueClient,
}

impl FalconxAdapter {
    /// Default partner name.
    pub const NAME: &'static str = "FalconX";
    /// Quotes endpoint.
    pub const PATH: &'static str = "/v1/quotes";
    /// Production base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.falconx.io";

    /// API key variable.
    pub const KEY_VAR: &'static str = "FALCONX_API_KEY";
    /// Base64 API secret variable.
    pub const SECRET_VAR: &'static str = "FALCONX_API_SECRET";
    /// Passphrase variable.
    pub const PASSPHRASE_VAR: &'static str = "FALCONX_API_PASSPHRASE";
    /// Optional base URL override variable.
    pub const BASE_URL_VAR: &'static str = "FALCONX_BASE_URL";

    /// Adapter with explicit credentials; a passphrase is required to sign.
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
            Some(Self::PASSPHRASE_VAR),
            env.url_or(Self::BASE_URL_VAR, Some(Self::DEFAULT_BASE_URL)),
        );
        Self::with_auth(auth)
    }

    fn with_auth(auth: Result<AuthContext, SluiceError>) -> Self {
        Self {
            client: VenueClient::new(Self::NAME, auth),
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

    fn query(window: &TimeWindow) -> String {
        format!(
            "t_start={}&t_end={}&status=success",
            millisecond_timestamp(window.start()),
            millisecond_timestamp(window.end())
        )
    }

    async fn fetch_trades(&self, window: &TimeWindow) -> Result<Vec<RawRecord>, SluiceError> {
        let partner = &self.client.name;
        let body = self
            .client
            .signed_get(&FalconxSigner, Self::PATH, &Self::query(window))
            .await?;
        let Value::Array(items) = body else {
            return Err(SluiceError::parse(
                partner,
                format!("expected an array of quotes, got {}", type_name(&body)),
            ));
        };

        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                serde_json::from_value::<Quote>(item)
                    .map(Quote::into_trade)
                    .map_err(|e| SluiceError::parse(partner, format!("quote {i}: {e}")))
            })
            .collect()
    }
}

#[async_trait]
impl PartnerAdapter for FalconxAdapter {
    fn name(&self) -> &str {
        &self.client.name
    }

    fn vendor(&self) -> &str {
        "FalconX"
    }

    async fn fetch(&self, window: &TimeWindow) -> PartnerOutcome {
        PartnerOutcome::from_result(&self.client.name, self.fetch_trades(window).await)
    }
}
