use std::sync::Arc;

use serde_json::Value;

use sluice_core::{
    AuthContext, CanonicalRequest, Clock, FieldMap, HttpClient, HttpRequest, HttpResponse,
    RawRecord, ReqwestHttpClient, Signer, SluiceError, embedded_venue_error, normalize_record,
    system_clock, venue_error_message,
};

/// State shared by every venue adapter: identity, credentials, transport, clock.
pub(crate) struct VenueClient {
    pub(crate) name: String,
    pub(crate) auth: Result<AuthContext, SluiceError>,
    pub(crate) http: Arc<dyn HttpClient>,
    pub(crate) clock: Clock,
}

impl VenueClient {
    pub(crate) fn new(name: &str, auth: Result<AuthContext, SluiceError>) -> Self {
        Self {
            name: name.to_string(),
            auth,
            http: Arc::new(ReqwestHttpClient::default()),
            clock: system_clock(),
        }
    }

    /// Credentials, or the configuration error captured at construction.
    pub(crate) fn auth(&self) -> Result<&AuthContext, SluiceError> {
        self.auth.as_ref().map_err(|e| e.clone().retag(&self.name))
    }

    /// Sign and send `GET path?query`, returning the classified JSON body.
    ///
    /// Signing happens before any network activity, so unusable credentials
    /// surface as `Configuration` and never reach the transport.
    pub(crate) async fn signed_get(
        &self,
        signer: &dyn Signer,
        path: &str,
        query: &str,
    ) -> Result<Value, SluiceError> {
        let auth = self.auth()?;
        let canonical = CanonicalRequest::get(path, query);
        let headers = signer
            .sign(&canonical, (self.clock)(), auth)
            .map_err(|e| e.retag(&self.name))?;

        let url = format!("{}{}", auth.base_url(), canonical.path_and_query());
        let request = HttpRequest::get(url).with_headers(headers.iter());

        #[cfg(feature = "tracing")]
        tracing::debug!(partner = %self.name, path, "sending venue request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| SluiceError::transport(&self.name, e.message()))?;
        classify(&self.name, &response)
    }
}

/// Map an HTTP response onto the error taxonomy.
///
/// Non-2xx and 2xx bodies carrying an error are venue errors; bodies that are
/// not JSON are parse errors.
pub(crate) fn classify(partner: &str, response: &HttpResponse) -> Result<Value, SluiceError> {
    if !response.is_success() {
        return Err(SluiceError::venue(
            partner,
            Some(response.status),
            venue_error_message(response.status, &response.body),
        ));
    }
    let body: Value = serde_json::from_str(&response.body)
        .map_err(|e| SluiceError::parse(partner, format!("invalid JSON body: {e}")))?;
    if let Some(msg) = embedded_venue_error(&body) {
        return Err(SluiceError::venue(partner, Some(response.status), msg));
    }
    Ok(body)
}

/// Records from a list body: either a bare array or an object with a `data` array.
///
/// Every element must be a JSON object.
pub(crate) fn records_from(
    partner: &str,
    body: Value,
    fields: &FieldMap,
) -> Result<Vec<RawRecord>, SluiceError> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) => Vec::new(),
            Some(other) => {
                return Err(SluiceError::parse(
                    partner,
                    format!("expected `data` to be an array, got {}", type_name(&other)),
                ));
            }
            None => {
                return Err(SluiceError::parse(
                    partner,
                    "response object has no `data` array",
                ));
            }
        },
        other => {
            return Err(SluiceError::parse(
                partner,
                format!("expected an array of records, got {}", type_name(&other)),
            ));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(record) => Ok(normalize_record(record, fields)),
            other => Err(SluiceError::parse(
                partner,
                format!("record {i} is {}, not an object", type_name(&other)),
            )),
        })
        .collect()
}

pub(crate) const fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
