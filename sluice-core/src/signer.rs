//! Venue request signing.
//!
//! Every signer is a pure function of `(request, timestamp, auth)`: the same
//! inputs always yield the same headers, and the timestamp string placed in
//! the signed payload is the one returned in the timestamp header.
//!
//! | venue   | payload                                              | key             | encoding          |
//! |---------|------------------------------------------------------|-----------------|-------------------|
//! | Talos   | `METHOD\nts\nhost\npath[\nquery][\nbody]`            | raw secret      | URL-safe base64   |
//! | FalconX | `ts + METHOD + path[?query] + body`                  | base64-decoded  | standard base64   |
//! | Aquanow | `nonce + path[?query] + body`                        | raw secret      | lowercase hex     |

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use sluice_types::{AuthContext, SluiceError};

use crate::http::HttpMethod;

/// Fields of a request that take part in a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalRequest<'a> {
    /// Method.
    pub method: HttpMethod,
    /// Path starting with `/`, without the query string.
    pub path: &'a str,
    /// Query string without the leading `?`; empty when absent.
    pub query: &'a str,
    /// Request body; empty when absent.
    pub body: &'a str,
}

impl<'a> CanonicalRequest<'a> {
    /// `GET path?query` without a body.
    #[must_use]
    pub const fn get(path: &'a str, query: &'a str) -> Self {
        Self {
            method: HttpMethod::Get,
            path,
            query,
            body: "",
        }
    }

    /// Path with `?query` appended when a query is present.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.path.to_string()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }
}

/// Authentication headers produced by a [`Signer`].
#[derive(Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    headers: Vec<(&'static str, String)>,
    timestamp: String,
}

impl SignedHeaders {
    fn new(timestamp: String) -> Self {
        Self {
            headers: Vec::new(),
            timestamp,
        }
    }

    fn push(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The exact timestamp (or nonce) string that was signed.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Headers in the order the venue documents them.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.headers.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

// Headers carry the API key and signature; keep them out of debug output.
impl std::fmt::Debug for SignedHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedHeaders")
            .field(
                "headers",
                &self.headers.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            )
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// Per-venue authentication scheme.
pub trait Signer: Send + Sync {
    /// Venue label used on configuration errors.
    fn venue(&self) -> &'static str;

    /// Derive authentication headers for `request` at `timestamp`.
    ///
    /// # Errors
    /// Returns `Configuration` when required credential material is missing
    /// or unusable. No network activity happens before this check.
    fn sign(
        &self,
        request: &CanonicalRequest<'_>,
        timestamp: DateTime<Utc>,
        auth: &AuthContext,
    ) -> Result<SignedHeaders, SluiceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignatureEncoding {
    Base64,
    Base64UrlSafe,
    Hex,
}

impl SignatureEncoding {
    fn encode(self, digest: &[u8]) -> String {
        match self {
            Self::Base64 => STANDARD.encode(digest),
            Self::Base64UrlSafe => URL_SAFE.encode(digest),
            Self::Hex => hex::encode(digest),
        }
    }
}

fn hmac_sha256(venue: &str, key: &[u8], payload: &str) -> Result<Vec<u8>, SluiceError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| SluiceError::configuration(venue, format!("unusable API secret: {e}")))?;
    mac.update(payload.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn require_credentials(venue: &str, auth: &AuthContext) -> Result<(), SluiceError> {
    if auth.key.trim().is_empty() {
        return Err(SluiceError::configuration(
            venue,
            format!("API key for {venue} is not configured"),
        ));
    }
    if auth.secret.is_blank() {
        return Err(SluiceError::configuration(
            venue,
            format!("API secret for {venue} is not configured"),
        ));
    }
    Ok(())
}

/// ISO-8601 UTC with six fractional digits.
///
/// The clock is read at millisecond resolution and extended with `000`, so
/// `12:05:00.123Z` becomes `12:05:00.123000Z`.
#[must_use]
pub fn microsecond_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3f000Z").to_string()
}

/// ISO-8601 UTC with millisecond precision, as used in query strings.
#[must_use]
pub fn millisecond_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Unix seconds with a three-digit millisecond fraction, e.g. `1709294700.123`.
#[must_use]
pub fn unix_seconds_timestamp(ts: DateTime<Utc>) -> String {
    format!("{}.{:03}", ts.timestamp(), ts.timestamp_subsec_millis())
}

/// Host (with explicit port, if any) of the venue base URL.
fn host_of(venue: &str, base_url: &str) -> Result<String, SluiceError> {
    let url = url::Url::parse(base_url).map_err(|e| {
        SluiceError::configuration(venue, format!("invalid base URL '{base_url}': {e}"))
    })?;
    let host = url.host_str().ok_or_else(|| {
        SluiceError::configuration(venue, format!("base URL '{base_url}' has no host"))
    })?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Talos: newline-joined payload, URL-safe base64 HMAC-SHA256, microsecond timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct TalosSigner;

impl TalosSigner {
    /// Header carrying the API key.
    pub const KEY_HEADER: &'static str = "TALOS-KEY";
    /// Header carrying the signed timestamp.
    pub const TS_HEADER: &'static str = "TALOS-TS";
    /// Header carrying the signature.
    pub const SIGN_HEADER: &'static str = "TALOS-SIGN";

    /// Canonical payload; exposed for diagnostics and tests.
    #[must_use]
    pub fn payload(request: &CanonicalRequest<'_>, timestamp: &str, host: &str) -> String {
        let mut parts = vec![request.method.as_str(), timestamp, host, request.path];
        if !request.query.is_empty() {
            parts.push(request.query);
        }
        if !request.body.is_empty() {
            parts.push(request.body);
        }
        parts.join("\n")
    }
}

impl Signer for TalosSigner {
    fn venue(&self) -> &'static str {
        "Talos"
    }

    fn sign(
        &self,
        request: &CanonicalRequest<'_>,
        timestamp: DateTime<Utc>,
        auth: &AuthContext,
    ) -> Result<SignedHeaders, SluiceError> {
        let venue = self.venue();
        require_credentials(venue, auth)?;
        let host = host_of(venue, auth.base_url())?;
        let ts = microsecond_timestamp(timestamp);
        let payload = Self::payload(request, &ts, &host);
        let digest = hmac_sha256(venue, auth.secret.expose().as_bytes(), &payload)?;
        let signature = SignatureEncoding::Base64UrlSafe.encode(&digest);

        Ok(SignedHeaders::new(ts.clone())
            .push(Self::KEY_HEADER, auth.key.clone())
            .push(Self::TS_HEADER, ts)
            .push(Self::SIGN_HEADER, signature))
    }
}

/// FalconX: `ts + METHOD + path + body`, base64 HMAC-SHA256 keyed by the decoded secret.
#[derive(Debug, Clone, Copy, Default)]
pub struct FalconxSigner;

impl FalconxSigner {
    /// Header carrying the API key.
    pub const KEY_HEADER: &'static str = "FX-ACCESS-KEY";
    /// Header carrying the signature.
    pub const SIGN_HEADER: &'static str = "FX-ACCESS-SIGN";
    /// Header carrying the signed timestamp.
    pub const TS_HEADER: &'static str = "FX-ACCESS-TIMESTAMP";
    /// Header carrying the passphrase.
    pub const PASSPHRASE_HEADER: &'static str = "FX-ACCESS-PASSPHRASE";

    /// Prehash string; exposed for diagnostics and tests.
    #[must_use]
    pub fn prehash(request: &CanonicalRequest<'_>, timestamp: &str) -> String {
        format!(
            "{timestamp}{}{}{}",
            request.method.as_str(),
            request.path_and_query(),
            request.body
        )
    }
}

impl Signer for FalconxSigner {
    fn venue(&self) -> &'static str {
        "FalconX"
    }

    fn sign(
        &self,
        request: &CanonicalRequest<'_>,
        timestamp: DateTime<Utc>,
        auth: &AuthContext,
    ) -> Result<SignedHeaders, SluiceError> {
        let venue = self.venue();
        require_credentials(venue, auth)?;
        let passphrase = auth
            .passphrase
            .as_ref()
            .filter(|p| !p.is_blank())
            .ok_or_else(|| {
                SluiceError::configuration(venue, "API passphrase for FalconX is not configured")
            })?;
        let key = STANDARD.decode(auth.secret.expose().trim()).map_err(|e| {
            SluiceError::configuration(venue, format!("API secret is not valid base64: {e}"))
        })?;

        let ts = unix_seconds_timestamp(timestamp);
        let digest = hmac_sha256(venue, &key, &Self::prehash(request, &ts))?;
        let signature = SignatureEncoding::Base64.encode(&digest);

        Ok(SignedHeaders::new(ts.clone())
            .push(Self::KEY_HEADER, auth.key.clone())
            .push(Self::SIGN_HEADER, signature)
            .push(Self::TS_HEADER, ts)
            .push(Self::PASSPHRASE_HEADER, passphrase.expose())
            .push("Content-Type", "application/json"))
    }
}

/// Aquanow: `nonce + path + body`, hex HMAC-SHA256, millisecond nonce.
#[derive(Debug, Clone, Copy, Default)]
pub struct AquanowSigner;

impl AquanowSigner {
    /// Header carrying the API key.
    pub const KEY_HEADER: &'static str = "x-api-key";
    /// Header carrying the signature.
    pub const SIGN_HEADER: &'static str = "x-signature";
    /// Header carrying the signed nonce.
    pub const NONCE_HEADER: &'static str = "x-nonce";

    /// Signed message; exposed for diagnostics and tests.
    #[must_use]
    pub fn message(request: &CanonicalRequest<'_>, nonce: &str) -> String {
        format!("{nonce}{}{}", request.path_and_query(), request.body)
    }
}

impl Signer for AquanowSigner {
    fn venue(&self) -> &'static str {
        "Aquanow"
    }

    fn sign(
        &self,
        request: &CanonicalRequest<'_>,
        timestamp: DateTime<Utc>,
        auth: &AuthContext,
    ) -> Result<SignedHeaders, SluiceError> {
        let venue = self.venue();
        require_credentials(venue, auth)?;
        let nonce = timestamp.timestamp_millis().to_string();
        let digest = hmac_sha256(
            venue,
            auth.secret.expose().as_bytes(),
            &Self::message(request, &nonce),
        )?;
        let signature = SignatureEncoding::Hex.encode(&digest);

        Ok(SignedHeaders::new(nonce.clone())
            .push(Self::KEY_HEADER, auth.key.clone())
            .push(Self::SIGN_HEADER, signature)
            .push(Self::NONCE_HEADER, nonce))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sluice_types::FailureKind;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 5, 0).unwrap() + chrono::Duration::milliseconds(123)
    }

    #[test]
    fn timestamp_formats() {
        assert_eq!(microsecond_timestamp(at()), "2024-03-01T12:05:00.123000Z");
        assert_eq!(millisecond_timestamp(at()), "2024-03-01T12:05:00.123Z");
        assert_eq!(unix_seconds_timestamp(at()), "1709294700.123");
        let whole = Utc.with_ymd_and_hms(2024, 3, 1, 12, 5, 0).unwrap();
        assert_eq!(microsecond_timestamp(whole), "2024-03-01T12:05:00.000000Z");
        assert_eq!(unix_seconds_timestamp(whole), "1709294700.000");
    }

    #[test]
    fn talos_known_answer() {
        let auth = AuthContext::new("talos-key", "talos-secret", "https://talos.example.com");
        let query = "StartDate=2024-03-01T12:00:00.000Z&EndDate=2024-03-01T12:05:00.000Z";
        let req = CanonicalRequest::get("/v1/execution-reports", query);
        let headers = TalosSigner.sign(&req, at(), &auth).unwrap();

        assert_eq!(headers.get("TALOS-KEY"), Some("talos-key"));
        assert_eq!(headers.get("TALOS-TS"), Some("2024-03-01T12:05:00.123000Z"));
        assert_eq!(headers.timestamp(), "2024-03-01T12:05:00.123000Z");
        assert_eq!(
            headers.get("TALOS-SIGN"),
            Some("6MB2pF1D-xYD7a6hmW-Y7bL5FqYlL3aLfY-TX9UDI5A=")
        );
    }

    #[test]
    fn talos_payload_order_and_separator() {
        let req = CanonicalRequest::get("/v1/execution-reports", "a=1");
        assert_eq!(
            TalosSigner::payload(&req, "TS", "host:8443"),
            "GET\nTS\nhost:8443\n/v1/execution-reports\na=1"
        );
        let bare = CanonicalRequest::get("/v1/x", "");
        assert_eq!(TalosSigner::payload(&bare, "TS", "h"), "GET\nTS\nh\n/v1/x");
    }

    #[test]
    fn talos_host_includes_explicit_port() {
        assert_eq!(host_of("Talos", "http://127.0.0.1:5000").unwrap(), "127.0.0.1:5000");
        assert_eq!(host_of("Talos", "https://tal.example.com/").unwrap(), "tal.example.com");
        let err = host_of("Talos", "not a url").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Configuration);
    }

    #[test]
    fn falconx_known_answer() {
        let auth = AuthContext::new("fx-key", "ZmFsY29ueC1zZWNyZXQ=", "https://api.falconx.io")
            .with_passphrase("fx-pass");
        let query = "t_start=2024-03-01T12:00:00.000Z&t_end=2024-03-01T12:05:00.000Z&status=success";
        let req = CanonicalRequest::get("/v1/quotes", query);
        let headers = FalconxSigner.sign(&req, at(), &auth).unwrap();

        assert_eq!(headers.get("FX-ACCESS-TIMESTAMP"), Some("1709294700.123"));
        assert_eq!(headers.get("FX-ACCESS-PASSPHRASE"), Some("fx-pass"));
        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(
            headers.get("FX-ACCESS-SIGN"),
            Some("Ar1yqMB5cCsf33wzpy9yAD4vmX4J+VUdXUSRIic2VZ8=")
        );
    }

    #[test]
    fn falconx_requires_passphrase_and_base64_secret() {
        let req = CanonicalRequest::get("/v1/quotes", "");
        let no_pass = AuthContext::new("fx-key", "ZmFsY29ueC1zZWNyZXQ=", "https://api.falconx.io");
        let err = FalconxSigner.sign(&req, at(), &no_pass).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Configuration);

        let bad_secret =
            AuthContext::new("fx-key", "not*base64", "https://api.falconx.io").with_passphrase("p");
        let err = FalconxSigner.sign(&req, at(), &bad_secret).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Configuration);
        assert!(err.reason().contains("base64"));
    }

    #[test]
    fn aquanow_known_answer() {
        let auth = AuthContext::new("aq-key", "aquanow-secret", "https://api.aquanow.io");
        let req = CanonicalRequest::get(
            "/accounts/v1/transaction",
            "startTime=1709294400000&limit=1000",
        );
        let headers = AquanowSigner.sign(&req, at(), &auth).unwrap();

        assert_eq!(headers.get("x-nonce"), Some("1709294700123"));
        assert_eq!(headers.get("x-api-key"), Some("aq-key"));
        assert_eq!(
            headers.get("x-signature"),
            Some("8ed83d3bf5e9acf025349434f38c458ac507b22dad2082d7694d59d74a3fc9eb")
        );
    }

    #[test]
    fn missing_secret_fails_as_configuration_for_every_venue() {
        let req = CanonicalRequest::get("/v1/x", "");
        let auth = AuthContext::new("key", "", "https://venue.example").with_passphrase("p");
        let signers: [&dyn Signer; 3] = [&TalosSigner, &FalconxSigner, &AquanowSigner];
        for signer in signers {
            let err = signer.sign(&req, at(), &auth).unwrap_err();
            assert_eq!(err.kind(), FailureKind::Configuration, "{}", signer.venue());
            assert_eq!(err.partner(), Some(signer.venue()));
        }
    }

    #[test]
    fn signing_is_deterministic() {
        let auth = AuthContext::new("k", "s", "https://talos.example.com");
        let req = CanonicalRequest::get("/v1/execution-reports", "a=1");
        assert_eq!(
            TalosSigner.sign(&req, at(), &auth).unwrap(),
            TalosSigner.sign(&req, at(), &auth).unwrap()
        );
    }

    #[test]
    fn debug_output_hides_header_values() {
        let auth = AuthContext::new("visible-key", "s", "https://talos.example.com");
        let headers = TalosSigner
            .sign(&CanonicalRequest::get("/v1/x", ""), at(), &auth)
            .unwrap();
        assert!(!format!("{headers:?}").contains("visible-key"));
    }
}
