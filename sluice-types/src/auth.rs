use core::fmt;

/// Secret material (API secrets, passphrases).
///
/// `Debug` and `Display` are redacted; the only way to read the value is
/// [`Secret::expose`]. Intentionally not `Serialize`.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw secret value. Callers must not log the result.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True when the secret is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Per-partner credentials and endpoint.
///
/// Constructed once at startup from external configuration and read-only
/// afterwards. The `Debug` output never contains the secret or passphrase.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    /// Public API key identifying the account.
    pub key: String,
    /// HMAC secret.
    pub secret: Secret,
    /// Optional passphrase required by some venues.
    pub passphrase: Option<Secret>,
    /// Base URL of the venue API, e.g. `https://api.falconx.io`.
    pub base_url: String,
}

impl AuthContext {
    /// Build a context without a passphrase.
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<Secret>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            passphrase: None,
            base_url: base_url.into(),
        }
    }

    /// Attach a passphrase.
    #[must_use]
    pub fn with_passphrase(mut self, passphrase: impl Into<Secret>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("key", &self.key)
            .field("secret", &self.secret)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_prints_secret_material() {
        let ctx = AuthContext::new("key-1", "super-secret", "https://venue.example/")
            .with_passphrase("pass-phrase");
        let printed = format!("{ctx:?}");
        assert!(!printed.contains("super-secret"));
        assert!(!printed.contains("pass-phrase"));
        assert!(printed.contains("key-1"));
        assert_eq!(ctx.base_url(), "https://venue.example");
    }

    #[test]
    fn blank_secret_is_detected() {
        assert!(Secret::new("  ").is_blank());
        assert!(!Secret::new("x").is_blank());
    }
}
