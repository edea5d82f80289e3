use std::collections::HashMap;
use std::fmt;

use sluice_core::{AuthContext, SluiceError};

/// Environment variable lookup.
///
/// `Env::process()` reads the process environment; `Env::from_pairs` serves
/// a fixed map so tests never mutate global state. Blank values count as
/// unset.
#[derive(Clone, Default)]
pub struct Env {
    vars: Option<HashMap<String, String>>,
}

impl Env {
    /// Read from the process environment.
    #[must_use]
    pub const fn process() -> Self {
        Self { vars: None }
    }

    /// Read from a fixed set of pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: Some(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Trimmed, non-empty value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let raw = match &self.vars {
            Some(map) => map.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    /// Build an [`AuthContext`] for `partner`.
    ///
    /// `base_url` is used as given; when it has no scheme, `https://` is
    /// prepended so bare host names work.
    ///
    /// # Errors
    /// Returns `Configuration` naming every missing variable (never their values).
    pub(crate) fn auth_context(
        &self,
        partner: &str,
        key_var: &str,
        secret_var: &str,
        passphrase_var: Option<&str>,
        base_url: Result<String, &str>,
    ) -> Result<AuthContext, SluiceError> {
        let key = self.get(key_var);
        let secret = self.get(secret_var);
        let passphrase = passphrase_var.map(|v| (v, self.get(v)));

        let mut missing: Vec<&str> = Vec::new();
        if key.is_none() {
            missing.push(key_var);
        }
        if secret.is_none() {
            missing.push(secret_var);
        }
        if let Some((var, None)) = passphrase {
            missing.push(var);
        }
        let base_url = match base_url {
            Ok(url) => Some(url),
            Err(var) => {
                missing.push(var);
                None
            }
        };

        match (key, secret, base_url) {
            (Some(key), Some(secret), Some(base_url)) if missing.is_empty() => {
                let mut auth = AuthContext::new(key, secret, with_scheme(&base_url));
                if let Some((_, Some(p))) = passphrase {
                    auth = auth.with_passphrase(p);
                }
                Ok(auth)
            }
            _ => Err(SluiceError::configuration(
                partner,
                format!(
                    "API credentials for {partner} are not configured (missing {})",
                    missing.join(", ")
                ),
            )),
        }
    }

    /// Value of `var`, or `default` when unset; `Err(var)` when unset without default.
    pub(crate) fn url_or<'a>(&self, var: &'a str, default: Option<&str>) -> Result<String, &'a str> {
        self.get(var)
            .or_else(|| default.map(str::to_string))
            .ok_or(var)
    }
}

fn with_scheme(base: &str) -> String {
    if base.contains("://") {
        base.to_string()
    } else {
        format!("https://{base}")
    }
}

// Values may be secrets; list keys only.
impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.vars {
            None => f.write_str("Env(process)"),
            Some(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                f.debug_tuple("Env").field(&keys).finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::FailureKind;

    #[test]
    fn blank_values_count_as_missing() {
        let env = Env::from_pairs([("A", "  "), ("B", " b ")]);
        assert_eq!(env.get("A"), None);
        assert_eq!(env.get("B").as_deref(), Some("b"));
    }

    #[test]
    fn missing_variables_are_named_but_values_never_leak() {
        let env = Env::from_pairs([("T_KEY", "k"), ("T_HOST", "talos.example.com")]);
        let err = env
            .auth_context(
                "Talos",
                "T_KEY",
                "T_SECRET",
                None,
                env.url_or("T_HOST", None),
            )
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Configuration);
        assert!(err.reason().contains("T_SECRET"));
        assert!(!err.reason().contains("talos.example.com"));
    }

    #[test]
    fn bare_hosts_get_https() {
        let env = Env::from_pairs([("K", "k"), ("S", "s"), ("H", "talos.example.com")]);
        let auth = env
            .auth_context("Talos", "K", "S", None, env.url_or("H", None))
            .unwrap();
        assert_eq!(auth.base_url(), "https://talos.example.com");
    }

    #[test]
    fn debug_lists_keys_only() {
        let env = Env::from_pairs([("SECRET", "hunter2")]);
        let s = format!("{env:?}");
        assert!(s.contains("SECRET"));
        assert!(!s.contains("hunter2"));
    }
}
