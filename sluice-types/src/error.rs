use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason reported when a failure carries no usable message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Unified error type for the sluice workspace.
///
/// Partner-scoped variants (`Configuration`, `Transport`, `Venue`, `Parse`,
/// `PartnerTimeout`, `Rejected`) never escape an aggregation run: they are
/// captured into a failed [`PartnerOutcome`](crate::PartnerOutcome). The
/// remaining variants describe runs that could not complete at all.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SluiceError {
    /// Missing or invalid credentials, detected before any network call.
    #[error("{partner} configuration error: {msg}")]
    Configuration {
        /// Partner whose configuration is unusable.
        partner: String,
        /// Human-readable description of the problem.
        msg: String,
    },

    /// Connection, DNS, or socket-level failure talking to the venue.
    #[error("{partner} transport error: {msg}")]
    Transport {
        /// Partner whose call failed.
        partner: String,
        /// Transport error message.
        msg: String,
    },

    /// The venue answered but reported a business-level error.
    #[error("{partner} venue error{}: {msg}", status_suffix(.status))]
    Venue {
        /// Partner that reported the error.
        partner: String,
        /// HTTP status when the error came from a non-2xx response.
        status: Option<u16>,
        /// Venue-provided error message, verbatim.
        msg: String,
    },

    /// The response body was malformed or had an unexpected shape.
    #[error("{partner} parse error: {msg}")]
    Parse {
        /// Partner whose response could not be parsed.
        partner: String,
        /// Description of the parse failure.
        msg: String,
    },

    /// The partner call exceeded its per-partner deadline.
    #[error("{partner} timed out after {timeout_ms}ms")]
    PartnerTimeout {
        /// Partner that timed out.
        partner: String,
        /// Deadline that was exceeded, in milliseconds.
        timeout_ms: u64,
    },

    /// The partner call aborted without producing an outcome (e.g. it panicked).
    #[error("{partner} rejected: {msg}")]
    Rejected {
        /// Partner whose call aborted.
        partner: String,
        /// Best available description of the abort.
        msg: String,
    },

    /// Invalid input argument or malformed partner registry.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The overall aggregation run exceeded the configured deadline.
    #[error("request timed out: {capability}")]
    RequestTimeout {
        /// Label of the operation that timed out (e.g. "aggregate").
        capability: String,
    },

    /// The persistence sink rejected a batch.
    #[error("sink error for table {table}: {msg}")]
    Sink {
        /// Destination table name.
        table: String,
        /// Sink error message.
        msg: String,
    },

    /// A programming-level fault while building the report.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Classification of a partner failure, as reported in the failure manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum FailureKind {
    /// Missing or invalid credentials.
    Configuration,
    /// Connection, DNS, reset, or deadline exceeded.
    Transport,
    /// The venue reported a business error.
    Venue,
    /// Malformed or unexpected response body.
    Parse,
    /// The call aborted without an outcome.
    Rejected,
    /// Anything that is not a partner-level failure.
    Internal,
}

impl FailureKind {
    /// Stable, lowercase identifier for logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Transport => "transport",
            Self::Venue => "venue",
            Self::Parse => "parse",
            Self::Rejected => "rejected",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl SluiceError {
    /// Helper: build a `Configuration` error for a partner.
    pub fn configuration(partner: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Configuration {
            partner: partner.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Transport` error for a partner.
    pub fn transport(partner: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Transport {
            partner: partner.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `Venue` error for a partner.
    pub fn venue(partner: impl Into<String>, status: Option<u16>, msg: impl Into<String>) -> Self {
        Self::Venue {
            partner: partner.into(),
            status,
            msg: msg.into(),
        }
    }

    /// Helper: build a `Parse` error for a partner.
    pub fn parse(partner: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Parse {
            partner: partner.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `PartnerTimeout` error.
    pub fn partner_timeout(partner: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self::PartnerTimeout {
            partner: partner.into(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Helper: build a `Rejected` error.
    pub fn rejected(partner: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Rejected {
            partner: partner.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    #[must_use]
    pub fn request_timeout(capability: impl Into<String>) -> Self {
        Self::RequestTimeout {
            capability: capability.into(),
        }
    }

    /// Helper: build a `Sink` error.
    pub fn sink(table: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Sink {
            table: table.into(),
            msg: msg.into(),
        }
    }

    /// Re-scope a partner-level error to `partner`; run-level errors are returned unchanged.
    #[must_use]
    pub fn retag(self, partner: &str) -> Self {
        let partner = partner.to_string();
        match self {
            Self::Configuration { msg, .. } => Self::Configuration { partner, msg },
            Self::Transport { msg, .. } => Self::Transport { partner, msg },
            Self::Venue { status, msg, .. } => Self::Venue {
                partner,
                status,
                msg,
            },
            Self::Parse { msg, .. } => Self::Parse { partner, msg },
            Self::PartnerTimeout { timeout_ms, .. } => Self::PartnerTimeout {
                partner,
                timeout_ms,
            },
            Self::Rejected { msg, .. } => Self::Rejected { partner, msg },
            other => other,
        }
    }

    /// Classify this error for the failure manifest.
    ///
    /// Partner timeouts are transport failures: the venue never produced an answer.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Configuration { .. } => FailureKind::Configuration,
            Self::Transport { .. } | Self::PartnerTimeout { .. } => FailureKind::Transport,
            Self::Venue { .. } => FailureKind::Venue,
            Self::Parse { .. } => FailureKind::Parse,
            Self::Rejected { .. } => FailureKind::Rejected,
            _ => FailureKind::Internal,
        }
    }

    /// Partner this error is scoped to, if any.
    #[must_use]
    pub fn partner(&self) -> Option<&str> {
        match self {
            Self::Configuration { partner, .. }
            | Self::Transport { partner, .. }
            | Self::Venue { partner, .. }
            | Self::Parse { partner, .. }
            | Self::PartnerTimeout { partner, .. }
            | Self::Rejected { partner, .. } => Some(partner),
            _ => None,
        }
    }

    /// Human-readable reason without the partner prefix.
    ///
    /// Venue messages are returned verbatim so consumers see the venue's own
    /// wording. Empty messages collapse to [`UNKNOWN_ERROR`].
    #[must_use]
    pub fn reason(&self) -> String {
        let msg = match self {
            Self::Configuration { msg, .. }
            | Self::Transport { msg, .. }
            | Self::Venue { msg, .. }
            | Self::Parse { msg, .. }
            | Self::Rejected { msg, .. } => msg.trim().to_string(),
            Self::PartnerTimeout { timeout_ms, .. } => {
                format!("partner call timed out after {timeout_ms}ms")
            }
            other => other.to_string(),
        };
        if msg.is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            msg
        }
    }

    /// Returns true for errors that end an aggregation run rather than a single partner.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.kind(), FailureKind::Internal)
    }
}
