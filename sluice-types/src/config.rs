//! Configuration for the aggregation orchestrator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Global configuration for the `Aggregator` orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// Deadline applied to every individual partner fetch.
    ///
    /// A partner that exceeds it is recorded as a transport failure; the
    /// other partners are unaffected.
    pub partner_timeout: Duration,
    /// Optional deadline for the whole run. When exceeded the run fails and no
    /// report is produced.
    pub request_timeout: Option<Duration>,
    /// Window length used when a trigger does not specify a start.
    pub default_lookback: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            partner_timeout: Duration::from_secs(10),
            request_timeout: None,
            default_lookback: Duration::from_secs(5 * 60),
        }
    }
}
