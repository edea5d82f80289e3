use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;

use sluice_core::{
    AggregatorConfig, Clock, PartnerAdapter, PartnerOutcome, SluiceError, TimeWindow,
    UNKNOWN_ERROR, system_clock,
};

/// Orchestrator that fans a time window out to every registered partner.
pub struct Aggregator {
    pub(crate) partners: Vec<Arc<dyn PartnerAdapter>>,
    pub(crate) cfg: AggregatorConfig,
    pub(crate) clock: Clock,
}

/// Builder for constructing an [`Aggregator`].
pub struct AggregatorBuilder {
    partners: Vec<Arc<dyn PartnerAdapter>>,
    cfg: AggregatorConfig,
    clock: Clock,
}

impl Default for AggregatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregatorBuilder {
    /// Create a builder with no partners and the default configuration.
    ///
    /// Defaults: 10s per-partner timeout, no overall deadline, 5 minute lookback
    /// for triggers that omit the window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            partners: vec![],
            cfg: AggregatorConfig::default(),
            clock: system_clock(),
        }
    }

    /// Register a partner.
    ///
    /// Registration order is the order of every list in the report.
    #[must_use]
    pub fn with_partner(mut self, partner: Arc<dyn PartnerAdapter>) -> Self {
        self.partners.push(partner);
        self
    }

    /// Set the per-partner deadline.
    ///
    /// A partner exceeding it is recorded as a transport failure; the other
    /// partners are unaffected.
    #[must_use]
    pub const fn partner_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.partner_timeout = timeout;
        self
    }

    /// Set an overall deadline for a run.
    ///
    /// When exceeded, the run fails with `RequestTimeout` and every pending
    /// partner call is dropped.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Set the lookback used when a trigger omits the window start.
    #[must_use]
    pub const fn default_lookback(mut self, lookback: Duration) -> Self {
        self.cfg.default_lookback = lookback;
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub const fn config(mut self, cfg: AggregatorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Override the clock used for default windows.
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Build the `Aggregator`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no partners are registered, if two partners
    /// share a name, or if a partner name is blank.
    pub fn build(self) -> Result<Aggregator, SluiceError> {
        if self.partners.is_empty() {
            return Err(SluiceError::InvalidArg(
                "no partners registered; add at least one via with_partner(...)".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for p in &self.partners {
            let name = p.name();
            if name.trim().is_empty() {
                return Err(SluiceError::InvalidArg(
                    "partner names must not be blank".to_string(),
                ));
            }
            if !seen.insert(name) {
                return Err(SluiceError::InvalidArg(format!(
                    "duplicate partner '{name}' in registry"
                )));
            }
        }

        Ok(Aggregator {
            partners: self.partners,
            cfg: self.cfg,
            clock: self.clock,
        })
    }
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

impl Aggregator {
    /// Start building a new `Aggregator`.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// let aggregator = sluice::Aggregator::builder()
    ///     .with_partner(Arc::new(talos))
    ///     .with_partner(Arc::new(falconx))
    ///     .partner_timeout(Duration::from_secs(5))
    ///     .build()?;
    /// let report = aggregator.aggregate(&window).await?;
    /// ```
    #[must_use]
    pub fn builder() -> AggregatorBuilder {
        AggregatorBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &AggregatorConfig {
        &self.cfg
    }

    /// Registered partner names in registry order.
    #[must_use]
    pub fn partner_names(&self) -> Vec<String> {
        self.partners.iter().map(|p| p.name().to_string()).collect()
    }

    /// Current time according to the configured clock.
    #[must_use]
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        (self.clock)()
    }

    /// Window of `default_lookback` ending now.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the configured lookback is zero.
    pub fn default_window(&self) -> Result<TimeWindow, SluiceError> {
        TimeWindow::ending_at(self.now(), self.cfg.default_lookback)
    }

    /// Run one partner fetch under the per-partner deadline.
    ///
    /// The outcome is always attributed to `partner`. A fetch that exceeds the
    /// deadline becomes a `PartnerTimeout` failure, and a fetch that panics
    /// becomes a `Rejected` failure carrying the panic message.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sluice::core::partner_call_with_timeout",
            skip(adapter, window),
            fields(
                partner = partner,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn partner_call_with_timeout(
        partner: &str,
        adapter: &dyn PartnerAdapter,
        window: &TimeWindow,
        timeout: Duration,
    ) -> PartnerOutcome {
        // Builds the adapter's future inside the guard too, so a panic before
        // the first poll is caught as well.
        let call = AssertUnwindSafe(async { adapter.fetch(window).await }).catch_unwind();
        let result = match tokio::time::timeout(timeout, call).await {
            Ok(Ok(outcome)) => outcome.into_parts().1.map_err(|e| e.retag(partner)),
            Ok(Err(payload)) => Err(SluiceError::rejected(partner, panic_reason(&*payload))),
            Err(_) => Err(SluiceError::partner_timeout(partner, timeout)),
        };

        #[cfg(feature = "tracing")]
        match &result {
            Ok(records) => tracing::info!(partner, records = records.len(), "partner succeeded"),
            Err(e) => tracing::warn!(partner, kind = %e.kind(), reason = %e.reason(), "partner failed"),
        }

        PartnerOutcome::from_result(partner, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_become_reasons() {
        let s: Box<dyn std::any::Any + Send> = Box::new("Connection Timeout");
        assert_eq!(panic_reason(&*s), "Connection Timeout");
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("boom"));
        assert_eq!(panic_reason(&*owned), "boom");
        let other: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert_eq!(panic_reason(&*other), UNKNOWN_ERROR);
    }
}
