use std::collections::HashSet;

use sluice_core::{
    AggregationReport, FailedPartner, PartnerData, PartnerOutcome, SluiceError, TimeWindow,
};

use crate::Aggregator;

/// Build the report for one run from its settled outcomes.
///
/// `registry` is the ordered list of partner names; `outcomes` must contain
/// exactly one outcome per name in the same order. Successful partners feed
/// `successful_partners` and `data`; every other outcome becomes a manifest
/// entry with a non-empty reason.
///
/// # Errors
/// Returns `Internal` when the outcomes do not line up with the registry,
/// which would otherwise drop or duplicate a partner.
pub fn build_report(
    registry: &[String],
    outcomes: Vec<PartnerOutcome>,
) -> Result<AggregationReport, SluiceError> {
    if registry.len() != outcomes.len() {
        return Err(SluiceError::Internal(format!(
            "expected {} partner outcomes, got {}",
            registry.len(),
            outcomes.len()
        )));
    }
    let unique: HashSet<&str> = registry.iter().map(String::as_str).collect();
    if unique.len() != registry.len() {
        return Err(SluiceError::Internal(
            "partner registry contains duplicate names".to_string(),
        ));
    }

    let mut report = AggregationReport::default();
    for (name, outcome) in registry.iter().zip(outcomes) {
        let (partner, result) = outcome.into_parts();
        if &partner != name {
            return Err(SluiceError::Internal(format!(
                "outcome for '{partner}' found where '{name}' was expected"
            )));
        }
        match result {
            Ok(records) => {
                report.successful_partners.push(partner.clone());
                report.data.push(PartnerData { partner, records });
            }
            Err(e) => report.failed_partners.push(FailedPartner {
                reason: e.reason(),
                kind: e.kind(),
                partner,
            }),
        }
    }

    let summary = report.summary();
    if summary.successful + summary.failed != registry.len() {
        return Err(SluiceError::Internal(
            "report does not account for every partner".to_string(),
        ));
    }
    Ok(report)
}

impl Aggregator {
    /// Fetch from every partner concurrently and return the settled outcomes
    /// in registry order.
    ///
    /// All partners are awaited before this returns; a failing or slow partner
    /// never aborts the others.
    ///
    /// # Errors
    /// Returns `RequestTimeout` only when an overall deadline is configured and
    /// elapses. Partner failures are never errors here.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sluice::aggregate::collect_outcomes",
            skip(self),
            fields(partners = self.partners.len(), start = %window.start(), end = %window.end()),
        )
    )]
    pub async fn collect_outcomes(
        &self,
        window: &TimeWindow,
    ) -> Result<Vec<PartnerOutcome>, SluiceError> {
        let timeout = self.cfg.partner_timeout;
        let tasks = self.partners.iter().map(|adapter| {
            Self::partner_call_with_timeout(adapter.name(), adapter.as_ref(), window, timeout)
        });

        if let Some(deadline) = self.cfg.request_timeout {
            tokio::time::timeout(deadline, futures::future::join_all(tasks))
                .await
                .map_err(|_| SluiceError::request_timeout("aggregate"))
        } else {
            Ok(futures::future::join_all(tasks).await)
        }
    }

    /// Run one aggregation over `window` and build the report.
    ///
    /// # Errors
    /// Returns `RequestTimeout` when the overall deadline elapses, or
    /// `Internal` if the report cannot account for every partner.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sluice::aggregate::aggregate", skip(self))
    )]
    pub async fn aggregate(&self, window: &TimeWindow) -> Result<AggregationReport, SluiceError> {
        let outcomes = self.collect_outcomes(window).await?;
        let report = build_report(&self.partner_names(), outcomes)?;

        #[cfg(feature = "tracing")]
        {
            let summary = report.summary();
            tracing::info!(
                successful = summary.successful,
                failed = summary.failed,
                records = report.record_count(),
                "aggregation completed"
            );
        }

        Ok(report)
    }

    /// Run one aggregation over [`Aggregator::default_window`].
    ///
    /// # Errors
    /// See [`Aggregator::aggregate`].
    pub async fn aggregate_recent(&self) -> Result<AggregationReport, SluiceError> {
        let window = self.default_window()?;
        self.aggregate(&window).await
    }
}
