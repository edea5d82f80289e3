//! Report envelopes produced by the aggregation orchestrator.

use serde::{Serialize, Serializer};

use crate::{FailureKind, RawRecord};

/// Message carried by a completed run's response envelope.
pub const COMPLETED_MESSAGE: &str = "Aggregation process completed.";
/// Message carried by a run that could not complete.
pub const FAILED_MESSAGE: &str = "Aggregation process failed.";

/// One entry of the failure manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedPartner {
    /// Partner name as registered.
    pub partner: String,
    /// Human-readable, never empty.
    pub reason: String,
    /// Classification of the failure.
    pub kind: FailureKind,
}

/// Records returned by one successful partner.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerData {
    /// Partner name as registered.
    pub partner: String,
    /// Records in the order the venue returned them.
    pub records: Vec<RawRecord>,
}

/// Success/failure counts of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of partners that succeeded.
    pub successful: usize,
    /// Number of partners that failed.
    pub failed: usize,
}

/// Result of one completed aggregation run.
///
/// Every registered partner appears in exactly one of `successful_partners`
/// and `failed_partners`; both lists and `data` follow registry order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationReport {
    /// Names of partners that succeeded.
    pub successful_partners: Vec<String>,
    /// Failure manifest.
    pub failed_partners: Vec<FailedPartner>,
    /// Records keyed by partner, successful partners only.
    #[serde(serialize_with = "serialize_partner_data")]
    pub data: Vec<PartnerData>,
}

impl AggregationReport {
    /// Success/failure counts.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary {
            successful: self.successful_partners.len(),
            failed: self.failed_partners.len(),
        }
    }

    /// Records of a partner, if it succeeded.
    #[must_use]
    pub fn records_for(&self, partner: &str) -> Option<&[RawRecord]> {
        self.data
            .iter()
            .find(|d| d.partner == partner)
            .map(|d| d.records.as_slice())
    }

    /// Failure entry of a partner, if it failed.
    #[must_use]
    pub fn failure_for(&self, partner: &str) -> Option<&FailedPartner> {
        self.failed_partners.iter().find(|f| f.partner == partner)
    }

    /// Total records across all successful partners.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.data.iter().map(|d| d.records.len()).sum()
    }
}

fn serialize_partner_data<S: Serializer>(data: &[PartnerData], s: S) -> Result<S::Ok, S::Error> {
    s.collect_map(data.iter().map(|d| (&d.partner, &d.records)))
}

/// JSON document returned by the inbound trigger for a completed run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResponse<'a> {
    /// Fixed status message.
    pub message: &'static str,
    /// Success/failure counts.
    pub summary: Summary,
    /// Names of partners that succeeded.
    pub successful_partners: &'a [String],
    /// Failure manifest.
    pub failed_partners: &'a [FailedPartner],
    /// Records keyed by partner.
    #[serde(serialize_with = "serialize_partner_data")]
    pub data: &'a [PartnerData],
}

impl<'a> From<&'a AggregationReport> for AggregationResponse<'a> {
    fn from(report: &'a AggregationReport) -> Self {
        Self {
            message: COMPLETED_MESSAGE,
            summary: report.summary(),
            successful_partners: &report.successful_partners,
            failed_partners: &report.failed_partners,
            data: &report.data,
        }
    }
}
