use crate::{RawRecord, SluiceError};

/// The settled result of one partner fetch.
///
/// Produced exactly once per partner per run and immutable afterwards. Both
/// venue-reported errors and aborted calls are represented by the same
/// failure shape: an `Err(SluiceError)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerOutcome {
    partner: String,
    result: Result<Vec<RawRecord>, SluiceError>,
}

impl PartnerOutcome {
    /// Successful fetch; an empty `records` vector is still a success.
    pub fn success(partner: impl Into<String>, records: Vec<RawRecord>) -> Self {
        Self {
            partner: partner.into(),
            result: Ok(records),
        }
    }

    /// Failed fetch.
    pub fn failure(partner: impl Into<String>, error: SluiceError) -> Self {
        Self {
            partner: partner.into(),
            result: Err(error),
        }
    }

    /// Convert a fallible fetch into an outcome.
    pub fn from_result(
        partner: impl Into<String>,
        result: Result<Vec<RawRecord>, SluiceError>,
    ) -> Self {
        Self {
            partner: partner.into(),
            result,
        }
    }

    /// Partner name as registered.
    #[must_use]
    pub fn partner(&self) -> &str {
        &self.partner
    }

    /// True for a success outcome.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Records of a success outcome.
    #[must_use]
    pub fn records(&self) -> Option<&[RawRecord]> {
        self.result.as_deref().ok()
    }

    /// Error of a failure outcome.
    #[must_use]
    pub fn error(&self) -> Option<&SluiceError> {
        self.result.as_ref().err()
    }

    /// Consume into `(partner, result)`.
    #[must_use]
    pub fn into_parts(self) -> (String, Result<Vec<RawRecord>, SluiceError>) {
        (self.partner, self.result)
    }
}
