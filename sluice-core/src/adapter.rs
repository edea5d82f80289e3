use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use sluice_types::{PartnerOutcome, TimeWindow};

/// Source of "now" for signers and default windows.
///
/// Injected so signatures can be reproduced in tests.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The wall clock.
#[must_use]
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// One venue's fetch capability.
///
/// Implementations build the venue request for the window, sign it, perform
/// the call, and normalize the response. `fetch` never fails past its own
/// boundary: configuration, transport, venue, and parse failures are all
/// returned as a failed [`PartnerOutcome`], so the orchestrator needs no
/// venue-specific error handling.
#[async_trait]
pub trait PartnerAdapter: Send + Sync {
    /// Unique, case-sensitive partner name (e.g. `"Talos"`).
    fn name(&self) -> &str;

    /// Human-friendly vendor label; defaults to the partner name.
    fn vendor(&self) -> &str {
        self.name()
    }

    /// Fetch all records executed within `window`.
    async fn fetch(&self, window: &TimeWindow) -> PartnerOutcome;
}
