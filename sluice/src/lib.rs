//! Sluice aggregates executed trades from several liquidity venues at once.
//!
//! Overview
//! - Fans a [`TimeWindow`] out to every registered [`PartnerAdapter`] concurrently.
//! - Waits for every partner to settle; a failing, panicking, or slow partner is
//!   recorded in the failure manifest and never aborts the others.
//! - Builds one [`AggregationReport`] whose lists follow registry order, not
//!   completion order.
//!
//! Key behaviors
//! - Per-partner timeout: a partner exceeding it becomes a transport-class
//!   failure. Default 10s.
//! - Overall deadline: optional; when it elapses the run fails with
//!   `RequestTimeout` and all pending partner calls are dropped.
//! - Fatal errors are reserved for run-level problems: an empty or duplicate
//!   registry, an invalid window, or a report that cannot account for every
//!   partner.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use sluice::{Aggregator, TriggerEvent};
//!
//! let aggregator = Aggregator::builder()
//!     .with_partner(Arc::new(talos))
//!     .with_partner(Arc::new(falconx))
//!     .with_partner(Arc::new(aquanow))
//!     .build()?;
//!
//! let response = sluice::handle(&aggregator, TriggerEvent::default()).await;
//! assert_eq!(response.status_code, 200);
//! ```
//!
//! See `demos/examples/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

mod aggregate;
pub(crate) mod core;
mod handler;
mod persist;

pub use aggregate::build_report;
pub use core::{Aggregator, AggregatorBuilder};
pub use handler::{HandlerResponse, TriggerEvent, handle, handle_json};
pub use persist::{JsonLinesSink, persist_report};

// Re-export core types for convenience
pub use sluice_core::{
    AggregationReport, AggregationResponse, AggregatorConfig, AuthContext, Clock, FailedPartner,
    FailureKind, MemorySink, PartnerAdapter, PartnerData, PartnerOutcome, RawRecord, RecordSink,
    Secret, SluiceError, Summary, TimeWindow, system_clock, table_name_for,
};
