//! Sluice-specific data transfer objects and configuration primitives shared by
//! the orchestrator, the venue connectors, and the mocks.
#![warn(missing_docs)]

mod auth;
mod config;
mod error;
mod outcome;
mod record;
mod reports;
mod window;

pub use auth::{AuthContext, Secret};
pub use config::AggregatorConfig;
pub use error::{FailureKind, SluiceError, UNKNOWN_ERROR};
pub use outcome::PartnerOutcome;
pub use record::{RawRecord, fields};
pub use reports::{
    AggregationReport, AggregationResponse, FailedPartner, PartnerData, Summary,
    COMPLETED_MESSAGE, FAILED_MESSAGE,
};
pub use window::TimeWindow;
