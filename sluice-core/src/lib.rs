//! sluice-core
//!
//! Core contracts shared across the sluice ecosystem.
//!
//! - `adapter`: the `PartnerAdapter` trait, the single polymorphism point the
//!   orchestrator depends on.
//! - `signer`: the `Signer` trait and the venue signing schemes.
//! - `http`: the HTTP transport contract and its `reqwest` implementation.
//! - `normalize`: canonical-field mapping and venue error extraction.
//! - `sink`: the persistence-sink contract.
//!
//! Async runtime (Tokio)
//! ---------------------
//! Adapters are driven by the `sluice` orchestrator under a Tokio 1.x runtime;
//! `sink::MemorySink` uses `tokio::sync::Mutex`.
#![warn(missing_docs)]

/// Partner adapter trait and clock injection.
pub mod adapter;
/// HTTP transport contract.
pub mod http;
/// Canonical-field mapping and venue error extraction.
pub mod normalize;
/// Persistence-sink contract and the in-memory sink.
pub mod sink;
/// Request signing.
pub mod signer;

pub use adapter::{Clock, PartnerAdapter, system_clock};
pub use http::{HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use normalize::{
    FieldMap, embedded_venue_error, error_message_of, normalize_record, venue_error_message,
};
pub use signer::{
    AquanowSigner, CanonicalRequest, FalconxSigner, SignedHeaders, Signer, TalosSigner,
    microsecond_timestamp, millisecond_timestamp, unix_seconds_timestamp,
};
pub use sink::{MemorySink, RecordSink, table_name_for};
pub use sluice_types::*;
