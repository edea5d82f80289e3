//! sluice-venues
//!
//! Production partner adapters for the sluice aggregation engine.
//!
//! | adapter | endpoint | auth |
//! |---|---|---|
//! | [`TalosAdapter`] | `GET /v1/execution-reports` | `TALOS-KEY` / `TALOS-TS` / `TALOS-SIGN` |
//! | [`FalconxAdapter`] | `GET /v1/quotes` | `FX-ACCESS-*` |
//! | [`AquanowAdapter`] | `GET /accounts/v1/transaction` | `x-api-key` / `x-signature` / `x-nonce` |
//!
//! Every adapter captures its credentials at construction. When they are
//! missing, `fetch` reports a configuration failure without any network
//! call. Transport, HTTP status, and body problems are classified into the
//! shared error taxonomy and returned as failed outcomes.
//!
//! Credentials are read through [`Env`], so tests can supply a fixed map:
//!
//! ```rust,ignore
//! let env = sluice_venues::Env::from_pairs([
//!     ("TALOS_API_KEY", "key"),
//!     ("TALOS_API_SECRET", "secret"),
//!     ("TALOS_API_HOST", "tal-sandbox.example.com"),
//! ]);
//! let talos = sluice_venues::TalosAdapter::from_env(&env);
//! ```
#![warn(missing_docs)]

use std::sync::Arc;

use sluice_core::PartnerAdapter;

mod aquanow;
mod env;
mod falconx;
mod request;
mod talos;

pub use aquanow::AquanowAdapter;
pub use env::Env;
pub use falconx::FalconxAdapter;
pub use talos::TalosAdapter;

/// The three production adapters configured from `env`, in registry order
/// Talos, FalconX, Aquanow.
#[must_use]
pub fn partners_from_env(env: &Env) -> Vec<Arc<dyn PartnerAdapter>> {
    vec![
        Arc::new(TalosAdapter::from_env(env)) as Arc<dyn PartnerAdapter>,
        Arc::new(FalconxAdapter::from_env(env)),
        Arc::new(AquanowAdapter::from_env(env)),
    ]
}
