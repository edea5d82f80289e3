use std::sync::Arc;

use sluice::PartnerAdapter;
use sluice_venues::Env;

/// Partners for the demos.
///
/// With `SLUICE_DEMOS_USE_MOCK` set, returns the fixture partners so demos run
/// offline. Otherwise loads `.env` (if present) and configures the production
/// adapters from the environment; unset credentials show up as per-partner
/// configuration failures in the report.
#[must_use]
pub fn get_partners() -> Vec<Arc<dyn PartnerAdapter>> {
    if std::env::var("SLUICE_DEMOS_USE_MOCK").is_ok() {
        println!("--- (Using mock partners) ---");
        sluice_mock::fixture_partners()
    } else {
        dotenv::dotenv().ok();
        sluice_venues::partners_from_env(&Env::process())
    }
}

/// Install a `fmt` subscriber filtered by `RUST_LOG`; a no-op if one is already set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
