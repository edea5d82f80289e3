use sluice::Aggregator;
use sluice_demos::common::get_partners;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,sluice=trace,sluice_venues=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let mut builder = Aggregator::builder();
    for partner in get_partners() {
        builder = builder.with_partner(partner);
    }
    let aggregator = builder.build()?;

    let report = aggregator.aggregate_recent().await?;
    tracing::info!(
        records = report.record_count(),
        failed = report.failed_partners.len(),
        "aggregation finished"
    );
    Ok(())
}
