use sluice::{Aggregator, JsonLinesSink, persist_report};
use sluice_demos::common::{get_partners, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut builder = Aggregator::builder();
    for partner in get_partners() {
        builder = builder.with_partner(partner);
    }
    let aggregator = builder.build()?;
    let report = aggregator.aggregate_recent().await?;

    for failed in &report.failed_partners {
        println!("{} failed ({:?}): {}", failed.partner, failed.kind, failed.reason);
    }

    let dir = std::env::temp_dir().join(format!("sluice-demo-{}", std::process::id()));
    let sink = JsonLinesSink::new(&dir);
    let rows = persist_report(&report, &sink).await?;
    println!("wrote {rows} rows under {}", sink.dir().display());

    std::fs::remove_dir_all(&dir).ok();
    Ok(())
}
