use std::time::Duration;

use sluice::{Aggregator, TriggerEvent, handle};
use sluice_demos::common::{get_partners, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut builder = Aggregator::builder()
        .partner_timeout(Duration::from_secs(10))
        .request_timeout(Duration::from_secs(30));
    for partner in get_partners() {
        builder = builder.with_partner(partner);
    }
    let aggregator = builder.build()?;

    // Last five minutes, the same window a scheduled trigger would use.
    let response = handle(&aggregator, TriggerEvent::default()).await;
    println!("status: {}", response.status_code);
    println!("{}", response.body);

    if response.status_code != 200 {
        return Err(format!("aggregation failed with status {}", response.status_code).into());
    }
    Ok(())
}
