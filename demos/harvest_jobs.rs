//! Harvest job board listings with detail enrichment.
//!
//! Run: cargo run --example harvest_jobs

use harvester_service::{HarvestConfig, HarvestRequest, HarvestService, Site};
use tower::Service;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("info,harvester_service=debug")
        .init();

    let config = HarvestConfig::new()
        .with_target_count(30)
        .with_max_passes(10)
        .with_output_dir("./data");

    let mut service = HarvestService::new();
    let request = HarvestRequest::new(Site::Jobs).with_config(config);

    match service.call(request).await {
        Ok(report) => {
            println!("\n=== Harvest Report ===");
            println!("Records:     {}", report.record_count);
            println!("Termination: {:?}", report.termination);
            println!(
                "Fallbacks:   {} fields across {} records, {} navigation failures",
                report.stats.field_fallbacks,
                report.stats.partial_records,
                report.stats.navigation_failures
            );
            println!("CSV:         {:?}", report.csv_path);
        }
        Err(e) => {
            eprintln!("Harvest failed: {:?}", e);
            std::process::exit(1);
        }
    }
}
