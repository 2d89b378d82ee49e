//! Harvest video search results and print the summary.
//!
//! Run: cargo run --example harvest_videos
//! Requires a Chromium binary (CHROME_PATH / CHROMIUM_PATH, or `chromium` on
//! PATH).

use harvester_service::{HarvestRequest, HarvestService, Site};
use tower::Service;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("info,harvester_service=debug")
        .init();

    let mut service = HarvestService::new();
    let request = HarvestRequest::new(Site::Videos).with_target_count(25);

    match service.call(request).await {
        Ok(report) => {
            println!("\n=== Harvest Report ===");
            println!("Records:     {}", report.record_count);
            println!("Termination: {:?}", report.termination);
            println!("Fallbacks:   {} fields", report.stats.field_fallbacks);
            println!("CSV:         {:?}", report.csv_path);
        }
        Err(e) => {
            eprintln!("Harvest failed: {:?}", e);
            std::process::exit(1);
        }
    }
}
