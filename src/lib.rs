//! Browser-driven listing harvester.
//!
//! Drives a dynamically loading list (infinite scroll or "next" pagination)
//! through an opaque browser driver, deduplicates items by a stable identity
//! key, normalizes free-text fields (prices, durations, view counts, salary
//! ranges) into typed values, optionally enriches each record from its
//! detail page, and computes summary statistics over the final table.
//!
//! # One-shot run via the service
//!
//! ```rust,ignore
//! use harvester_service::{HarvestRequest, HarvestService, Site};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = HarvestService::new();
//!
//!     let request = HarvestRequest::new(Site::Videos)
//!         .with_target_count(25)
//!         .with_headless(true);
//!
//!     let report = service.call(request).await.unwrap();
//!     println!("{} records -> {:?}", report.record_count, report.csv_path);
//! }
//! ```
//!
//! # Manual pipeline with a custom plan
//!
//! ```rust,ignore
//! use harvester_service::{CdpHarvester, HarvestConfig, Harvester, Site};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = HarvestConfig::new().with_target_count(10);
//!     let mut harvester = CdpHarvester::new(Site::Jobs.plan(), config);
//!     let outcome = harvester.execute().await.unwrap();
//!     println!("collected {} records", outcome.table.len());
//! }
//! ```

pub mod cdp;
pub mod collector;
pub mod config;
pub mod driver;
pub mod enrich;
pub mod error;
pub mod export;
pub mod extract;
pub mod harvester;
pub mod parse;
pub mod plan;
pub mod record;
pub mod service;
pub mod sites;
pub mod stats;
pub mod traits;

pub use cdp::CdpDriver;
pub use collector::{Collector, HarvestOutcome, Termination};
pub use config::HarvestConfig;
pub use driver::ListDriver;
pub use error::ScraperError;
pub use harvester::{CdpHarvester, HarvestPipeline};
pub use plan::{CollectionPlan, DetailPlan, FieldSpec, FieldValue, GrowthAction, ParserKind};
pub use record::{ExtractionStats, PartialRecord, TypedTable};
pub use service::{HarvestReport, HarvestRequest, HarvestService};
pub use sites::Site;
pub use traits::Harvester;
