//! tower::Service front door for one-shot harvest runs.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::collector::Termination;
use crate::config::HarvestConfig;
use crate::error::ScraperError;
use crate::export;
use crate::harvester::CdpHarvester;
use crate::record::ExtractionStats;
use crate::sites::Site;
use crate::traits::Harvester;

/// One harvest request.
#[derive(Debug, Clone)]
pub struct HarvestRequest {
    pub site: Site,
    pub config: HarvestConfig,
}

impl HarvestRequest {
    pub fn new(site: Site) -> Self {
        Self {
            site,
            config: HarvestConfig::default(),
        }
    }

    pub fn with_config(mut self, config: HarvestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_target_count(mut self, target_count: usize) -> Self {
        self.config.target_count = target_count;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }
}

/// What a run produced and where it was persisted.
#[derive(Debug)]
pub struct HarvestReport {
    pub csv_path: PathBuf,
    pub record_count: usize,
    pub termination: Termination,
    pub stats: ExtractionStats,
}

/// tower::Service wrapper around the full pipeline.
#[derive(Debug, Clone, Default)]
pub struct HarvestService {
    // Room for rate limiting / caching later.
}

impl HarvestService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<HarvestRequest> for HarvestService {
    type Response = HarvestReport;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: HarvestRequest) -> Self::Future {
        info!(site = ?req.site, "harvest request received");

        Box::pin(async move {
            let label = req.site.label();
            let plan = req.site.plan();
            let output_dir = req.config.output_dir.clone();

            let mut harvester = CdpHarvester::new(plan, req.config);
            let outcome = harvester.execute().await?;

            let csv_path = export::timestamped_path(&output_dir, &label, "csv");
            export::write_csv(&outcome.table, &csv_path)?;
            export::dump_json(
                &outcome.table,
                &export::timestamped_path(&output_dir, &label, "json"),
            );

            req.site.report(&outcome.table);

            info!(
                records = outcome.table.len(),
                passes = outcome.passes,
                termination = ?outcome.termination,
                field_fallbacks = outcome.stats.field_fallbacks,
                "harvest complete"
            );

            Ok(HarvestReport {
                csv_path,
                record_count: outcome.table.len(),
                termination: outcome.termination,
                stats: outcome.stats,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = HarvestRequest::new(Site::Jobs)
            .with_target_count(30)
            .with_headless(false);

        assert_eq!(req.site, Site::Jobs);
        assert_eq!(req.config.target_count, 30);
        assert!(!req.config.headless);
    }
}
