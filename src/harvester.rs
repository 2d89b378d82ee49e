//! The end-to-end pipeline and its chromiumoxide-backed harvester.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::cdp::CdpDriver;
use crate::collector::{Collector, HarvestOutcome, Termination};
use crate::config::HarvestConfig;
use crate::driver::ListDriver;
use crate::enrich::Enricher;
use crate::error::ScraperError;
use crate::plan::CollectionPlan;
use crate::record::{ExtractionStats, TypedTable};
use crate::traits::Harvester;

/// Navigate, collect, enrich, and release the driver.
///
/// The pipeline never loses work: every exit path returns an outcome
/// carrying whatever was collected, and the driver is closed exactly once.
pub struct HarvestPipeline<D: ListDriver> {
    driver: D,
    plan: CollectionPlan,
    config: HarvestConfig,
}

impl<D: ListDriver> HarvestPipeline<D> {
    pub fn new(driver: D, plan: CollectionPlan, config: HarvestConfig) -> Self {
        Self {
            driver,
            plan,
            config,
        }
    }

    pub async fn run(mut self) -> HarvestOutcome {
        let outcome = self.run_inner().await;
        if let Err(e) = self.driver.close().await {
            debug!(error = %e, "driver close reported an error");
        }
        outcome
    }

    async fn run_inner(&mut self) -> HarvestOutcome {
        info!(url = %self.plan.start_url, "starting harvest");

        if let Err(e) = self.driver.navigate(&self.plan.start_url).await {
            warn!(error = %e, "initial navigation failed");
            return HarvestOutcome {
                table: TypedTable::new(self.plan.field_names()),
                termination: Termination::SessionFailed(e.to_string()),
                passes: 0,
                stats: ExtractionStats::default(),
            };
        }
        match &self.plan.ready_anchor {
            Some(anchor) => {
                if let Err(e) = self.driver.wait_for(anchor, self.config.wait_timeout).await {
                    warn!(%anchor, error = %e, "list anchor never settled, collecting anyway");
                }
            }
            None => sleep(self.config.nav_settle).await,
        }

        let mut outcome = Collector::new(&self.driver, &self.plan, &self.config)
            .collect()
            .await;

        if let Some(detail) = &self.plan.detail {
            if matches!(outcome.termination, Termination::SessionFailed(_)) {
                warn!("session lost during collection, skipping enrichment");
            } else if outcome.table.is_empty() {
                info!("nothing collected, skipping enrichment");
            } else {
                Enricher::new(&self.driver, detail, &self.config)
                    .enrich(&mut outcome.table, &mut outcome.stats)
                    .await;
            }
        }

        outcome
    }
}

/// Harvester owning a real browser session.
pub struct CdpHarvester {
    plan: CollectionPlan,
    config: HarvestConfig,
    browser: Option<Browser>,
    driver: Option<CdpDriver>,
}

impl CdpHarvester {
    pub fn new(plan: CollectionPlan, config: HarvestConfig) -> Self {
        Self {
            plan,
            config,
            browser: None,
            driver: None,
        }
    }
}

#[async_trait]
impl Harvester for CdpHarvester {
    async fn initialize(&mut self) -> Result<(), ScraperError> {
        info!("initializing browser...");

        // Unique user-data dir so concurrent runs never share a profile.
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir = std::env::temp_dir().join(format!("harvester-{}", unique_id));

        let chrome_path = std::env::var("CHROME_PATH")
            .or_else(|_| std::env::var("CHROMIUM_PATH"))
            .unwrap_or_else(|_| "chromium".to_string());

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .user_data_dir(&user_data_dir);

        if !self.config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .no_sandbox()
            .window_size(1280, 800)
            .request_timeout(Duration::from_secs(60))
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu");

        if self.config.debug {
            builder = builder.arg("--enable-logging=stderr").arg("--v=1");
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        self.browser = Some(browser);
        self.driver = Some(CdpDriver::new(page, self.config.debug));

        info!("browser initialized");
        Ok(())
    }

    async fn run(&mut self) -> Result<HarvestOutcome, ScraperError> {
        let driver = self
            .driver
            .take()
            .ok_or_else(|| ScraperError::BrowserInit("browser not initialized".into()))?;

        let outcome = HarvestPipeline::new(driver, self.plan.clone(), self.config.clone())
            .run()
            .await;
        Ok(outcome)
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        info!("closing browser...");
        if let Some(mut driver) = self.driver.take() {
            let _ = driver.close().await;
        }
        self.browser = None;
        info!("browser closed");
        Ok(())
    }
}
