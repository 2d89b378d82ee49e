use async_trait::async_trait;

use crate::collector::HarvestOutcome;
use crate::error::ScraperError;

#[async_trait]
pub trait Harvester: Send {
    /// Acquire the browser session.
    async fn initialize(&mut self) -> Result<(), ScraperError>;

    /// Run the full collection pipeline (navigate, collect, enrich).
    async fn run(&mut self) -> Result<HarvestOutcome, ScraperError>;

    /// Release the browser session.
    async fn close(&mut self) -> Result<(), ScraperError>;

    /// One-shot execution (initialize -> run -> close). The session is
    /// released on every path, including a failed run.
    async fn execute(&mut self) -> Result<HarvestOutcome, ScraperError> {
        self.initialize().await?;
        let run_result = self.run().await;
        let close_result = self.close().await;
        let outcome = run_result?;
        close_result?;
        Ok(outcome)
    }
}
