//! Incremental, growth-driven collection over a dynamic list.
//!
//! Each pass discovers the currently rendered items, extracts only the ones
//! whose identity key has not been seen before, then either terminates
//! (target reached, pass budget spent, growth stalled, session lost) or
//! triggers the growth action and goes around again. Discovery is decoupled
//! from extraction so a bad item never blocks finding the next one.

use std::collections::HashSet;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::HarvestConfig;
use crate::driver::ListDriver;
use crate::extract::{extract_identity, extract_record};
use crate::plan::{CollectionPlan, GrowthAction};
use crate::record::{ExtractionStats, TypedTable};

/// Why a collection run stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    /// The configured record target was reached.
    TargetReached,
    /// The discovery-pass budget ran out before the target.
    PassBudgetExhausted,
    /// The growth action no longer changes the page extent; the source is
    /// exhausted.
    Stalled,
    /// The browser session became unusable. Records collected before the
    /// failure are preserved.
    SessionFailed(String),
}

/// Final result of one run: the table plus how and after how many passes the
/// run ended, and the silent-failure counters.
#[derive(Debug)]
pub struct HarvestOutcome {
    pub table: TypedTable,
    pub termination: Termination,
    pub passes: usize,
    pub stats: ExtractionStats,
}

pub struct Collector<'a, D: ListDriver> {
    driver: &'a D,
    plan: &'a CollectionPlan,
    config: &'a HarvestConfig,
}

impl<'a, D: ListDriver> Collector<'a, D> {
    pub fn new(driver: &'a D, plan: &'a CollectionPlan, config: &'a HarvestConfig) -> Self {
        Self {
            driver,
            plan,
            config,
        }
    }

    /// Run discovery passes until a termination condition holds. Never
    /// fails: session-level errors end the run with whatever was collected.
    pub async fn collect(&self) -> HarvestOutcome {
        let mut table = TypedTable::new(self.plan.field_names());
        let mut seen: HashSet<String> = HashSet::new();
        let mut stats = ExtractionStats::default();
        let mut passes = 0usize;

        let termination = loop {
            // DISCOVERING: the full current list, stale-handle free.
            let handles = match self.driver.query_all(&self.plan.item_locator).await {
                Ok(handles) => handles,
                Err(e) => {
                    warn!(error = %e, "discovery failed, ending run with partial results");
                    break Termination::SessionFailed(e.to_string());
                }
            };
            debug!(pass = passes + 1, rendered = handles.len(), "discovery pass");

            for handle in &handles {
                if table.len() >= self.config.target_count {
                    break;
                }

                let key = match extract_identity(self.driver, handle, &self.plan.identity).await
                {
                    Some(key) => key,
                    None => {
                        stats.skipped_items += 1;
                        continue;
                    }
                };
                // Seen once attempted, even if extraction is all fallbacks;
                // re-rendered items are never re-processed.
                if !seen.insert(key.clone()) {
                    continue;
                }

                // EXTRACTING
                let (record, fallbacks) = extract_record(
                    self.driver,
                    handle,
                    key,
                    &self.plan.fields,
                    self.config.reveal_wait,
                )
                .await;
                stats.record_fallbacks(fallbacks);
                table.insert(record);
            }

            passes += 1;

            // Termination checks, in order.
            if table.len() >= self.config.target_count {
                break Termination::TargetReached;
            }
            if passes >= self.config.max_passes {
                break Termination::PassBudgetExhausted;
            }
            match self.grow().await {
                Ok(true) => {}
                Ok(false) => break Termination::Stalled,
                Err(e) => {
                    warn!(error = %e, "growth failed, ending run with partial results");
                    break Termination::SessionFailed(e.to_string());
                }
            }
        };

        info!(
            records = table.len(),
            passes,
            ?termination,
            skipped = stats.skipped_items,
            field_fallbacks = stats.field_fallbacks,
            "collection finished"
        );

        HarvestOutcome {
            table,
            termination,
            passes,
            stats,
        }
    }

    /// Trigger the growth action and report whether the page extent changed.
    /// `Ok(false)` means the list stalled: same scroll height after a scroll,
    /// or the "next" control is gone.
    async fn grow(&self) -> Result<bool, crate::error::ScraperError> {
        match &self.plan.growth {
            GrowthAction::ScrollBy(dy) => {
                let before = self.driver.current_extent().await?;
                self.driver.scroll_by(*dy).await?;
                sleep(self.config.settle).await;
                Ok(self.driver.current_extent().await? != before)
            }
            GrowthAction::ScrollToBottom => {
                let before = self.driver.current_extent().await?;
                self.driver.scroll_to_bottom().await?;
                sleep(self.config.settle).await;
                Ok(self.driver.current_extent().await? != before)
            }
            GrowthAction::ClickNext(locator) => {
                let clicked = self.driver.click_next(locator).await?;
                if clicked {
                    sleep(self.config.settle).await;
                }
                Ok(clicked)
            }
        }
    }
}
