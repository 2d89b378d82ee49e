//! Detail enrichment: visit each record's identity link and pull secondary
//! fields.
//!
//! Navigation failures are non-fatal and per-record: the record keeps its
//! primary fields and every detail field resolves to its fallback. Identity
//! and primary fields are never re-derived or overwritten.

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::HarvestConfig;
use crate::driver::ListDriver;
use crate::extract::extract_page_fields;
use crate::plan::DetailPlan;
use crate::record::{ExtractionStats, TypedTable};

pub struct Enricher<'a, D: ListDriver> {
    driver: &'a D,
    detail: &'a DetailPlan,
    config: &'a HarvestConfig,
}

impl<'a, D: ListDriver> Enricher<'a, D> {
    pub fn new(driver: &'a D, detail: &'a DetailPlan, config: &'a HarvestConfig) -> Self {
        Self {
            driver,
            detail,
            config,
        }
    }

    /// Enrich every record in original discovery order.
    pub async fn enrich(&self, table: &mut TypedTable, stats: &mut ExtractionStats) {
        table.extend_schema(self.detail.fields.iter().map(|f| f.name.clone()).collect());

        let keys = table.keys();
        let total = keys.len();
        for (i, key) in keys.iter().enumerate() {
            info!(record = i + 1, total, %key, "enriching record");

            if let Err(e) = self.driver.navigate(key).await {
                // Broken or stale link: keep the primary fields, fall back
                // every secondary field for this one record.
                warn!(%key, error = %e, "detail navigation failed, using fallbacks");
                stats.navigation_failures += 1;
                table.apply_detail(key, self.fallback_fields());
                continue;
            }

            match &self.detail.ready_anchor {
                Some(anchor) => {
                    if let Err(e) = self.driver.wait_for(anchor, self.config.wait_timeout).await {
                        debug!(%anchor, error = %e, "detail anchor never settled");
                    }
                }
                None => sleep(self.config.nav_settle).await,
            }

            let (values, fallbacks) = extract_page_fields(self.driver, &self.detail.fields).await;
            stats.record_fallbacks(fallbacks);
            table.apply_detail(key, values);
        }
    }

    fn fallback_fields(&self) -> Vec<(String, crate::plan::FieldValue)> {
        self.detail
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.fallback.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::driver::fake::{FakeDriver, FakeItem};
    use crate::plan::{FieldSpec, FieldValue, ParserKind};
    use crate::record::PartialRecord;

    fn detail_plan() -> DetailPlan {
        DetailPlan {
            ready_anchor: Some("div.detail".to_string()),
            fields: vec![
                FieldSpec::text("skills", "div.jcnt a")
                    .joined(", ")
                    .with_fallback(FieldValue::Text("Not Found".into())),
                FieldSpec::text("salary", "div.mrsl")
                    .with_parser(ParserKind::Range)
                    .with_fallback(FieldValue::Missing),
            ],
        }
    }

    fn seeded_table(keys: &[&str]) -> TypedTable {
        let mut table = TypedTable::new(vec!["title".to_string()]);
        for key in keys {
            let mut record = PartialRecord::new(*key);
            record.set("title", FieldValue::Text(format!("job at {}", key)));
            table.insert(record);
        }
        table
    }

    fn config() -> HarvestConfig {
        HarvestConfig::new().with_settle(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_enrich_applies_detail_fields_by_key() {
        let driver = FakeDriver::new("item", vec![], 0)
            .with_detail_page(
                "https://x.test/job/1",
                "div.jcnt a",
                vec![
                    FakeItem::new().with_text("", "Python"),
                    FakeItem::new().with_text("", "SQL"),
                ],
            )
            .with_detail_page(
                "https://x.test/job/1",
                "div.mrsl",
                vec![FakeItem::new().with_text("", "50,000 - 70,000")],
            );

        let mut table = seeded_table(&["https://x.test/job/1"]);
        let mut stats = ExtractionStats::default();
        let plan = detail_plan();
        let config = config();

        Enricher::new(&driver, &plan, &config)
            .enrich(&mut table, &mut stats)
            .await;

        let record = table.get("https://x.test/job/1").unwrap();
        assert_eq!(record.field("skills"), &FieldValue::Text("Python, SQL".into()));
        assert_eq!(record.field("salary"), &FieldValue::Float(60000.0));
        assert_eq!(stats.navigation_failures, 0);
    }

    #[tokio::test]
    async fn test_broken_link_falls_back_and_keeps_primary_fields() {
        let driver = FakeDriver::new("item", vec![], 0)
            .with_broken_url("https://x.test/job/2")
            .with_detail_page(
                "https://x.test/job/1",
                "div.jcnt a",
                vec![FakeItem::new().with_text("", "Rust")],
            );

        let mut table = seeded_table(&["https://x.test/job/1", "https://x.test/job/2"]);
        let mut stats = ExtractionStats::default();
        let plan = detail_plan();
        let config = config();

        Enricher::new(&driver, &plan, &config)
            .enrich(&mut table, &mut stats)
            .await;

        assert_eq!(stats.navigation_failures, 1);

        let ok = table.get("https://x.test/job/1").unwrap();
        assert_eq!(ok.field("skills"), &FieldValue::Text("Rust".into()));

        let broken = table.get("https://x.test/job/2").unwrap();
        assert_eq!(broken.field("skills"), &FieldValue::Text("Not Found".into()));
        assert!(broken.field("salary").is_missing());
        assert_eq!(
            broken.field("title"),
            &FieldValue::Text("job at https://x.test/job/2".to_string())
        );
    }

    #[tokio::test]
    async fn test_schema_gains_detail_columns_once() {
        let driver = FakeDriver::new("item", vec![], 0);
        let mut table = seeded_table(&["https://x.test/job/1"]);
        let mut stats = ExtractionStats::default();
        let plan = detail_plan();
        let config = config();

        Enricher::new(&driver, &plan, &config)
            .enrich(&mut table, &mut stats)
            .await;

        let schema: Vec<&str> = table.schema().collect();
        assert_eq!(schema, vec!["title", "skills", "salary"]);
    }
}
