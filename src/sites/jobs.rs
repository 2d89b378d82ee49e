//! Job board search results: server-paginated list with a "next" control.
//!
//! Cards carry title/company/city; skills, job type and salary live on each
//! posting's detail page. Salary is kept twice: the raw text as displayed,
//! and a numeric column parsed as a range mean with the unavailable sentinel
//! for postings that do not disclose it.

use tracing::info;

use crate::plan::{
    CollectionPlan, DetailPlan, FieldSpec, FieldValue, GrowthAction, ParserKind,
};
use crate::record::TypedTable;
use crate::stats;

const SEARCH_URL: &str = "https://www.rozee.pk/search/result?q=Software+Engineer&l=Pakistan";

pub fn plan() -> CollectionPlan {
    CollectionPlan {
        start_url: SEARCH_URL.to_string(),
        ready_anchor: Some("#jobs".to_string()),
        item_locator: "#jobs div.job".to_string(),
        identity: FieldSpec::attribute("job_link", "h3.s-18 a", "href"),
        fields: vec![
            FieldSpec::text("job_title", "h3.s-18 a bdi")
                .with_fallback(FieldValue::Text("Not Found".to_string())),
            FieldSpec::text("company", "bdi.float-left a.display-inline")
                .with_fallback(FieldValue::Text("Not Found".to_string())),
            FieldSpec::text("city", "bdi.float-left a.display-inline:nth-of-type(2)")
                .with_fallback(FieldValue::Text("Not Found".to_string())),
        ],
        growth: GrowthAction::ClickNext("a.next[href='javascript:;']".to_string()),
        detail: Some(DetailPlan {
            ready_anchor: Some("div.jcnt".to_string()),
            fields: vec![
                FieldSpec::text("skills", "div.jcnt.font16 a")
                    .joined(", ")
                    .with_fallback(FieldValue::Text("Not Found".to_string())),
                FieldSpec::text("job_type", "div[class*='col-lg-7'] a.jblk")
                    .joined_unique(" / ", 2)
                    .with_fallback(FieldValue::Text("Not Found".to_string())),
                FieldSpec::text("salary_text", "div.mrsl")
                    .with_fallback(FieldValue::Text("Not Found".to_string())),
                FieldSpec::text("salary", "div.mrsl")
                    .with_parser(ParserKind::Range)
                    .with_fallback(FieldValue::Missing),
            ],
        }),
    }
}

pub fn report(table: &TypedTable) {
    info!("top job titles:");
    for entry in stats::most_common(table, "job_title", None, 5) {
        info!("  {}: {} listings", entry.value, entry.count);
    }

    info!("most in-demand skills:");
    for entry in stats::most_common(table, "skills", Some(", "), 10) {
        info!("  {}: {} times", entry.value, entry.count);
    }

    match stats::filtered_mean(table, stats::contains_ci("city", "Lahore"), "salary") {
        Some(mean) => info!("average salary for jobs in Lahore: {:.0}", mean),
        None => info!("average salary for jobs in Lahore: not available"),
    }
}
