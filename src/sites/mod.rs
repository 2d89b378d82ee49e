//! Per-site extraction plans.
//!
//! Each target site is a tagged variant mapping to a declarative
//! `CollectionPlan`; the collector and extractor never branch on the site.

pub mod jobs;
pub mod retail;
pub mod videos;

use tracing::info;

use crate::plan::CollectionPlan;
use crate::record::TypedTable;

/// A supported target site.
#[derive(Debug, Clone, PartialEq)]
pub enum Site {
    /// One retail catalog category (lazy-loading product grid).
    Retail { category: String },
    /// Job board search results (server-side "next" pagination).
    Jobs,
    /// Video platform search results (infinite scroll).
    Videos,
}

impl Site {
    pub fn plan(&self) -> CollectionPlan {
        match self {
            Site::Retail { category } => retail::plan(category),
            Site::Jobs => jobs::plan(),
            Site::Videos => videos::plan(),
        }
    }

    /// Short label used in output filenames.
    pub fn label(&self) -> String {
        match self {
            Site::Retail { category } => format!("products_{}", category.to_lowercase()),
            Site::Jobs => "jobs".to_string(),
            Site::Videos => "videos".to_string(),
        }
    }

    /// Log the site's summary statistics for the operator.
    pub fn report(&self, table: &TypedTable) {
        if table.is_empty() {
            info!("no records collected, nothing to summarize");
            return;
        }
        match self {
            Site::Retail { .. } => retail::report(table),
            Site::Jobs => jobs::report(table),
            Site::Videos => videos::report(table),
        }
    }
}
