//! Retail catalog: lazy-loading product grid, one collection run per
//! category.
//!
//! The grid reveals more products on scroll until the page height stops
//! growing. Prices live on the product detail page, so they come in through
//! enrichment; the price fallback is the unavailable sentinel (not zero) so
//! per-category means stay honest.

use tracing::info;

use crate::plan::{
    CollectionPlan, DetailPlan, FieldSpec, FieldValue, GrowthAction, ParserKind,
};
use crate::record::TypedTable;
use crate::stats;

const BASE_URL: &str = "https://lamaretail.com/collections";

/// Category name -> collection URL slug.
pub const CATEGORIES: &[(&str, &str)] = &[
    ("Women", "woman"),
    ("Men", "man"),
    ("Shoes", "shoes"),
    ("Accessories", "accessories"),
];

pub fn plan(category: &str) -> CollectionPlan {
    let slug = CATEGORIES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(category))
        .map(|(_, slug)| *slug)
        .unwrap_or(category);

    CollectionPlan {
        start_url: format!("{}/{}", BASE_URL, slug),
        ready_anchor: Some("div.grid-product__content".to_string()),
        item_locator: "div.grid-product__content a".to_string(),
        identity: FieldSpec::self_attribute("link", "href"),
        fields: vec![
            FieldSpec::constant("category", FieldValue::Text(category.to_string())),
            FieldSpec::constant("discount", FieldValue::Text("No Discount".to_string())),
            FieldSpec::constant("brand", FieldValue::Text("N/A".to_string())),
            FieldSpec::constant("available", FieldValue::Int(1)),
        ],
        growth: GrowthAction::ScrollToBottom,
        detail: Some(DetailPlan {
            ready_anchor: Some("span[data-product-price]".to_string()),
            fields: vec![FieldSpec::text("price", "span[data-product-price] span.money")
                .with_parser(ParserKind::Money)
                .with_fallback(FieldValue::Missing)],
        }),
    }
}

pub fn report(table: &TypedTable) {
    info!("average price per category:");
    for (category, mean) in stats::grouped_mean(table, "category", "price") {
        info!("  {}: {:.2}", category, mean);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_category_maps_to_slug() {
        let plan = plan("Women");
        assert_eq!(plan.start_url, "https://lamaretail.com/collections/woman");
        assert!(plan.detail.is_some());
    }

    #[test]
    fn test_unknown_category_passes_through() {
        let plan = plan("fragrance");
        assert_eq!(
            plan.start_url,
            "https://lamaretail.com/collections/fragrance"
        );
    }
}
