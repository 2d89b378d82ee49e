//! Video platform search results: infinite scroll.
//!
//! The duration badge is an overlay that only renders once the thumbnail has
//! been scrolled into view and hovered, so that field carries the reveal
//! flag. Duration is stored both as displayed and as parsed whole seconds.

use tracing::info;

use crate::parse::format_duration;
use crate::plan::{CollectionPlan, FieldSpec, FieldValue, GrowthAction, ParserKind};
use crate::record::TypedTable;
use crate::stats;

const SEARCH_URL: &str =
    "https://www.youtube.com/results?search_query=Deepseek&sp=EgIIBQ%253D%253D";

const DURATION_BADGE: &str = "ytd-thumbnail span.ytd-thumbnail-overlay-time-status-renderer";

pub fn plan() -> CollectionPlan {
    CollectionPlan {
        start_url: SEARCH_URL.to_string(),
        ready_anchor: Some("ytd-video-renderer".to_string()),
        item_locator: "ytd-video-renderer".to_string(),
        identity: FieldSpec::attribute("video_url", "#video-title", "href"),
        fields: vec![
            FieldSpec::attribute("title", "#video-title", "title")
                .with_fallback(FieldValue::Text("Unknown".to_string())),
            FieldSpec::text("channel", "ytd-channel-name")
                .with_fallback(FieldValue::Text("Unknown".to_string())),
            FieldSpec::text("views", "#metadata-line span:nth-of-type(1)")
                .with_parser(ParserKind::Count)
                .with_fallback(FieldValue::Int(0)),
            FieldSpec::text("upload_date", "#metadata-line span:nth-of-type(2)")
                .with_fallback(FieldValue::Text("Unknown".to_string())),
            FieldSpec::text("duration_str", DURATION_BADGE)
                .with_fallback(FieldValue::Text("0:00".to_string()))
                .with_reveal(),
            FieldSpec::text("duration", DURATION_BADGE)
                .with_parser(ParserKind::Duration)
                .with_fallback(FieldValue::Int(0))
                .with_reveal(),
        ],
        growth: GrowthAction::ScrollBy(1000),
        detail: None,
    }
}

pub fn report(table: &TypedTable) {
    if let Some(most_viewed) = stats::top_by(table, "views", 1).first() {
        info!(
            "most viewed video: {} by {} ({} views, {})",
            most_viewed.field("title").to_cell(),
            most_viewed.field("channel").to_cell(),
            most_viewed.field("views").to_cell(),
            most_viewed.field("duration_str").to_cell(),
        );
    }

    match stats::filtered_mean(table, |_| true, "duration") {
        Some(mean) => info!("average video duration: {}", format_duration(mean as i64)),
        None => info!("average video duration: not available"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_fields_require_reveal() {
        let plan = plan();
        for name in ["duration", "duration_str"] {
            let field = plan.fields.iter().find(|f| f.name == name).unwrap();
            assert!(field.reveal, "field {} must reveal the overlay", name);
        }
    }

    #[test]
    fn test_identity_is_the_video_url() {
        let plan = plan();
        assert_eq!(plan.identity.name, "video_url");
    }
}
