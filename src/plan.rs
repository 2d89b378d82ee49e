//! Declarative extraction plans.
//!
//! A `CollectionPlan` is the whole per-site configuration: where the list
//! lives, how to identify an item, which fields to read and how to parse
//! them, how to make the list grow, and (optionally) which secondary fields
//! to pull from each item's detail page. Site logic lives in data, not in
//! per-site code branches.

use serde::Serialize;

use crate::parse;

/// A typed field value, or the explicit "not found" marker.
///
/// `Missing` stands in for any extraction or parse failure so that every
/// declared field is present in every record. Aggregation treats it as
/// absence, never as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Float(f64),
    Missing,
}

impl FieldValue {
    /// Numeric view for aggregation. `Text` and `Missing` yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Cell rendering for CSV output. `Missing` renders empty.
    pub fn to_cell(&self) -> String {
        match self {
            FieldValue::Text(v) => v.clone(),
            FieldValue::Int(v) => v.to_string(),
            FieldValue::Float(v) => v.to_string(),
            FieldValue::Missing => String::new(),
        }
    }
}

/// Where a field's raw text comes from.
#[derive(Debug, Clone)]
pub enum TextSource {
    /// Visible text of the located element.
    Text,
    /// An attribute of the located element.
    Attribute(String),
    /// A fixed value, no element read at all.
    Const(FieldValue),
}

/// How to combine multiple matching elements.
#[derive(Debug, Clone)]
pub enum Gather {
    /// Read the first match only.
    First,
    /// Read every match and join the texts.
    Join {
        sep: &'static str,
        limit: Option<usize>,
        dedupe: bool,
    },
}

/// Which parser turns raw text into a typed value.
#[derive(Debug, Clone, Copy)]
pub enum ParserKind {
    Raw,
    Money,
    Duration,
    Count,
    Range,
}

impl ParserKind {
    pub fn apply(&self, raw: &str) -> FieldValue {
        match self {
            ParserKind::Raw => FieldValue::Text(raw.to_string()),
            ParserKind::Money => FieldValue::Float(parse::parse_money(raw)),
            ParserKind::Duration => FieldValue::Int(parse::parse_duration(raw)),
            ParserKind::Count => FieldValue::Int(parse::parse_count(raw)),
            ParserKind::Range => match parse::parse_range(raw) {
                Some(mean) => FieldValue::Float(mean),
                None => FieldValue::Missing,
            },
        }
    }
}

/// How to locate, read, parse and default one field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    /// Sub-locator relative to the item handle (or to the page for detail
    /// fields). `None` reads the item element itself.
    pub locator: Option<String>,
    pub source: TextSource,
    pub gather: Gather,
    pub parser: ParserKind,
    /// Stored when location, reading or parsing fails.
    pub fallback: FieldValue,
    /// Scroll-into-view + hover before reading, for sub-elements that only
    /// render on interaction (e.g. thumbnail duration overlays). Best-effort.
    pub reveal: bool,
}

impl FieldSpec {
    pub fn text(name: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: Some(locator.into()),
            source: TextSource::Text,
            gather: Gather::First,
            parser: ParserKind::Raw,
            fallback: FieldValue::Missing,
            reveal: false,
        }
    }

    pub fn attribute(
        name: impl Into<String>,
        locator: impl Into<String>,
        attr: impl Into<String>,
    ) -> Self {
        Self {
            source: TextSource::Attribute(attr.into()),
            ..Self::text(name, locator)
        }
    }

    /// Attribute of the item element itself (no sub-locator).
    pub fn self_attribute(name: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator: None,
            source: TextSource::Attribute(attr.into()),
            gather: Gather::First,
            parser: ParserKind::Raw,
            fallback: FieldValue::Missing,
            reveal: false,
        }
    }

    /// A fixed column value, e.g. the category a whole run belongs to.
    pub fn constant(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            locator: None,
            source: TextSource::Const(value),
            gather: Gather::First,
            parser: ParserKind::Raw,
            fallback: FieldValue::Missing,
            reveal: false,
        }
    }

    pub fn with_parser(mut self, parser: ParserKind) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_fallback(mut self, fallback: FieldValue) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn joined(mut self, sep: &'static str) -> Self {
        self.gather = Gather::Join {
            sep,
            limit: None,
            dedupe: false,
        };
        self
    }

    pub fn joined_unique(mut self, sep: &'static str, limit: usize) -> Self {
        self.gather = Gather::Join {
            sep,
            limit: Some(limit),
            dedupe: true,
        };
        self
    }

    pub fn with_reveal(mut self) -> Self {
        self.reveal = true;
        self
    }
}

/// The interaction that makes a dynamic list reveal more items.
#[derive(Debug, Clone)]
pub enum GrowthAction {
    /// Scroll the window down by a pixel offset.
    ScrollBy(i64),
    /// Jump to the bottom of the document.
    ScrollToBottom,
    /// Click a "next" control located by the given selector.
    ClickNext(String),
}

/// Secondary fields pulled from each record's detail page.
#[derive(Debug, Clone)]
pub struct DetailPlan {
    /// Element to wait for after navigating to the detail page.
    pub ready_anchor: Option<String>,
    pub fields: Vec<FieldSpec>,
}

/// Full per-site extraction plan.
#[derive(Debug, Clone)]
pub struct CollectionPlan {
    pub start_url: String,
    /// Element to wait for after the initial navigation.
    pub ready_anchor: Option<String>,
    /// Locator matching every rendered list entry.
    pub item_locator: String,
    /// Produces the identity key (a stable URL or id) for deduplication.
    /// Items where this fails are skipped, not retained.
    pub identity: FieldSpec,
    pub fields: Vec<FieldSpec>,
    pub growth: GrowthAction,
    pub detail: Option<DetailPlan>,
}

impl CollectionPlan {
    /// Primary schema in declaration order.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn detail_field_names(&self) -> Vec<String> {
        self.detail
            .as_ref()
            .map(|d| d.fields.iter().map(|f| f.name.clone()).collect())
            .unwrap_or_default()
    }
}
