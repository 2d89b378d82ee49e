//! Records, the typed table and fallback accounting.

use std::collections::HashMap;

use tracing::debug;

use crate::plan::FieldValue;

static MISSING: FieldValue = FieldValue::Missing;

/// One extracted item: identity key plus field name -> typed value.
///
/// Every field declared by the plan is present; `FieldValue::Missing` (or the
/// field's declared fallback) stands in for extraction failure.
#[derive(Debug, Clone)]
pub struct PartialRecord {
    key: String,
    fields: HashMap<String, FieldValue>,
}

impl PartialRecord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: HashMap::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Field lookup; undeclared names read as `Missing`.
    pub fn field(&self, name: &str) -> &FieldValue {
        self.fields.get(name).unwrap_or(&MISSING)
    }
}

/// Ordered record set with pairwise-distinct identity keys.
///
/// Records append in discovery order. After collection the table only changes
/// through detail application, which sets secondary fields exactly once per
/// record, keyed by identity, never by position.
#[derive(Debug, Default)]
pub struct TypedTable {
    primary_schema: Vec<String>,
    detail_schema: Vec<String>,
    records: Vec<PartialRecord>,
    index: HashMap<String, usize>,
}

impl TypedTable {
    pub fn new(primary_schema: Vec<String>) -> Self {
        Self {
            primary_schema,
            detail_schema: Vec::new(),
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Full column order: primary fields first, then detail fields.
    pub fn schema(&self) -> impl Iterator<Item = &str> {
        self.primary_schema
            .iter()
            .chain(self.detail_schema.iter())
            .map(String::as_str)
    }

    pub fn records(&self) -> &[PartialRecord] {
        &self.records
    }

    pub fn keys(&self) -> Vec<String> {
        self.records.iter().map(|r| r.key.clone()).collect()
    }

    /// Append a record. Returns false (and drops the record) when its
    /// identity key is already retained.
    pub fn insert(&mut self, record: PartialRecord) -> bool {
        if self.index.contains_key(&record.key) {
            debug!(key = %record.key, "duplicate identity key ignored");
            return false;
        }
        self.index.insert(record.key.clone(), self.records.len());
        self.records.push(record);
        true
    }

    /// Declare the secondary columns added by enrichment. Names colliding
    /// with primary columns are dropped: detail data never overwrites
    /// identity or primary fields.
    pub fn extend_schema(&mut self, names: Vec<String>) {
        for name in names {
            if self.primary_schema.contains(&name) || self.detail_schema.contains(&name) {
                debug!(field = %name, "detail field collides with existing column, skipped");
                continue;
            }
            self.detail_schema.push(name);
        }
    }

    /// Set secondary fields on the record with the given identity key.
    /// Fields outside the declared detail schema are ignored.
    pub fn apply_detail(&mut self, key: &str, values: Vec<(String, FieldValue)>) {
        let Some(&pos) = self.index.get(key) else {
            debug!(%key, "detail applied to unknown key, ignored");
            return;
        };
        for (name, value) in values {
            if !self.detail_schema.contains(&name) {
                continue;
            }
            self.records[pos].set(name, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&PartialRecord> {
        self.index.get(key).map(|&pos| &self.records[pos])
    }
}

/// Counters for failures that resolve silently to fallbacks.
///
/// Field- and item-level failures never abort a run, but they must stay
/// observable.
#[derive(Debug, Default, Clone)]
pub struct ExtractionStats {
    /// Individual fields that resolved to their fallback.
    pub field_fallbacks: usize,
    /// Records containing at least one fallback field.
    pub partial_records: usize,
    /// Items skipped because no identity key could be read.
    pub skipped_items: usize,
    /// Detail navigations that failed during enrichment.
    pub navigation_failures: usize,
}

impl ExtractionStats {
    pub fn record_fallbacks(&mut self, count: usize) {
        if count > 0 {
            self.field_fallbacks += count;
            self.partial_records += 1;
        }
    }
}
