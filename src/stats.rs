//! Summary statistics over a finalized table.
//!
//! Sentinel values (`Missing`, non-numeric cells) never enter a denominator:
//! a record whose salary could not be parsed is absent from the mean, not a
//! zero dragging it down.

use std::collections::HashMap;

use serde::Serialize;

use crate::record::{PartialRecord, TypedTable};

/// One value/frequency pair from `most_common`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frequency {
    pub value: String,
    pub count: usize,
}

/// Mean of `value_field` per distinct value of `group_field`, in
/// first-encountered group order. Groups with no contributing numeric rows
/// are omitted, not reported as zero.
pub fn grouped_mean(
    table: &TypedTable,
    group_field: &str,
    value_field: &str,
) -> Vec<(String, f64)> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();

    for record in table.records() {
        let Some(group) = record.field(group_field).as_text() else {
            continue;
        };
        let Some(value) = record.field(value_field).as_f64() else {
            continue;
        };
        let entry = sums.entry(group.to_string()).or_insert_with(|| {
            order.push(group.to_string());
            (0.0, 0)
        });
        entry.0 += value;
        entry.1 += 1;
    }

    order
        .into_iter()
        .map(|group| {
            let (sum, n) = sums[&group];
            (group, sum / n as f64)
        })
        .collect()
}

/// Top-N value/frequency pairs for a categorical field. When `delimiter` is
/// given, multi-value cells are split on it first. Ties are broken by
/// first-encountered order.
pub fn most_common(
    table: &TypedTable,
    field: &str,
    delimiter: Option<&str>,
    n: usize,
) -> Vec<Frequency> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    let mut bump = |value: &str| {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        let entry = counts.entry(value.to_string()).or_insert_with(|| {
            order.push(value.to_string());
            0
        });
        *entry += 1;
    };

    for record in table.records() {
        let Some(cell) = record.field(field).as_text() else {
            continue;
        };
        match delimiter {
            Some(sep) => {
                for part in cell.split(sep) {
                    bump(part);
                }
            }
            None => bump(cell),
        }
    }

    let mut ranked: Vec<Frequency> = order
        .into_iter()
        .map(|value| {
            let count = counts[&value];
            Frequency { value, count }
        })
        .collect();
    // Stable sort preserves first-encountered order among equal counts.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

/// Mean of `value_field` over rows matching the predicate, skipping rows
/// whose value is the unavailable sentinel. `None` when no row qualifies.
pub fn filtered_mean<F>(table: &TypedTable, predicate: F, value_field: &str) -> Option<f64>
where
    F: Fn(&PartialRecord) -> bool,
{
    let mut sum = 0.0;
    let mut n = 0usize;
    for record in table.records() {
        if !predicate(record) {
            continue;
        }
        if let Some(value) = record.field(value_field).as_f64() {
            sum += value;
            n += 1;
        }
    }
    if n == 0 {
        return None;
    }
    Some(sum / n as f64)
}

/// Case-insensitive substring predicate on a text field.
pub fn contains_ci(field: &str, needle: &str) -> impl Fn(&PartialRecord) -> bool {
    let field = field.to_string();
    let needle = needle.to_lowercase();
    move |record: &PartialRecord| {
        record
            .field(&field)
            .as_text()
            .map(|text| text.to_lowercase().contains(&needle))
            .unwrap_or(false)
    }
}

/// Records ranked by a numeric field, highest first. Sentinel rows are
/// excluded.
pub fn top_by<'a>(table: &'a TypedTable, value_field: &str, n: usize) -> Vec<&'a PartialRecord> {
    let mut ranked: Vec<(&PartialRecord, f64)> = table
        .records()
        .iter()
        .filter_map(|r| r.field(value_field).as_f64().map(|v| (r, v)))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(n);
    ranked.into_iter().map(|(r, _)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::FieldValue;
    use crate::record::PartialRecord;

    fn table(rows: Vec<Vec<(&str, FieldValue)>>) -> TypedTable {
        let schema: Vec<String> = rows
            .first()
            .map(|r| r.iter().map(|(name, _)| name.to_string()).collect())
            .unwrap_or_default();
        let mut table = TypedTable::new(schema);
        for (i, row) in rows.into_iter().enumerate() {
            let mut record = PartialRecord::new(format!("k{}", i));
            for (name, value) in row {
                record.set(name, value);
            }
            table.insert(record);
        }
        table
    }

    #[test]
    fn test_grouped_mean_excludes_sentinels_and_empty_groups() {
        let t = table(vec![
            vec![
                ("category", FieldValue::Text("Women".into())),
                ("price", FieldValue::Float(1000.0)),
            ],
            vec![
                ("category", FieldValue::Text("Women".into())),
                ("price", FieldValue::Float(3000.0)),
            ],
            vec![
                ("category", FieldValue::Text("Men".into())),
                ("price", FieldValue::Float(500.0)),
            ],
            // Sentinel row: must not enter any denominator.
            vec![
                ("category", FieldValue::Text("Women".into())),
                ("price", FieldValue::Missing),
            ],
            // A group with only sentinel rows is omitted entirely.
            vec![
                ("category", FieldValue::Text("Shoes".into())),
                ("price", FieldValue::Missing),
            ],
        ]);

        let means = grouped_mean(&t, "category", "price");
        assert_eq!(
            means,
            vec![("Women".to_string(), 2000.0), ("Men".to_string(), 500.0)]
        );
    }

    #[test]
    fn test_most_common_with_delimiter_and_tie_order() {
        let t = table(vec![
            vec![("skills", FieldValue::Text("Python, SQL".into()))],
            vec![("skills", FieldValue::Text("Python, Docker".into()))],
            vec![("skills", FieldValue::Text("SQL, Rust".into()))],
            vec![("skills", FieldValue::Missing)],
        ]);

        let top = most_common(&t, "skills", Some(", "), 3);
        assert_eq!(top[0], Frequency { value: "Python".into(), count: 2 });
        // SQL ties with Python on first-encounter only below it; among the
        // count-2 entries SQL follows Python, then the 1-count entries keep
        // encounter order.
        assert_eq!(top[1], Frequency { value: "SQL".into(), count: 2 });
        assert_eq!(top[2], Frequency { value: "Docker".into(), count: 1 });
    }

    #[test]
    fn test_filtered_mean_excludes_unavailable_sentinel() {
        let t = table(vec![
            vec![
                ("city", FieldValue::Text("Lahore".into())),
                ("salary", FieldValue::Float(60000.0)),
            ],
            vec![
                ("city", FieldValue::Text("Lahore West".into())),
                ("salary", FieldValue::Missing),
            ],
            vec![
                ("city", FieldValue::Text("lahore".into())),
                ("salary", FieldValue::Float(80000.0)),
            ],
            vec![
                ("city", FieldValue::Text("Karachi".into())),
                ("salary", FieldValue::Float(10.0)),
            ],
        ]);

        let mean = filtered_mean(&t, contains_ci("city", "Lahore"), "salary");
        // Not 46666.67: the sentinel row stays out of the denominator.
        assert_eq!(mean, Some(70000.0));
    }

    #[test]
    fn test_filtered_mean_unavailable_when_no_rows_qualify() {
        let t = table(vec![vec![
            ("city", FieldValue::Text("Karachi".into())),
            ("salary", FieldValue::Missing),
        ]]);

        assert_eq!(
            filtered_mean(&t, contains_ci("city", "Lahore"), "salary"),
            None
        );
        assert_eq!(
            filtered_mean(&t, contains_ci("city", "Karachi"), "salary"),
            None
        );
    }

    #[test]
    fn test_top_by() {
        let t = table(vec![
            vec![("views", FieldValue::Int(100))],
            vec![("views", FieldValue::Int(5000))],
            vec![("views", FieldValue::Missing)],
            vec![("views", FieldValue::Int(1200))],
        ]);

        let top = top_by(&t, "views", 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].field("views"), &FieldValue::Int(5000));
        assert_eq!(top[1].field("views"), &FieldValue::Int(1200));
    }
}
