//! Output boundary: one CSV written at the end of a run, plus a best-effort
//! raw JSON dump.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use crate::error::ScraperError;
use crate::record::TypedTable;

/// `label_YYYYmmdd_HHMMSS.ext` under `dir`.
pub fn timestamped_path(dir: &Path, label: &str, ext: &str) -> PathBuf {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{}_{}.{}", label, timestamp, ext))
}

/// Write the table as CSV: identity key first, then the schema columns in
/// order. `Missing` cells render empty.
pub fn write_csv(table: &TypedTable, path: &Path) -> Result<(), ScraperError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<&str> = vec!["link"];
    header.extend(table.schema());
    writer.write_record(&header)?;

    for record in table.records() {
        let mut row: Vec<String> = vec![record.key().to_string()];
        for column in table.schema() {
            row.push(record.field(column).to_cell());
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    info!(path = %path.display(), rows = table.len(), "table written");
    Ok(())
}

/// Best-effort JSON dump of the raw table. Never fails the run.
pub fn dump_json(table: &TypedTable, path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!("failed to create dump directory: {}", e);
            return;
        }
    }

    let rows: Vec<serde_json::Value> = table
        .records()
        .iter()
        .map(|record| {
            let mut row = serde_json::Map::new();
            row.insert(
                "link".to_string(),
                serde_json::Value::String(record.key().to_string()),
            );
            for column in table.schema() {
                let value = serde_json::to_value(record.field(column))
                    .unwrap_or(serde_json::Value::Null);
                row.insert(column.to_string(), value);
            }
            serde_json::Value::Object(row)
        })
        .collect();

    match serde_json::to_string_pretty(&rows) {
        Ok(json) => {
            if let Err(e) = std::fs::write(path, json) {
                warn!("failed to save raw table: {}", e);
            } else {
                info!(path = %path.display(), "raw table saved");
            }
        }
        Err(e) => warn!("failed to serialize raw table: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::FieldValue;
    use crate::record::PartialRecord;

    fn sample_table() -> TypedTable {
        let mut table = TypedTable::new(vec!["title".to_string(), "price".to_string()]);
        let mut a = PartialRecord::new("https://x.test/p/1");
        a.set("title", FieldValue::Text("Shirt".into()));
        a.set("price", FieldValue::Float(1250.0));
        table.insert(a);

        let mut b = PartialRecord::new("https://x.test/p/2");
        b.set("title", FieldValue::Text("Shoes, leather".into()));
        b.set("price", FieldValue::Missing);
        table.insert(b);
        table
    }

    #[test]
    fn test_write_csv_round_trip() {
        let dir = std::env::temp_dir().join(format!("harvester-test-{}", std::process::id()));
        let path = dir.join("out.csv");
        write_csv(&sample_table(), &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers, csv::StringRecord::from(vec!["link", "title", "price"]));

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "Shirt");
        assert_eq!(&rows[0][2], "1250");
        // The embedded comma survives quoting; the sentinel renders empty.
        assert_eq!(&rows[1][1], "Shoes, leather");
        assert_eq!(&rows[1][2], "");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_timestamped_path_shape() {
        let path = timestamped_path(Path::new("/tmp/data"), "videos", "csv");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("videos_"));
        assert!(name.ends_with(".csv"));
    }
}
