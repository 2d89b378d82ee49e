//! Record extraction with per-field fallback.
//!
//! One field's failure never aborts its siblings or the record: every error
//! on the locate/read/parse path resolves to the field's declared fallback
//! and extraction continues.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use crate::driver::ListDriver;
use crate::error::ScraperError;
use crate::plan::{FieldSpec, FieldValue, Gather, TextSource};
use crate::record::PartialRecord;

/// Evaluate the identity spec against one item. `None` when the key cannot
/// be read; such items are skipped (and will be re-attempted if they render
/// again), never retained.
pub async fn extract_identity<D: ListDriver>(
    driver: &D,
    handle: &D::Handle,
    spec: &FieldSpec,
) -> Option<String> {
    match read_field(driver, handle, spec, Duration::ZERO).await {
        Ok(FieldValue::Text(key)) if !key.is_empty() => Some(key),
        Ok(other) => {
            debug!(field = %spec.name, ?other, "identity read yielded non-text value");
            None
        }
        Err(e) => {
            debug!(field = %spec.name, error = %e, "identity read failed");
            None
        }
    }
}

/// Extract every planned field for one item. Returns the record and the
/// number of fields that resolved to their fallback.
pub async fn extract_record<D: ListDriver>(
    driver: &D,
    handle: &D::Handle,
    key: String,
    fields: &[FieldSpec],
    reveal_wait: Duration,
) -> (PartialRecord, usize) {
    let mut record = PartialRecord::new(key);
    let mut fallbacks = 0;

    for spec in fields {
        let value = match read_field(driver, handle, spec, reveal_wait).await {
            Ok(value) => value,
            Err(e) => {
                debug!(field = %spec.name, key = record.key(), error = %e, "field fell back");
                fallbacks += 1;
                spec.fallback.clone()
            }
        };
        record.set(spec.name.clone(), value);
    }

    (record, fallbacks)
}

/// Extract detail fields against the current page (used by enrichment).
/// Same fallback discipline as `extract_record`, but locators are evaluated
/// as page-level queries.
pub async fn extract_page_fields<D: ListDriver>(
    driver: &D,
    fields: &[FieldSpec],
) -> (Vec<(String, FieldValue)>, usize) {
    let mut values = Vec::with_capacity(fields.len());
    let mut fallbacks = 0;

    for spec in fields {
        let value = match read_page_field(driver, spec).await {
            Ok(value) => value,
            Err(e) => {
                debug!(field = %spec.name, error = %e, "detail field fell back");
                fallbacks += 1;
                spec.fallback.clone()
            }
        };
        values.push((spec.name.clone(), value));
    }

    (values, fallbacks)
}

/// Read one field relative to an item handle.
async fn read_field<D: ListDriver>(
    driver: &D,
    handle: &D::Handle,
    spec: &FieldSpec,
    reveal_wait: Duration,
) -> Result<FieldValue, ScraperError> {
    if let TextSource::Const(value) = &spec.source {
        return Ok(value.clone());
    }

    if spec.reveal {
        // Best-effort: a failed reveal still falls through to the read, and
        // an absent sub-element resolves to the fallback.
        if driver.reveal(handle).await.is_ok() && !reveal_wait.is_zero() {
            sleep(reveal_wait).await;
        }
    }

    let raw = match &spec.source {
        TextSource::Text => match &spec.gather {
            Gather::First => driver.read_text(handle, spec.locator.as_deref()).await?,
            Gather::Join { sep, limit, dedupe } => {
                let sub = spec.locator.as_deref().ok_or_else(|| {
                    ScraperError::Extraction(format!("joined field '{}' needs a locator", spec.name))
                })?;
                join_texts(driver.read_texts(handle, sub).await?, sep, *limit, *dedupe)
            }
        },
        TextSource::Attribute(name) => driver
            .read_attribute(handle, spec.locator.as_deref(), name)
            .await?
            .ok_or_else(|| {
                ScraperError::ElementNotFound(format!("attribute '{}' absent", name))
            })?,
        TextSource::Const(_) => unreachable!("handled above"),
    };

    finish(spec, &raw)
}

/// Read one field as a page-level query (detail pages have no item handle).
async fn read_page_field<D: ListDriver>(
    driver: &D,
    spec: &FieldSpec,
) -> Result<FieldValue, ScraperError> {
    if let TextSource::Const(value) = &spec.source {
        return Ok(value.clone());
    }

    let sub = spec.locator.as_deref().ok_or_else(|| {
        ScraperError::Extraction(format!("detail field '{}' needs a locator", spec.name))
    })?;
    let handles = driver.query_all(sub).await?;

    let raw = match &spec.source {
        TextSource::Text => match &spec.gather {
            Gather::First => {
                let first = handles.first().ok_or_else(|| {
                    ScraperError::ElementNotFound(sub.to_string())
                })?;
                driver.read_text(first, None).await?
            }
            Gather::Join { sep, limit, dedupe } => {
                let mut texts = Vec::with_capacity(handles.len());
                for h in &handles {
                    texts.push(driver.read_text(h, None).await?);
                }
                join_texts(texts, sep, *limit, *dedupe)
            }
        },
        TextSource::Attribute(name) => {
            let first = handles
                .first()
                .ok_or_else(|| ScraperError::ElementNotFound(sub.to_string()))?;
            driver.read_attribute(first, None, name).await?.ok_or_else(|| {
                ScraperError::ElementNotFound(format!("attribute '{}' absent", name))
            })?
        }
        TextSource::Const(_) => unreachable!("handled above"),
    };

    finish(spec, &raw)
}

fn finish(spec: &FieldSpec, raw: &str) -> Result<FieldValue, ScraperError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScraperError::Extraction(format!(
            "empty text for field '{}'",
            spec.name
        )));
    }
    Ok(spec.parser.apply(trimmed))
}

fn join_texts<S: AsRef<str>>(texts: Vec<String>, sep: S, limit: Option<usize>, dedupe: bool) -> String {
    let mut kept: Vec<String> = Vec::new();
    for text in texts {
        let trimmed = text.trim().to_string();
        if trimmed.is_empty() {
            continue;
        }
        if dedupe && kept.contains(&trimmed) {
            continue;
        }
        kept.push(trimmed);
        if let Some(limit) = limit {
            if kept.len() >= limit {
                break;
            }
        }
    }
    kept.join(sep.as_ref())
}
