//! Field parsers for free-text UI strings.
//!
//! Every parser is total: unparseable input resolves to a defined sentinel,
//! never an error. Callers must treat the sentinel as "absent", not as a true
//! zero, when aggregating (see `stats`).

/// Parse a price string into a float amount.
///
/// Strips currency markers and thousands separators: `"Rs. 1,250"` -> `1250.0`.
/// Returns `0.0` when no amount is present.
pub fn parse_money(raw: &str) -> f64 {
    // Take the first digit run together with any interior dots/commas, so a
    // dot in a currency marker ("Rs.") is not mistaken for a decimal point.
    let start = match raw.find(|c: char| c.is_ascii_digit()) {
        Some(i) => i,
        None => return 0.0,
    };
    let amount: String = raw[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .filter(|c| *c != ',')
        .collect();

    amount.parse::<f64>().unwrap_or(0.0)
}

/// Parse a colon-delimited duration (`"SS"`, `"MM:SS"`, `"HH:MM:SS"`) into
/// total whole seconds.
///
/// Returns `0` for empty input, more than three parts, or non-numeric parts.
pub fn parse_duration(raw: &str) -> i64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }

    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() > 3 {
        return 0;
    }

    let mut total = 0i64;
    for part in &parts {
        let value = match part.trim().parse::<i64>() {
            Ok(v) => v,
            Err(_) => return 0,
        };
        total = total * 60 + value;
    }
    total
}

/// Parse a count with an optional magnitude suffix: `"1.2k views"` -> `1200`.
///
/// Strips a trailing "views" unit word, thousands separators and case.
/// `k` multiplies by 1,000 and `m` by 1,000,000. Returns `0` when empty or
/// unparseable.
pub fn parse_count(raw: &str) -> i64 {
    let mut text = raw.to_lowercase().replace(',', "");
    if let Some(stripped) = text.strip_suffix("views") {
        text = stripped.to_string();
    }
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }

    if let Some(number) = text.strip_suffix('k') {
        return number
            .trim()
            .parse::<f64>()
            .map(|v| (v * 1_000.0) as i64)
            .unwrap_or(0);
    }
    if let Some(number) = text.strip_suffix('m') {
        return number
            .trim()
            .parse::<f64>()
            .map(|v| (v * 1_000_000.0) as i64)
            .unwrap_or(0);
    }

    text.parse::<i64>().unwrap_or(0)
}

/// Parse a numeric range into the mean of all digit runs, after removing
/// thousands separators: `"50,000 - 70,000"` -> `Some(60000.0)`.
///
/// Returns `None` when no digit run is found. `None` is the "unavailable"
/// sentinel and is distinct from a true zero.
pub fn parse_range(raw: &str) -> Option<f64> {
    let text = raw.replace(',', "");

    let mut runs: Vec<f64> = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            runs.push(current.parse::<f64>().ok()?);
            current.clear();
        }
    }
    if !current.is_empty() {
        runs.push(current.parse::<f64>().ok()?);
    }

    if runs.is_empty() {
        return None;
    }
    Some(runs.iter().sum::<f64>() / runs.len() as f64)
}

/// Format whole seconds as `HH:MM:SS` for summary reporting.
pub fn format_duration(total_secs: i64) -> String {
    let total_secs = total_secs.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}
