use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::models::Record;

// `window.EVENTS = [ ... ];` as shipped next to the static page.
static SCRIPT_WRAPPER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*(?:(?:var|let|const)\s+)?(?:window\.)?EVENTS\s*=\s*(.*?)\s*;?\s*$")
        .expect("static wrapper pattern")
});

/// Load the incident collection. A missing file is reported and yields an
/// empty collection; a file that is present but malformed is an error.
pub fn load_events(path: &Path) -> Result<Vec<Record>> {
    let start = std::time::Instant::now();

    if !path.exists() {
        warn!("Event file not found - path={}, continuing with no records", path.display());
        return Ok(Vec::new());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read event file {}", path.display()))?;
    let records = parse_events(&text)
        .with_context(|| format!("decode event file {}", path.display()))?;

    info!(
        "Event load completed - path={}, duration={:.2}s, records={}",
        path.display(),
        start.elapsed().as_secs_f32(),
        records.len()
    );
    Ok(records)
}

/// Bare JSON array, or the same array behind an `EVENTS =` assignment.
/// Elements that are not record objects are dropped; a payload that is valid
/// JSON but not an array yields no records. Only broken JSON is an error.
pub fn parse_events(text: &str) -> Result<Vec<Record>> {
    let body = match SCRIPT_WRAPPER.captures(text).and_then(|c| c.get(1)) {
        Some(m) => {
            debug!("Event payload is script-wrapped");
            m.as_str()
        }
        None => text.trim(),
    };
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let items = match serde_json::from_str::<Value>(body)? {
        Value::Array(items) => items,
        other => {
            warn!("Event payload is not an array - kind={}, continuing with no records", json_kind(&other));
            return Ok(Vec::new());
        }
    };

    let total = items.len();
    let records: Vec<Record> = items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();
    if records.len() < total {
        warn!("Dropped malformed events - dropped={}, kept={}", total - records.len(), records.len());
    }
    Ok(records)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
