//! Persisted preference record for the genre selection.
//!
//! The record is a single JSON object that may grow fields over time;
//! only `currentGenreId` belongs to this module, everything else is
//! preserved verbatim on write.

use serde_json::{json, Map, Value};

/// Namespace key the record is stored under.
pub(crate) const PREFS_KEY: &str = "topcharts";

const CURRENT_GENRE_ID: &str = "currentGenreId";

/// Lenient decode of the persisted selection.
///
/// Numbers win; numeric strings are coerced; anything else reads as no
/// selection.
pub(crate) fn decode_selected(record: &str) -> Option<u64> {
    let value: Value = serde_json::from_str(record).ok()?;
    match value.get(CURRENT_GENRE_ID)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Merge the selection into an existing record, keeping unknown fields.
///
/// An unreadable prior record starts fresh rather than failing the write.
pub(crate) fn merge_selected(record: Option<&str>, selected: Option<u64>) -> String {
    let mut fields = record
        .and_then(|r| serde_json::from_str::<Map<String, Value>>(r).ok())
        .unwrap_or_default();
    fields.insert(CURRENT_GENRE_ID.to_string(), json!(selected));
    Value::Object(fields).to_string()
}
