//! Snapshot poll pacing and payload interpretation.
//!
//! A triggered collection moves through `Triggered -> Waiting -> Ready`; the
//! functions here decide how long to wait between probes and how to turn a
//! "ready" body into records. The poll ceiling is mandatory and finite —
//! an unbounded wait would pin a request forever on a wedged snapshot.

use std::cmp;
use std::time::Duration;

use serde_json::Value;

use crate::error::{BrightDataError, Result};
use crate::types::RawRecord;

/// Poll pacing knobs. All three must be finite.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub base_delay: Duration,
    pub backoff_cap: Duration,
    /// Ceiling on cumulative wait before the poll fails with `Timeout`.
    pub ceiling: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(2),
            backoff_cap: Duration::from_secs(30),
            ceiling: Duration::from_secs(300),
        }
    }
}

/// Next wait before re-probing a snapshot that is not ready yet.
///
/// `max(suggested, min(base * attempt, cap))` — the provider's hint wins
/// when it asks for more patience than the local backoff would apply.
pub(crate) fn next_delay(
    config: &PollConfig,
    attempt: u32,
    suggested: Option<Duration>,
) -> Duration {
    let backoff = cmp::min(config.base_delay.saturating_mul(attempt), config.backoff_cap);
    match suggested {
        Some(hint) => cmp::max(hint, backoff),
        None => backoff,
    }
}

/// What one probe of the snapshot endpoint told us.
#[derive(Debug)]
pub(crate) enum SnapshotProbe {
    NotReady { suggested_wait: Option<Duration> },
    Ready(Value),
}

const WAITING_STATUSES: &[&str] = &["running", "building", "collecting", "scheduled", "starting"];

/// A 200 body can still mean "keep waiting": the endpoint reports progress
/// as `{"status": "running", ...}` until records exist.
pub(crate) fn is_waiting_body(body: &Value) -> bool {
    body.as_object()
        .and_then(|map| map.get("status"))
        .and_then(Value::as_str)
        .map(|status| WAITING_STATUSES.contains(&status.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// True when the body is the explicit "nothing matched" sentinel.
pub(crate) fn is_empty_sentinel(body: &Value) -> bool {
    let Some(map) = body.as_object() else {
        return false;
    };
    if map.get("status").and_then(Value::as_str) == Some("empty") {
        return true;
    }
    map.get("message")
        .and_then(Value::as_str)
        .map(|message| message.to_lowercase().contains("snapshot is empty"))
        .unwrap_or(false)
}

/// URL of a downloadable result file, when the body is a pointer rather
/// than inline data.
pub(crate) fn file_pointer(body: &Value) -> Option<&str> {
    let map = body.as_object()?;
    map.get("file_url")
        .or_else(|| map.get("download_url"))
        .and_then(Value::as_str)
}

/// Normalize an inline ready payload to records: a bare array, an object
/// with an `items`/`data` array, or the empty sentinel.
pub(crate) fn inline_records(body: Value) -> Result<Vec<RawRecord>> {
    if is_empty_sentinel(&body) {
        return Ok(Vec::new());
    }
    match body {
        Value::Array(items) => Ok(collect_objects(items)),
        Value::Object(mut map) => match map.remove("items").or_else(|| map.remove("data")) {
            Some(Value::Array(items)) => Ok(collect_objects(items)),
            _ => Err(BrightDataError::Payload(
                "ready body is neither an array nor an items object".to_string(),
            )),
        },
        other => Err(BrightDataError::Payload(format!(
            "ready body has unexpected type: {}",
            type_name(&other)
        ))),
    }
}

/// Parse a downloaded result file: JSON (array, items object, or a single
/// record) first, then newline-delimited JSON.
pub(crate) fn file_records(text: &str) -> Result<Vec<RawRecord>> {
    if let Ok(body) = serde_json::from_str::<Value>(text) {
        if let Value::Object(record) = &body {
            if !is_empty_sentinel(&body)
                && !record.contains_key("items")
                && !record.contains_key("data")
            {
                return Ok(vec![record.clone()]);
            }
        }
        return inline_records(body);
    }

    let mut records = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(record)) => records.push(record),
            Ok(_) => {}
            Err(err) => {
                return Err(BrightDataError::Payload(format!(
                    "result file is neither JSON nor NDJSON: {}",
                    err
                )));
            }
        }
    }
    Ok(records)
}

fn collect_objects(items: Vec<Value>) -> Vec<RawRecord> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> PollConfig {
        PollConfig {
            base_delay: Duration::from_secs(2),
            backoff_cap: Duration::from_secs(30),
            ceiling: Duration::from_secs(300),
        }
    }

    #[test]
    fn test_next_delay_grows_linearly_until_cap() {
        let cfg = config();
        assert_eq!(next_delay(&cfg, 1, None), Duration::from_secs(2));
        assert_eq!(next_delay(&cfg, 5, None), Duration::from_secs(10));
        assert_eq!(next_delay(&cfg, 40, None), Duration::from_secs(30));
    }

    #[test]
    fn test_next_delay_honors_longer_provider_hint() {
        let cfg = config();
        let hint = Some(Duration::from_secs(20));
        assert_eq!(next_delay(&cfg, 1, hint), Duration::from_secs(20));
        // A short hint never undercuts the local backoff.
        assert_eq!(
            next_delay(&cfg, 40, Some(Duration::from_secs(1))),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_waiting_body_detection() {
        assert!(is_waiting_body(&json!({"status": "running"})));
        assert!(is_waiting_body(&json!({"status": "Building", "progress": 10})));
        assert!(!is_waiting_body(&json!({"status": "empty"})));
        assert!(!is_waiting_body(&json!([{"title": "x"}])));
    }

    #[test]
    fn test_inline_records_bare_array() {
        let records = inline_records(json!([{"title": "a"}, {"title": "b"}])).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_inline_records_items_object() {
        let records = inline_records(json!({"items": [{"title": "a"}]})).unwrap();
        assert_eq!(records.len(), 1);
        let records = inline_records(json!({"data": [{"title": "a"}, {"title": "b"}]})).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_inline_records_empty_sentinel() {
        assert!(inline_records(json!({"status": "empty"})).unwrap().is_empty());
        assert!(inline_records(json!({"message": "Snapshot is empty"}))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_inline_records_rejects_junk() {
        assert!(inline_records(json!("nope")).is_err());
        assert!(inline_records(json!({"weird": true})).is_err());
    }

    #[test]
    fn test_file_records_json_and_ndjson() {
        let json_file = r#"[{"title": "a"}, {"title": "b"}]"#;
        assert_eq!(file_records(json_file).unwrap().len(), 2);

        let ndjson_file = "{\"title\": \"a\"}\n\n{\"title\": \"b\"}\n";
        assert_eq!(file_records(ndjson_file).unwrap().len(), 2);

        // A file holding one bare record is one record, not an error.
        assert_eq!(file_records(r#"{"title": "solo"}"#).unwrap().len(), 1);

        assert!(file_records("not json at all").is_err());
    }

    #[test]
    fn test_file_pointer_extraction() {
        let body = json!({"status": "ready", "file_url": "https://files.example/x.json"});
        assert_eq!(file_pointer(&body), Some("https://files.example/x.json"));
        assert_eq!(file_pointer(&json!({"download_url": "u"})), Some("u"));
        assert_eq!(file_pointer(&json!([1])), None);
    }
}
