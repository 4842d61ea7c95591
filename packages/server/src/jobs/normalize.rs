//! Record normalization.
//!
//! Two modes. The fixed schema extracts a known field list through ordered
//! candidate-key chains, because upstream field names drift between provider
//! versions. The dynamic schema derives the column set from the data itself:
//! the first-seen union of keys over a bounded sample.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use super::query::Combo;
use super::RawRecord;

/// Candidate keys per canonical field, in preference order. The leading
/// entry is the native ScrapingDog name; the rest absorb schema drift from
/// the other providers.
pub const POSITION_KEYS: &[&str] = &["job_position", "title", "position"];
pub const LINK_KEYS: &[&str] = &["job_link", "url", "jobUrl", "job_url"];
pub const ID_KEYS: &[&str] = &["job_id", "id"];
pub const COMPANY_KEYS: &[&str] = &["company_name", "company", "companyName"];
pub const PROFILE_KEYS: &[&str] = &["company_profile", "company_url", "companyUrl"];
pub const LOCATION_KEYS: &[&str] = &["job_location", "location", "jobLocation"];
pub const POSTED_KEYS: &[&str] = &["job_posting_date", "postedAt", "publishedAt", "datePosted"];
pub const LOGO_KEYS: &[&str] = &["company_logo_url", "company_logo", "logo"];

/// Header discovery scans at most this many records; in practice the column
/// set stabilizes long before the bound on any real result set.
pub const HEADER_SAMPLE_LIMIT: usize = 1000;

/// First present, non-empty candidate field rendered as text.
pub fn first_text(record: &RawRecord, keys: &[&str]) -> String {
    for key in keys {
        if let Some(value) = record.get(*key) {
            let text = value_text(value);
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

/// Render one value as cell text: null becomes empty, strings pass through,
/// other scalars use their display form, structures are JSON-stringified.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        structured => serde_json::to_string(structured).unwrap_or_default(),
    }
}

/// One normalized listing in the fixed schema, tagged with the filter combo
/// and page that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct JobRow {
    pub job_position: String,
    pub job_link: String,
    pub job_id: String,
    pub company_name: String,
    pub company_profile: String,
    pub job_location: String,
    pub job_posting_date: String,
    pub company_logo_url: String,
    pub job_type: String,
    pub exp_level: String,
    pub page: u32,
}

impl JobRow {
    /// Sheet column titles, in the order rows are written.
    pub const HEADERS: &'static [&'static str] = &[
        "Position",
        "Link",
        "Job ID",
        "Company",
        "Company Profile",
        "Location",
        "Posted",
        "Logo URL",
        "Job Type",
        "Experience Level",
        "Page",
    ];

    pub fn from_raw(record: &RawRecord, combo: &Combo, page: u32) -> Self {
        Self {
            job_position: first_text(record, POSITION_KEYS),
            job_link: first_text(record, LINK_KEYS),
            job_id: first_text(record, ID_KEYS),
            company_name: first_text(record, COMPANY_KEYS),
            company_profile: first_text(record, PROFILE_KEYS),
            job_location: first_text(record, LOCATION_KEYS),
            job_posting_date: first_text(record, POSTED_KEYS),
            company_logo_url: first_text(record, LOGO_KEYS),
            job_type: combo.job_type.clone().unwrap_or_default(),
            exp_level: combo.exp_level.clone().unwrap_or_default(),
            page,
        }
    }

    /// Keyed by the sheet column titles, ready for the spreadsheet write.
    pub fn to_sheet_record(&self) -> RawRecord {
        let mut record = RawRecord::new();
        let values = [
            self.job_position.as_str(),
            self.job_link.as_str(),
            self.job_id.as_str(),
            self.company_name.as_str(),
            self.company_profile.as_str(),
            self.job_location.as_str(),
            self.job_posting_date.as_str(),
            self.company_logo_url.as_str(),
            self.job_type.as_str(),
            self.exp_level.as_str(),
        ];
        for (title, value) in Self::HEADERS.iter().zip(values) {
            record.insert(title.to_string(), Value::String(value.to_string()));
        }
        record.insert("Page".to_string(), Value::from(self.page));
        record
    }
}

/// Column set for dynamic-schema rows: the union of top-level keys across a
/// bounded sample, in order of first appearance (never sorted).
pub fn discover_headers(records: &[RawRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut headers = Vec::new();
    for record in records.iter().take(HEADER_SAMPLE_LIMIT) {
        for key in record.keys() {
            if seen.insert(key.as_str()) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(body: Value) -> RawRecord {
        body.as_object().unwrap().clone()
    }

    #[test]
    fn test_fallback_chain_prefers_native_key() {
        let raw = record(json!({
            "job_position": "Backend Engineer",
            "title": "ignored",
        }));
        assert_eq!(first_text(&raw, POSITION_KEYS), "Backend Engineer");
    }

    #[test]
    fn test_fallback_chain_skips_empty_and_null() {
        let raw = record(json!({
            "job_position": "",
            "title": null,
            "position": "Data Engineer",
        }));
        assert_eq!(first_text(&raw, POSITION_KEYS), "Data Engineer");

        let raw = record(json!({"unrelated": "x"}));
        assert_eq!(first_text(&raw, POSITION_KEYS), "");
    }

    #[test]
    fn test_job_row_from_drifted_schema() {
        let raw = record(json!({
            "title": "Platform Engineer",
            "url": "https://jobs.example/123",
            "companyName": "Acme",
            "location": "Remote",
            "postedAt": "2024-06-01",
        }));
        let combo = Combo {
            job_type: Some("full_time".to_string()),
            exp_level: None,
        };
        let row = JobRow::from_raw(&raw, &combo, 3);
        assert_eq!(row.job_position, "Platform Engineer");
        assert_eq!(row.job_link, "https://jobs.example/123");
        assert_eq!(row.company_name, "Acme");
        assert_eq!(row.job_posting_date, "2024-06-01");
        assert_eq!(row.job_type, "full_time");
        assert_eq!(row.exp_level, "");
        assert_eq!(row.page, 3);
    }

    #[test]
    fn test_sheet_record_uses_display_titles() {
        let raw = record(json!({"job_position": "QA", "job_id": "j-9"}));
        let row = JobRow::from_raw(&raw, &Combo::any(), 1);
        let sheet = row.to_sheet_record();
        assert_eq!(sheet["Position"], "QA");
        assert_eq!(sheet["Job ID"], "j-9");
        assert_eq!(sheet["Page"], 1);
        assert_eq!(sheet.len(), JobRow::HEADERS.len());
    }

    #[test]
    fn test_discover_headers_first_seen_order() {
        let records = vec![
            record(json!({"b": 1, "a": 2})),
            record(json!({"c": 3, "a": 4})),
            record(json!({"d": 5})),
        ];
        // serde_json object keys iterate in insertion order within a record;
        // the union preserves first appearance across records.
        assert_eq!(discover_headers(&records), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_discover_headers_union_covers_all_subsets() {
        let records = vec![
            record(json!({"title": "x"})),
            record(json!({"salary": "1", "title": "y"})),
        ];
        let headers = discover_headers(&records);
        assert!(headers.contains(&"title".to_string()));
        assert!(headers.contains(&"salary".to_string()));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_value_text_serialization() {
        assert_eq!(value_text(&json!(null)), "");
        assert_eq!(value_text(&json!("s")), "s");
        assert_eq!(value_text(&json!(7)), "7");
        assert_eq!(value_text(&json!({"nested": true})), r#"{"nested":true}"#);
    }
}
