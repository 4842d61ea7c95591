use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One record from a snapshot. Dataset schemas vary per dataset and over
/// time, so records stay as raw keyed maps.
pub type RawRecord = serde_json::Map<String, Value>;

/// Response to a trigger call.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerResponse {
    pub snapshot_id: String,
}

/// Options for triggering a dataset collection.
#[derive(Debug, Clone)]
pub struct TriggerOptions {
    /// `"discover_new"` crawls fresh results; `"search"` hits the cache and
    /// is faster.
    pub trigger_type: String,
    pub discover_by: String,
    pub include_errors: bool,
    pub limit_per_input: Option<u32>,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            trigger_type: "discover_new".to_string(),
            discover_by: "keyword".to_string(),
            include_errors: true,
            limit_per_input: None,
        }
    }
}

/// Discovery input for the LinkedIn jobs dataset.
#[derive(Debug, Clone, Serialize)]
pub struct LinkedinDiscoverInput {
    pub location: String,
    pub keyword: String,
    pub country: String,
    pub time_range: String,
    pub job_type: String,
    pub experience_level: String,
    pub remote: String,
    pub company: String,
    pub location_radius: String,
}

/// Discovery input for the Indeed jobs dataset.
#[derive(Debug, Clone, Serialize)]
pub struct IndeedDiscoverInput {
    pub country: String,
    pub domain: String,
    pub keyword_search: String,
    pub location: String,
    pub date_posted: String,
    pub posted_by: String,
    pub location_radius: String,
}
