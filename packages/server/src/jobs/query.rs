//! Request parsing for the single-provider search flow.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn default_sheet_name() -> String {
    "Sheet1".to_string()
}

fn default_total_records() -> i64 {
    50
}

fn default_per_request_count() -> i64 {
    10
}

/// Body of `POST /api/fetch-jobs`.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchJobsRequest {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub geoid: Option<String>,
    /// Recency token: `""`, `"day"`, `"week"`, or `"month"`.
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub work_type: Option<String>,
    #[serde(default)]
    pub filter_by_company: Option<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub job_types: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub exp_levels: Vec<String>,
    #[serde(default)]
    pub sheet_id: Option<String>,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default = "default_total_records")]
    pub total_records: i64,
    #[serde(default = "default_per_request_count")]
    pub per_request_count: i64,
}

impl FetchJobsRequest {
    /// Requested total, floored at 1.
    pub fn target_total(&self) -> usize {
        self.total_records.max(1) as usize
    }

    /// Page size, clamped to what the provider accepts.
    pub fn chunk_size(&self) -> u32 {
        self.per_request_count.clamp(1, 49) as u32
    }

    /// Cartesian product of the selected job types and experience levels.
    /// No selection on either axis means "any" on that axis.
    pub fn combos(&self) -> Vec<Combo> {
        let job_types: Vec<Option<String>> = if self.job_types.is_empty() {
            vec![None]
        } else {
            self.job_types.iter().cloned().map(Some).collect()
        };
        let exp_levels: Vec<Option<String>> = if self.exp_levels.is_empty() {
            vec![None]
        } else {
            self.exp_levels.iter().cloned().map(Some).collect()
        };

        let mut combos = Vec::with_capacity(job_types.len() * exp_levels.len());
        for job_type in &job_types {
            for exp_level in &exp_levels {
                combos.push(Combo {
                    job_type: job_type.clone(),
                    exp_level: exp_level.clone(),
                });
            }
        }
        combos
    }
}

/// One concrete (job type, experience level) filter pairing. `None` on a
/// field means that axis is unfiltered; `Combo::any()` is the broad search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Combo {
    pub job_type: Option<String>,
    pub exp_level: Option<String>,
}

impl Combo {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> ComboSummary {
        ComboSummary {
            job_type: self.job_type.clone().unwrap_or_else(|| "any".to_string()),
            exp_level: self.exp_level.clone().unwrap_or_else(|| "any".to_string()),
        }
    }
}

/// Combo as echoed back in the response.
#[derive(Debug, Clone, Serialize)]
pub struct ComboSummary {
    pub job_type: String,
    pub exp_level: String,
}

/// Accepts a JSON array of values or a comma-separated string; entries are
/// trimmed and empties dropped.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_list(&value))
}

fn value_to_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.trim().to_string()),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            })
            .filter(|entry| !entry.is_empty())
            .collect(),
        Value::String(text) => text
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Number(number) => vec![number.to_string()],
        _ => Vec::new(),
    }
}
