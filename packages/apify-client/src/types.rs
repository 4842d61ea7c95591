use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One dataset item. Job-board actors do not share an output schema, so
/// items stay as raw keyed maps and callers pick the fields they need.
pub type RawItem = serde_json::Map<String, Value>;

/// Proxy settings shared by the job-board actors.
#[derive(Debug, Clone, Serialize)]
pub struct ProxySettings {
    #[serde(rename = "useApifyProxy")]
    pub use_apify_proxy: bool,
    #[serde(rename = "apifyProxyGroups")]
    pub apify_proxy_groups: Vec<String>,
}

impl ProxySettings {
    pub fn residential() -> Self {
        Self {
            use_apify_proxy: true,
            apify_proxy_groups: vec!["RESIDENTIAL".to_string()],
        }
    }
}

/// Input for the LinkedIn jobs scraper actor.
///
/// The actor schema is strict: unknown or null keys fail validation, so
/// optional fields are omitted entirely when unset.
#[derive(Debug, Clone, Serialize)]
pub struct LinkedinJobsInput {
    pub title: String,
    pub location: String,
    #[serde(rename = "companyName")]
    pub company_name: Vec<String>,
    #[serde(rename = "companyId")]
    pub company_id: Vec<String>,
    #[serde(rename = "workType", skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
    #[serde(rename = "contractType", skip_serializing_if = "Option::is_none")]
    pub contract_type: Option<String>,
    #[serde(rename = "experienceLevel", skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(rename = "publishedAt", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    /// Both `rows` and `maxItems` must be set to the same integer.
    pub rows: u32,
    #[serde(rename = "maxItems")]
    pub max_items: u32,
    pub proxy: ProxySettings,
}

/// Input for the Glassdoor jobs scraper actor.
#[derive(Debug, Clone, Serialize)]
pub struct GlassdoorJobsInput {
    pub keyword: String,
    #[serde(rename = "maxItems")]
    pub max_items: u32,
    #[serde(rename = "fromAge", skip_serializing_if = "Option::is_none")]
    pub from_age: Option<String>,
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    #[serde(rename = "includeNoSalaryJob")]
    pub include_no_salary_job: bool,
    #[serde(rename = "minSalary")]
    pub min_salary: u32,
    #[serde(rename = "jobType", skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    pub radius: String,
    #[serde(rename = "industryType")]
    pub industry_type: String,
    #[serde(rename = "domainType")]
    pub domain_type: String,
    #[serde(rename = "employerSizes")]
    pub employer_sizes: String,
    #[serde(rename = "applicationType")]
    pub application_type: String,
    #[serde(rename = "seniorityType", skip_serializing_if = "Option::is_none")]
    pub seniority_type: Option<String>,
    #[serde(rename = "remoteWorkType")]
    pub remote_work_type: bool,
    #[serde(rename = "minRating")]
    pub min_rating: String,
    pub proxy: ProxySettings,
}

impl GlassdoorJobsInput {
    /// Defaults matching the actor's published input schema; callers set the
    /// search fields on top.
    pub fn new(keyword: String, max_items: u32) -> Self {
        Self {
            keyword,
            max_items,
            from_age: None,
            base_url: "https://www.glassdoor.com".to_string(),
            include_no_salary_job: false,
            min_salary: 0,
            job_type: None,
            radius: "0".to_string(),
            industry_type: "ALL".to_string(),
            domain_type: "ALL".to_string(),
            employer_sizes: "ALL".to_string(),
            application_type: "ALL".to_string(),
            seniority_type: None,
            remote_work_type: true,
            min_rating: "0".to_string(),
            proxy: ProxySettings::residential(),
        }
    }
}

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RunData {
    pub id: String,
    pub status: String,
    #[serde(rename = "defaultDatasetId")]
    pub default_dataset_id: String,
    #[serde(rename = "startedAt")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linkedin_input_omits_unset_filters() {
        let input = LinkedinJobsInput {
            title: "data engineer".to_string(),
            location: "United States".to_string(),
            company_name: vec![],
            company_id: vec![],
            work_type: None,
            contract_type: Some("F".to_string()),
            experience_level: None,
            published_at: None,
            rows: 25,
            max_items: 25,
            proxy: ProxySettings::residential(),
        };

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["contractType"], "F");
        assert_eq!(json["maxItems"], 25);
        assert!(json.get("experienceLevel").is_none());
        assert!(json.get("publishedAt").is_none());
        assert_eq!(json["proxy"]["apifyProxyGroups"][0], "RESIDENTIAL");
    }

    #[test]
    fn test_glassdoor_input_defaults() {
        let input = GlassdoorJobsInput::new("rust".to_string(), 10);
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["baseUrl"], "https://www.glassdoor.com");
        assert_eq!(json["industryType"], "ALL");
        assert_eq!(json["minSalary"], 0);
        assert!(json.get("seniorityType").is_none());
    }

    #[test]
    fn test_run_data_deserialization() {
        let json = r#"{
            "id": "run123",
            "status": "SUCCEEDED",
            "defaultDatasetId": "ds456",
            "startedAt": "2024-01-01T00:00:00.000Z",
            "finishedAt": "2024-01-01T00:01:30.000Z"
        }"#;

        let run: RunData = serde_json::from_str(json).unwrap();
        assert_eq!(run.id, "run123");
        assert_eq!(run.default_dataset_id, "ds456");
        assert!(run.finished_at.is_some());
    }
}
