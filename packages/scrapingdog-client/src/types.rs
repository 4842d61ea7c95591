use serde::Serialize;
use serde_json::Value;

/// One job listing as returned by ScrapingDog. The upstream schema is not
/// contractually stable, so records stay as raw keyed maps.
pub type RawJob = serde_json::Map<String, Value>;

/// Query parameters for the LinkedIn Jobs endpoint.
///
/// `None` fields are omitted from the request entirely; the API treats an
/// empty parameter differently from a missing one.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkedinJobsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geoid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_by_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// The API answers with a bare array, or wraps the listings in a `jobs` or
/// `results` field depending on the endpoint version. Anything else is
/// treated as zero results.
pub(crate) fn into_records(body: Value) -> Vec<RawJob> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("jobs").or_else(|| map.remove("results")) {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_records_bare_array() {
        let body = json!([{"job_position": "Engineer"}, {"job_position": "Manager"}]);
        let records = into_records(body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["job_position"], "Engineer");
    }

    #[test]
    fn test_into_records_jobs_wrapper() {
        let body = json!({"jobs": [{"job_id": "1"}]});
        assert_eq!(into_records(body).len(), 1);
    }

    #[test]
    fn test_into_records_results_wrapper() {
        let body = json!({"results": [{"job_id": "1"}, {"job_id": "2"}]});
        assert_eq!(into_records(body).len(), 2);
    }

    #[test]
    fn test_into_records_drops_non_objects() {
        let body = json!([{"job_id": "1"}, "garbage", 42]);
        assert_eq!(into_records(body).len(), 1);
    }

    #[test]
    fn test_into_records_unexpected_shape_is_empty() {
        assert!(into_records(json!({"message": "no matches"})).is_empty());
        assert!(into_records(json!("oops")).is_empty());
    }

    #[test]
    fn test_query_omits_unset_params() {
        let query = LinkedinJobsQuery {
            field: Some("rust developer".into()),
            page: Some(2),
            ..Default::default()
        };
        let encoded = serde_urlencoded::to_string(&query).unwrap();
        assert!(encoded.contains("field=rust+developer"));
        assert!(encoded.contains("page=2"));
        assert!(!encoded.contains("geoid"));
    }
}
