//! ScrapingDog LinkedIn Jobs API client.
//!
//! One call per result page; the API is synchronous, so there is no run to
//! poll. Listings come back as raw keyed maps because the upstream schema
//! drifts between endpoint versions.
//!
//! # Example
//!
//! ```rust,ignore
//! use scrapingdog_client::{LinkedinJobsQuery, ScrapingDogClient};
//!
//! let client = ScrapingDogClient::new("your-api-key".into());
//!
//! let query = LinkedinJobsQuery {
//!     field: Some("backend engineer".into()),
//!     location: Some("United States".into()),
//!     count: Some(10),
//!     page: Some(1),
//!     ..Default::default()
//! };
//! let jobs = client.fetch_jobs(&query).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{Result, ScrapingDogError};
pub use types::{LinkedinJobsQuery, RawJob};

const BASE_URL: &str = "https://api.scrapingdog.com/linkedinjobs/";

pub struct ScrapingDogClient {
    client: reqwest::Client,
    api_key: String,
}

impl ScrapingDogClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    /// Fetch one page of LinkedIn job listings.
    pub async fn fetch_jobs(&self, query: &LinkedinJobsQuery) -> Result<Vec<RawJob>> {
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScrapingDogError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: serde_json::Value = resp.json().await?;
        let records = types::into_records(body);
        tracing::debug!(
            page = query.page.unwrap_or(1),
            count = records.len(),
            "Fetched ScrapingDog page"
        );
        Ok(records)
    }
}
