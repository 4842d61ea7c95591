//! Pure Apify REST API client.
//!
//! A minimal client for the Apify platform API. Supports starting actor runs,
//! polling for completion under a finite deadline, and fetching dataset
//! results.
//!
//! # Example
//!
//! ```rust,ignore
//! use apify_client::{ApifyClient, LinkedinJobsInput, LINKEDIN_JOBS_SCRAPER};
//!
//! let client = ApifyClient::new("your-api-token".into());
//!
//! let items = client.run_actor(LINKEDIN_JOBS_SCRAPER, &input).await?;
//! for item in &items {
//!     println!("{:?}", item.get("title"));
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{
    GlassdoorJobsInput, LinkedinJobsInput, ProxySettings, RawItem, RunData,
};

use std::time::{Duration, Instant};

use serde::Serialize;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ID for the LinkedIn jobs scraper.
pub const LINKEDIN_JOBS_SCRAPER: &str = "9eTAaHrnHrljnL3Tg";

/// Actor ID for the Glassdoor jobs scraper.
pub const GLASSDOOR_JOBS_SCRAPER: &str = "t2FNNV3J6mvckgV2g";

/// Default ceiling on how long a run may stay unfinished before the client
/// gives up waiting. The run itself is not aborted.
pub const DEFAULT_RUN_DEADLINE: Duration = Duration::from_secs(300);

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    run_deadline: Duration,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            run_deadline: DEFAULT_RUN_DEADLINE,
        }
    }

    /// Override the run-completion deadline. Must be finite; there is
    /// deliberately no "wait forever" option.
    pub fn with_run_deadline(mut self, deadline: Duration) -> Self {
        self.run_deadline = deadline;
        self
    }

    /// Start an actor run. Returns immediately with run metadata.
    pub async fn start_run<I: Serialize>(&self, actor_id: &str, input: &I) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", BASE_URL, actor_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let api_resp: ApiResponse<RunData> = resp.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes. Uses `waitForFinish=60` for efficient
    /// long-polling; gives up with `RunTimeout` once the deadline passes.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        let started = Instant::now();
        loop {
            let url = format!("{}/actor-runs/{}?waitForFinish=60", BASE_URL, run_id);
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ApifyError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let api_resp: ApiResponse<RunData> = resp.json().await?;
            match api_resp.data.status.as_str() {
                "SUCCEEDED" => return Ok(api_resp.data),
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(ApifyError::RunFailed(api_resp.data.status));
                }
                other => {
                    if started.elapsed() >= self.run_deadline {
                        return Err(ApifyError::RunTimeout {
                            run_id: run_id.to_string(),
                            status: other.to_string(),
                            waited_secs: started.elapsed().as_secs(),
                        });
                    }
                    tracing::debug!(run_id, status = other, "Run still in progress");
                    continue;
                }
            }
        }
    }

    /// Fetch dataset items from a completed run.
    pub async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<RawItem>> {
        let url = format!("{}/datasets/{}/items?format=json", BASE_URL, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let items: Vec<RawItem> = resp.json().await?;
        Ok(items)
    }

    /// Run an actor end-to-end: start run, poll, fetch results.
    pub async fn run_actor<I: Serialize>(
        &self,
        actor_id: &str,
        input: &I,
    ) -> Result<Vec<RawItem>> {
        tracing::info!(actor_id, "Starting actor run");

        let run = self.start_run(actor_id, input).await?;
        tracing::info!(run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        tracing::info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            "Run completed, fetching results"
        );

        let items = self.dataset_items(&completed.default_dataset_id).await?;
        tracing::info!(count = items.len(), "Fetched dataset items");

        Ok(items)
    }
}
