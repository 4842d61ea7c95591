//! Bright Data datasets v3 API client.
//!
//! Collections are asynchronous: a trigger call returns a snapshot id, and
//! the snapshot is polled with backoff until records are ready or a finite
//! ceiling elapses. Ready payloads arrive in several shapes (inline array,
//! items object, downloadable file, empty sentinel); all normalize to a
//! record list.
//!
//! # Example
//!
//! ```rust,ignore
//! use brightdata_client::{BrightDataClient, IndeedDiscoverInput, TriggerOptions};
//!
//! let client = BrightDataClient::new("your-api-key".into());
//!
//! let opts = TriggerOptions {
//!     limit_per_input: Some(25),
//!     ..Default::default()
//! };
//! let records = client.discover("gd_l4dx9j9sscpvs7no2", &[input], &opts).await?;
//! ```

pub mod error;
pub mod poll;
pub mod types;

pub use error::{BrightDataError, Result};
pub use poll::PollConfig;
pub use types::{
    IndeedDiscoverInput, LinkedinDiscoverInput, RawRecord, TriggerOptions, TriggerResponse,
};

use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::Value;

use poll::SnapshotProbe;

const BASE_URL: &str = "https://api.brightdata.com/datasets/v3";

/// Dataset ID for LinkedIn job listings.
pub const LINKEDIN_JOBS_DATASET: &str = "gd_lpfll7v5hcqtkxl6l";

/// Dataset ID for Indeed job listings.
pub const INDEED_JOBS_DATASET: &str = "gd_l4dx9j9sscpvs7no2";

pub struct BrightDataClient {
    client: reqwest::Client,
    token: String,
    poll: PollConfig,
}

impl BrightDataClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            poll: PollConfig::default(),
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Trigger a dataset collection. Returns the snapshot id to poll.
    pub async fn trigger<I: Serialize>(
        &self,
        dataset_id: &str,
        inputs: &[I],
        opts: &TriggerOptions,
    ) -> Result<String> {
        let url = format!("{}/trigger", BASE_URL);
        let mut query: Vec<(&str, String)> = vec![
            ("dataset_id", dataset_id.to_string()),
            ("type", opts.trigger_type.clone()),
            ("discover_by", opts.discover_by.clone()),
            ("include_errors", opts.include_errors.to_string()),
        ];
        if let Some(limit) = opts.limit_per_input {
            query.push(("limit_per_input", limit.to_string()));
        }

        let resp = self
            .client
            .post(&url)
            .query(&query)
            .bearer_auth(&self.token)
            .json(inputs)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BrightDataError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let trigger: TriggerResponse = resp.json().await?;
        tracing::info!(dataset_id, snapshot_id = %trigger.snapshot_id, "Triggered collection");
        Ok(trigger.snapshot_id)
    }

    /// Poll a snapshot until ready, then normalize its payload to records.
    ///
    /// Waits are cooperative sleeps paced by `PollConfig`; cumulative wait is
    /// bounded by the config's ceiling, after which `Timeout` is returned.
    /// The underlying collection keeps running server-side either way.
    pub async fn collect_snapshot(&self, snapshot_id: &str) -> Result<Vec<RawRecord>> {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            match self.probe_snapshot(snapshot_id).await? {
                SnapshotProbe::Ready(body) => {
                    let records = self.ready_records(body).await?;
                    tracing::info!(
                        snapshot_id,
                        count = records.len(),
                        waited_ms = started.elapsed().as_millis() as u64,
                        "Snapshot ready"
                    );
                    return Ok(records);
                }
                SnapshotProbe::NotReady { suggested_wait } => {
                    attempt += 1;
                    let delay = poll::next_delay(&self.poll, attempt, suggested_wait);
                    if started.elapsed() + delay > self.poll.ceiling {
                        return Err(BrightDataError::Timeout {
                            snapshot_id: snapshot_id.to_string(),
                            waited: started.elapsed(),
                        });
                    }
                    tracing::debug!(
                        snapshot_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Snapshot not ready, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Trigger a collection and wait for its records.
    pub async fn discover<I: Serialize>(
        &self,
        dataset_id: &str,
        inputs: &[I],
        opts: &TriggerOptions,
    ) -> Result<Vec<RawRecord>> {
        let snapshot_id = self.trigger(dataset_id, inputs, opts).await?;
        self.collect_snapshot(&snapshot_id).await
    }

    async fn probe_snapshot(&self, snapshot_id: &str) -> Result<SnapshotProbe> {
        let url = format!("{}/snapshot/{}?format=json", BASE_URL, snapshot_id);
        let resp = self.client.get(&url).bearer_auth(&self.token).send().await?;

        let status = resp.status();
        let suggested_wait = retry_after(resp.headers());

        // 202 means the collection is still building.
        if status.as_u16() == 202 {
            return Ok(SnapshotProbe::NotReady { suggested_wait });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BrightDataError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: Value = resp.json().await?;
        if poll::is_waiting_body(&body) {
            return Ok(SnapshotProbe::NotReady { suggested_wait });
        }
        Ok(SnapshotProbe::Ready(body))
    }

    async fn ready_records(&self, body: Value) -> Result<Vec<RawRecord>> {
        if let Some(url) = poll::file_pointer(&body) {
            tracing::debug!(url, "Snapshot delivered as a result file");
            return self.download_file(url).await;
        }
        poll::inline_records(body)
    }

    async fn download_file(&self, url: &str) -> Result<Vec<RawRecord>> {
        let resp = self.client.get(url).bearer_auth(&self.token).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BrightDataError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        let text = resp.text().await?;
        poll::file_records(&text)
    }
}

fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
