//! Provider seam for the paged search flow.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use scrapingdog_client::{LinkedinJobsQuery, ScrapingDogClient};

use super::query::{Combo, FetchJobsRequest};
use super::RawRecord;

/// One page request as the provider sees it: the active filter combo (an
/// all-`None` combo is the broad fallback) and a 1-based page number.
#[derive(Debug, Clone)]
pub struct PageQuery {
    pub combo: Combo,
    pub page: u32,
}

/// A paged job-listing source. Implementations translate the combo and page
/// into provider-native parameters and return raw records.
#[async_trait]
pub trait JobProvider: Send + Sync {
    async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<RawRecord>>;
}

/// ScrapingDog LinkedIn Jobs as a paged provider.
pub struct ScrapingDogProvider {
    client: Arc<ScrapingDogClient>,
    base: LinkedinJobsQuery,
}

impl ScrapingDogProvider {
    pub fn new(client: Arc<ScrapingDogClient>, request: &FetchJobsRequest) -> Self {
        let base = LinkedinJobsQuery {
            field: non_empty(&request.field),
            location: non_empty(&request.location),
            geoid: non_empty(&request.geoid),
            sort_by: non_empty(&request.sort_by),
            work_type: non_empty(&request.work_type),
            filter_by_company: non_empty(&request.filter_by_company),
            count: Some(request.chunk_size()),
            ..Default::default()
        };
        Self { client, base }
    }
}

#[async_trait]
impl JobProvider for ScrapingDogProvider {
    async fn fetch_page(&self, query: &PageQuery) -> Result<Vec<RawRecord>> {
        let mut params = self.base.clone();
        params.page = Some(query.page);
        params.job_type = query.combo.job_type.clone();
        params.exp_level = query.combo.exp_level.clone();
        Ok(self.client.fetch_jobs(&params).await?)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
