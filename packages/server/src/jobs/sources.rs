//! Multi-provider fetch: Apify actors for LinkedIn and Glassdoor, Bright
//! Data datasets for Indeed (and for LinkedIn when no Apify token is
//! configured — both upstreams carry the same listings).
//!
//! Sources run concurrently and isolated: each source's fetch or sheet
//! failure is captured in its report instead of aborting the siblings, so
//! the response can show partial success. Each source persists to its own
//! tab with a dynamically discovered column set.

use apify_client::{GlassdoorJobsInput, LinkedinJobsInput, ProxySettings};
use brightdata_client::{LinkedinDiscoverInput, TriggerOptions};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sheets_client::WriteOptions;
use std::sync::Arc;

use super::dedupe::{ExclusionList, FilterOptions, SessionFilter};
use super::normalize::discover_headers;
use super::query::string_list;
use super::RawRecord;
use crate::server::app::AppState;

fn default_limit() -> i64 {
    25
}

/// Body of `POST /api/fetch`.
#[derive(Debug, Clone, Deserialize)]
pub struct MultiFetchRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "workType")]
    pub work_type: Option<String>,
    /// Contract-type code: F/P/C/T/I/V.
    #[serde(default, rename = "contractType")]
    pub contract_type: Option<String>,
    /// Experience-level code: "all" or "1".."5".
    #[serde(default, rename = "experienceLevel")]
    pub experience_level: Option<String>,
    /// Recency token in LinkedIn's `rNNNNN` seconds form.
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default, deserialize_with = "string_list")]
    pub fetchfrom: Vec<String>,
    #[serde(default)]
    pub sheet_id: Option<String>,
    #[serde(default, rename = "userID")]
    pub user_id: String,
}

impl MultiFetchRequest {
    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, 1000) as u32
    }

    /// Sources named in `fetchfrom`, in canonical order, deduplicated.
    pub fn sources(&self) -> Vec<Source> {
        let mut sources = Vec::new();
        for source in [Source::Linkedin, Source::Indeed, Source::Glassdoor] {
            if self
                .fetchfrom
                .iter()
                .any(|name| name.eq_ignore_ascii_case(source.name()))
                && !sources.contains(&source)
            {
                sources.push(source);
            }
        }
        sources
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Linkedin,
    Indeed,
    Glassdoor,
}

impl Source {
    pub fn name(&self) -> &'static str {
        match self {
            Source::Linkedin => "linkedin",
            Source::Indeed => "indeed",
            Source::Glassdoor => "glassdoor",
        }
    }

    /// Destination tab for this source.
    pub fn sheet_tab(&self) -> &'static str {
        match self {
            Source::Linkedin => "Sheet1",
            Source::Indeed => "Sheet2",
            Source::Glassdoor => "Sheet3",
        }
    }
}

/// Outcome of one source's fetch-and-persist pipeline. `error` is the
/// upstream fetch failing; `sheet_error` is a successful fetch that could
/// not be persisted — callers need to tell those apart.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: &'static str,
    pub fetched: usize,
    pub saved: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_error: Option<String>,
}

impl SourceReport {
    fn new(source: Source) -> Self {
        Self {
            source: source.name(),
            fetched: 0,
            saved: 0,
            error: None,
            sheet_error: None,
        }
    }
}

/// Run every selected source concurrently and join their reports.
pub async fn run_sources(
    state: &AppState,
    sheets: &Arc<sheets_client::SheetsClient>,
    request: &MultiFetchRequest,
    sheet_id: &str,
) -> Vec<SourceReport> {
    let tasks = request
        .sources()
        .into_iter()
        .map(|source| run_source(state, sheets, request, sheet_id, source));
    futures::future::join_all(tasks).await
}

async fn run_source(
    state: &AppState,
    sheets: &Arc<sheets_client::SheetsClient>,
    request: &MultiFetchRequest,
    sheet_id: &str,
    source: Source,
) -> SourceReport {
    let mut report = SourceReport::new(source);

    let items = match fetch_records(state, request, source).await {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(source = source.name(), error = %err, "Provider fetch failed");
            report.error = Some(err.to_string());
            return report;
        }
    };
    report.fetched = items.len();

    let rows = screen_records(items, &request.user_id, request.limit() as usize);
    if rows.is_empty() {
        // Nothing survived filtering; leave the sheet untouched.
        return report;
    }
    let headers = discover_headers(&rows);

    match sheets
        .append_records(
            sheet_id,
            source.sheet_tab(),
            &rows,
            &headers,
            &WriteOptions::default(),
        )
        .await
    {
        Ok(saved) => report.saved = saved,
        Err(err) => {
            tracing::warn!(source = source.name(), error = %err, "Sheet append failed");
            report.sheet_error = Some(err.to_string());
        }
    }
    report
}

/// Exclusion + session dedup over one source's raw records, capped at the
/// requested limit, with the user-identity field stamped onto survivors.
fn screen_records(items: Vec<RawRecord>, user_id: &str, limit: usize) -> Vec<RawRecord> {
    let mut filter = SessionFilter::new(FilterOptions {
        exclude: ExclusionList::compiled_in(),
        max_age_minutes: None,
        sort_newest_first: false,
        now: Utc::now(),
    });

    let mut rows = Vec::new();
    for mut record in items {
        if rows.len() >= limit {
            break;
        }
        if filter.screen(&record).is_err() {
            continue;
        }
        record.insert("userID".to_string(), Value::String(user_id.to_string()));
        rows.push(record);
    }
    rows
}

async fn fetch_records(
    state: &AppState,
    request: &MultiFetchRequest,
    source: Source,
) -> anyhow::Result<Vec<RawRecord>> {
    match source {
        Source::Linkedin => {
            if let Some(apify) = &state.apify {
                let input = linkedin_actor_input(request);
                Ok(apify
                    .run_actor(apify_client::LINKEDIN_JOBS_SCRAPER, &input)
                    .await?)
            } else if let Some(brightdata) = &state.brightdata {
                let input = linkedin_discover_input(request);
                let opts = TriggerOptions {
                    limit_per_input: Some(request.limit()),
                    ..Default::default()
                };
                Ok(brightdata
                    .discover(&state.config.brightdata_linkedin_dataset_id, &[input], &opts)
                    .await?)
            } else {
                anyhow::bail!("no LinkedIn provider configured (APIFY_API_KEY or BRIGHT_DATA_API_KEY)")
            }
        }
        Source::Glassdoor => {
            let Some(apify) = &state.apify else {
                anyhow::bail!("APIFY_API_KEY not configured")
            };
            let input = glassdoor_actor_input(request);
            Ok(apify
                .run_actor(apify_client::GLASSDOOR_JOBS_SCRAPER, &input)
                .await?)
        }
        Source::Indeed => {
            let Some(brightdata) = &state.brightdata else {
                anyhow::bail!("BRIGHT_DATA_API_KEY not configured")
            };
            let input = indeed_discover_input(request);
            let opts = TriggerOptions {
                limit_per_input: Some(request.limit()),
                ..Default::default()
            };
            Ok(brightdata
                .discover(&state.config.brightdata_indeed_dataset_id, &[input], &opts)
                .await?)
        }
    }
}

fn linkedin_actor_input(request: &MultiFetchRequest) -> LinkedinJobsInput {
    let limit = request.limit();
    LinkedinJobsInput {
        title: request.title.trim().to_string(),
        location: request
            .location
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| "United States".to_string()),
        company_name: Vec::new(),
        company_id: Vec::new(),
        work_type: non_empty(&request.work_type),
        contract_type: non_empty(&request.contract_type),
        experience_level: non_empty(&request.experience_level),
        published_at: request
            .published_at
            .as_deref()
            .and_then(linkedin_published_at),
        rows: limit,
        max_items: limit,
        proxy: ProxySettings::residential(),
    }
}

fn glassdoor_actor_input(request: &MultiFetchRequest) -> GlassdoorJobsInput {
    let mut input = GlassdoorJobsInput::new(request.title.trim().to_string(), request.limit());
    input.from_age = request.published_at.as_deref().and_then(glassdoor_from_age);
    input.job_type = request.contract_type.as_deref().and_then(glassdoor_job_type);
    input.seniority_type = request
        .experience_level
        .as_deref()
        .and_then(glassdoor_seniority);
    // Work-type code "1" is on-site; everything else searches remote roles.
    input.remote_work_type = request.work_type.as_deref() != Some("1");
    input
}

fn linkedin_discover_input(request: &MultiFetchRequest) -> LinkedinDiscoverInput {
    LinkedinDiscoverInput {
        location: request
            .location
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| "United States".to_string()),
        keyword: request.title.trim().to_string(),
        country: "US".to_string(),
        time_range: request
            .published_at
            .as_deref()
            .map(brightdata_time_range)
            .unwrap_or_default()
            .to_string(),
        job_type: request
            .contract_type
            .as_deref()
            .and_then(linkedin_facet_job_type)
            .unwrap_or_default()
            .to_string(),
        experience_level: request
            .experience_level
            .as_deref()
            .and_then(linkedin_facet_experience)
            .unwrap_or_default()
            .to_string(),
        remote: if request.work_type.as_deref() == Some("2") {
            "Remote".to_string()
        } else {
            String::new()
        },
        company: String::new(),
        location_radius: String::new(),
    }
}

fn indeed_discover_input(request: &MultiFetchRequest) -> brightdata_client::IndeedDiscoverInput {
    brightdata_client::IndeedDiscoverInput {
        country: "US".to_string(),
        domain: "indeed.com".to_string(),
        keyword_search: request.title.trim().to_string(),
        location: request
            .location
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| "United States".to_string()),
        date_posted: if request.published_at.as_deref() == Some("r86400") {
            "Last 24 Hours".to_string()
        } else {
            String::new()
        },
        posted_by: String::new(),
        location_radius: String::new(),
    }
}

// Translation tables: generic request codes -> provider-native values.

fn glassdoor_job_type(code: &str) -> Option<String> {
    let mapped = match code {
        "F" => "fulltime",
        "P" => "parttime",
        "C" => "contract",
        "T" => "temporary",
        "I" => "internship",
        "V" => "volunteer",
        _ => return None,
    };
    Some(mapped.to_string())
}

fn glassdoor_seniority(code: &str) -> Option<String> {
    let mapped = match code {
        "all" => "all",
        "1" => "internship",
        "2" => "entrylevel",
        "3" => "midseniorlevel",
        "4" => "director",
        "5" => "executive",
        _ => return None,
    };
    Some(mapped.to_string())
}

fn glassdoor_from_age(token: &str) -> Option<String> {
    let days = match token {
        "r86400" => "1",
        "r259200" => "3",
        "r604800" => "7",
        "r1209600" => "14",
        "r2592000" => "30",
        _ => return None,
    };
    Some(days.to_string())
}

/// The LinkedIn actor only accepts 24h/week/month windows; the in-between
/// tokens round to a week.
fn linkedin_published_at(token: &str) -> Option<String> {
    match token {
        "r259200" | "r1209600" => Some("r604800".to_string()),
        other if other.starts_with('r') => Some(other.to_string()),
        _ => None,
    }
}

fn brightdata_time_range(token: &str) -> &'static str {
    match token {
        "r86400" => "Past 24 hours",
        "r259200" | "r604800" | "r1209600" => "Past week",
        "r2592000" => "Past month",
        _ => "",
    }
}

fn linkedin_facet_job_type(code: &str) -> Option<&'static str> {
    match code {
        "F" => Some("Full-time"),
        "P" => Some("Part-time"),
        "C" => Some("Contract"),
        "T" => Some("Temporary"),
        "I" => Some("Internship"),
        "V" => Some("Volunteer"),
        _ => None,
    }
}

fn linkedin_facet_experience(code: &str) -> Option<&'static str> {
    match code {
        "1" => Some("Internship"),
        "2" => Some("Entry level"),
        "3" => Some("Mid-Senior level"),
        "4" => Some("Director"),
        "5" => Some("Executive"),
        _ => None,
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
