//! Single-provider flow: ScrapingDog LinkedIn search with the fixed column
//! schema, paged across filter combos until the requested total is met.

use axum::{extract::Extension, Json};
use serde::Serialize;
use sheets_client::WriteOptions;

use crate::error::ApiError;
use crate::jobs::dedupe::{FilterOptions, SessionFilter};
use crate::jobs::normalize::JobRow;
use crate::jobs::paging::{run_search, SearchPlan};
use crate::jobs::provider::ScrapingDogProvider;
use crate::jobs::query::{ComboSummary, FetchJobsRequest};
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct FetchJobsResponse {
    pub success: bool,
    #[serde(rename = "rowCount")]
    pub row_count: usize,
    #[serde(rename = "requestsMade")]
    pub requests_made: u32,
    pub combos: Vec<ComboSummary>,
    pub jobs: Vec<JobRow>,
}

pub async fn fetch_jobs_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<FetchJobsRequest>,
) -> Result<Json<FetchJobsResponse>, ApiError> {
    // Config preconditions first; no provider call happens on failure.
    let scrapingdog = state
        .scrapingdog
        .clone()
        .ok_or_else(|| ApiError::Config("API key missing".to_string()))?;
    let sheets = state
        .sheets
        .clone()
        .ok_or_else(|| ApiError::Config("Google Sheets credentials missing".to_string()))?;
    let sheet_id = request
        .sheet_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::Config("sheet_id is required".to_string()))?
        .to_string();

    let combos = request.combos();
    let plan = SearchPlan {
        target_total: request.target_total(),
        combos: combos.clone(),
        max_pages_per_combo: state.config.max_pages_per_combo,
        max_fallback_pages: state.config.max_fallback_pages,
    };
    tracing::info!(
        total = plan.target_total,
        chunk = request.chunk_size(),
        combos = plan.combos.len(),
        sheet_id = %sheet_id,
        sheet_name = %request.sheet_name,
        "Fetching jobs"
    );

    let provider = ScrapingDogProvider::new(scrapingdog, &request);
    let mut filter = SessionFilter::new(FilterOptions::for_sort_token(request.sort_by.as_deref()));
    let outcome = run_search(&provider, &plan, &mut filter)
        .await
        .map_err(ApiError::Provider)?;

    if outcome.rows.is_empty() {
        tracing::info!("No rows to append");
    } else {
        let records: Vec<_> = outcome.rows.iter().map(JobRow::to_sheet_record).collect();
        let appended = sheets
            .append_records(
                &sheet_id,
                &request.sheet_name,
                &records,
                JobRow::HEADERS,
                &WriteOptions::default(),
            )
            .await?;
        tracing::info!(appended, sheet_id = %sheet_id, "Appended rows to sheet");
    }

    Ok(Json(FetchJobsResponse {
        success: true,
        row_count: outcome.rows.len(),
        requests_made: outcome.requests_made,
        combos: combos.iter().map(|combo| combo.summary()).collect(),
        jobs: outcome.rows,
    }))
}
