//! Multi-provider flow: every requested source runs concurrently, dynamic
//! column schema per source, partial success reported per source.

use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::error::ApiError;
use crate::jobs::sources::{run_sources, MultiFetchRequest, SourceReport};
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct MultiFetchResponse {
    pub success: bool,
    pub per_source: Vec<SourceReport>,
}

pub async fn fetch_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<MultiFetchRequest>,
) -> Result<Json<MultiFetchResponse>, ApiError> {
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

    tracing::info!(
        sources = ?request.sources().iter().map(|s| s.name()).collect::<Vec<_>>(),
        sheet_id = %sheet_id,
        "Multi-provider fetch"
    );

    let per_source = run_sources(&state, &sheets, &request, &sheet_id).await;

    // Partial failure stays a 200: the per-source reports carry the errors.
    Ok(Json(MultiFetchResponse {
        success: true,
        per_source,
    }))
}
