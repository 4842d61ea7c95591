use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    providers: ProviderHealth,
}

/// Which upstream integrations this deployment has credentials for.
#[derive(Serialize)]
pub struct ProviderHealth {
    scrapingdog: bool,
    apify: bool,
    brightdata: bool,
    sheets: bool,
}

/// Health check endpoint
///
/// The relay holds no connections of its own between requests, so liveness
/// plus the configured-provider map is the whole story.
pub async fn health_handler(Extension(state): Extension<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        providers: ProviderHealth {
            scrapingdog: state.scrapingdog.is_some(),
            apify: state.apify.is_some(),
            brightdata: state.brightdata.is_some(),
            sheets: state.sheets.is_some(),
        },
    })
}
