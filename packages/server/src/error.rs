use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Request-level error taxonomy for the HTTP surface.
///
/// Config problems are the caller's to fix (missing key, missing sheet id)
/// and map to 400 before any provider call is made; everything else is a
/// 500. The fault-tolerant multi-provider flow captures provider and sheet
/// errors per source instead of raising these.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Provider(#[source] anyhow::Error),

    #[error("spreadsheet write failed: {0}")]
    Sheet(#[from] sheets_client::SheetsError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Config(_) => StatusCode::BAD_REQUEST,
            ApiError::Provider(_) | ApiError::Sheet(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Provider(err)
    }
}
