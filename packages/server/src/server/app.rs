//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use apify_client::ApifyClient;
use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use brightdata_client::{BrightDataClient, PollConfig};
use scrapingdog_client::ScrapingDogClient;
use sheets_client::{ServiceAccountKey, SheetsClient};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::server::routes::{fetch_handler, fetch_jobs_handler, health_handler};

/// Shared application state
///
/// A client is `None` when its credential is absent from the environment;
/// handlers turn that into a 400 before any upstream call.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub scrapingdog: Option<Arc<ScrapingDogClient>>,
    pub apify: Option<Arc<ApifyClient>>,
    pub brightdata: Option<Arc<BrightDataClient>>,
    pub sheets: Option<Arc<SheetsClient>>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let scrapingdog = config
            .scrapingdog_api_key
            .clone()
            .map(|key| Arc::new(ScrapingDogClient::new(key)));

        let apify = config.apify_api_key.clone().map(|token| {
            Arc::new(
                ApifyClient::new(token)
                    .with_run_deadline(Duration::from_secs(config.poll_ceiling_secs)),
            )
        });

        let brightdata = config.bright_data_api_key.clone().map(|token| {
            Arc::new(BrightDataClient::new(token).with_poll_config(PollConfig {
                base_delay: Duration::from_secs(config.poll_base_delay_secs),
                backoff_cap: Duration::from_secs(config.poll_backoff_cap_secs),
                ceiling: Duration::from_secs(config.poll_ceiling_secs),
            }))
        });

        let sheets = match (&config.google_client_email, &config.google_service_key) {
            (Some(email), Some(raw_key)) => match ServiceAccountKey::new(email, raw_key) {
                Ok(key) => Some(Arc::new(SheetsClient::new(key))),
                Err(err) => {
                    tracing::warn!(error = %err, "Google service-account key rejected; sheet writes disabled");
                    None
                }
            },
            _ => None,
        };

        Self {
            config: Arc::new(config),
            scrapingdog,
            apify,
            brightdata,
            sheets,
        }
    }
}

/// Build the Axum application router
pub fn build_app(config: Config) -> Router {
    let state = AppState::from_config(config);

    // CORS: the relay is called from browser frontends on other origins.
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/api/fetch-jobs", post(fetch_jobs_handler))
        .route("/api/fetch", post(fetch_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
