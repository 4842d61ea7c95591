use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
///
/// Provider credentials are optional at boot: a request that needs a
/// missing credential is rejected with a 400 at request time, so one
/// deployment can serve whichever providers it has keys for.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub scrapingdog_api_key: Option<String>,
    pub apify_api_key: Option<String>,
    pub bright_data_api_key: Option<String>,
    pub google_client_email: Option<String>,
    pub google_service_key: Option<String>,
    pub brightdata_linkedin_dataset_id: String,
    pub brightdata_indeed_dataset_id: String,
    pub max_pages_per_combo: u32,
    pub max_fallback_pages: u32,
    pub poll_base_delay_secs: u64,
    pub poll_backoff_cap_secs: u64,
    pub poll_ceiling_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let config = Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            scrapingdog_api_key: env::var("SCRAPINGDOG_API_KEY").ok(),
            apify_api_key: env::var("APIFY_API_KEY").ok(),
            bright_data_api_key: env::var("BRIGHT_DATA_API_KEY").ok(),
            google_client_email: first_env(&[
                "GOOGLE_CLIENT_EMAIL",
                "GOOGLE_SERVICE_ACCOUNT_EMAIL",
            ]),
            google_service_key: first_env(&[
                "GOOGLE_SERVICE_KEY",
                "GOOGLE_SERVICE_ACCOUNT_KEY",
                "GOOGLE_PRIVATE_KEY",
                "GOOGLE_SERVICE_KEY_BASE64",
            ]),
            brightdata_linkedin_dataset_id: env::var("BRIGHTDATA_LINKEDIN_DATASET_ID")
                .unwrap_or_else(|_| brightdata_client::LINKEDIN_JOBS_DATASET.to_string()),
            brightdata_indeed_dataset_id: env::var("BRIGHTDATA_INDEED_DATASET_ID")
                .unwrap_or_else(|_| brightdata_client::INDEED_JOBS_DATASET.to_string()),
            max_pages_per_combo: parse_env("MAX_PAGES_PER_COMBO", 5)?,
            max_fallback_pages: parse_env("MAX_FALLBACK_PAGES", 8)?,
            poll_base_delay_secs: parse_env("POLL_BASE_DELAY_SECS", 2)?,
            poll_backoff_cap_secs: parse_env("POLL_BACKOFF_CAP_SECS", 30)?,
            poll_ceiling_secs: parse_env("POLL_CEILING_SECS", 300)?,
        };

        // An unbounded snapshot wait would hang requests forever on a wedged
        // collection; the ceiling must stay finite and positive.
        if config.poll_ceiling_secs == 0 {
            bail!("POLL_CEILING_SECS must be a positive number of seconds");
        }

        Ok(config)
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| env::var(name).ok())
        .filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}
