use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApifyError>;

#[derive(Debug, Error)]
pub enum ApifyError {
    /// Non-success HTTP status from the Apify API, with the upstream body.
    #[error("Apify API {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The actor run reached a terminal state other than SUCCEEDED.
    #[error("actor run ended with status {0}")]
    RunFailed(String),

    /// The run did not finish before the configured deadline.
    #[error("actor run {run_id} still {status} after {waited_secs}s")]
    RunTimeout {
        run_id: String,
        status: String,
        waited_secs: u64,
    },
}
