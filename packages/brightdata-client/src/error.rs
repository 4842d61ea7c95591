use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrightDataError>;

#[derive(Debug, Error)]
pub enum BrightDataError {
    /// Non-success HTTP status from the Bright Data API, with the upstream body.
    #[error("Bright Data API {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The snapshot never became ready within the poll ceiling.
    #[error("snapshot {snapshot_id} not ready after {waited:?}")]
    Timeout {
        snapshot_id: String,
        waited: Duration,
    },

    /// The snapshot endpoint answered with a body the client cannot interpret.
    #[error("unexpected snapshot payload: {0}")]
    Payload(String),
}
