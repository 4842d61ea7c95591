use thiserror::Error;

pub type Result<T> = std::result::Result<T, SheetsError>;

#[derive(Debug, Error)]
pub enum SheetsError {
    /// Non-success HTTP status from the Sheets or OAuth API, with the body.
    #[error("Google Sheets API {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service-account key is absent or not a usable private key.
    #[error("service-account credentials invalid: {0}")]
    Credentials(String),

    #[error("JWT signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}
