use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapingDogError>;

#[derive(Debug, Error)]
pub enum ScrapingDogError {
    /// Non-success HTTP status from the ScrapingDog API, with the upstream body.
    #[error("ScrapingDog API {status}: {message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}
