use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
    /// The remote store could not be reached. No write was applied.
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
    #[error("Remote store error: {0}")]
    Remote(#[source] BoxedError),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No API key configured. Set GEMINI_API_KEY or GOOGLE_API_KEY.")]
    MissingApiKey,
    #[error("Invalid language: {0}")]
    InvalidLanguage(#[source] scholar_sdk::ResearchError),
}

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;
