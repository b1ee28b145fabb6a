use thiserror::Error;

/// Message surfaced when the research service cannot produce an answer.
pub const RESEARCH_FAILED_MESSAGE: &str =
    "Failed to perform research. Please check your connection and try again.";

#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The request to the provider failed or the parsing of the response
    /// failed.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The request returns a non-OK status code
    #[error("Status error: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
    /// The response from the provider was unexpected. (e.g. no candidate
    /// returned by Gemini)
    #[error("Invariant from {0}: {1}")]
    Invariant(&'static str, String),
    /// The service could not answer. The message is meant for the user; the
    /// underlying cause has already been logged.
    #[error("{0}")]
    Unavailable(String),
}

impl ResearchError {
    #[must_use]
    pub fn unavailable() -> Self {
        Self::Unavailable(RESEARCH_FAILED_MESSAGE.to_string())
    }
}

pub type ResearchResult<T> = Result<T, ResearchError>;
