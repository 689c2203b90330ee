//! Error types for the TIV valuation engine

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the valuation pipeline
///
/// The first four variants are the run-level taxonomy: validation failures
/// abort a run before any network call, source failures are absorbed by
/// fallback substitution, synthesis failures fail the run, and persistence
/// failures are logged without failing the run. The remaining variants are
/// carried by the provider clients and collapse into the taxonomy at the
/// orchestrator boundary.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Advice synthesis failed: {0}")]
    Synthesis(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}
