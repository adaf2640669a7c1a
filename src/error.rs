use thiserror::Error;

/// Fatal pipeline failures. Anything here aborts the run before (or instead
/// of) writing; per-cell parse failures are plain `None` values and never
/// reach this type.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("fetch returned status {status}")]
    FetchStatus { status: reqwest::StatusCode },

    #[error("table extraction failed: {0}")]
    Extraction(String),

    #[error("warehouse append failed: {0}")]
    Write(#[from] sqlx::Error),
}
