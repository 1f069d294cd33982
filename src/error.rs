use thiserror::Error;

/// Failure fetching a single page. Never escapes the extraction engine;
/// callers downgrade it to an empty or partial record.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("http status {0}")]
    Status(reqwest::StatusCode),
}

/// Failure at some stage of one search page request. A failed page yields
/// zero hits; the pipeline finalizes with whatever was accumulated.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search api returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("search job did not complete within the poll ceiling")]
    PollTimeout,

    #[error("malformed search payload: {0}")]
    Decode(String),
}
