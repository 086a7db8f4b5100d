use reqwest::StatusCode;

/// Everything that can go wrong in a run. Discovery and overview-feed
/// variants abort the run for that page; per-subject failures are caught
/// by the downloader and downgraded to a summary classification.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: StatusCode },
    #[error("discovery failed: {0}")]
    Discovery(String),
    #[error("no '{key}' key in JSON from {url}")]
    MissingKey { key: &'static str, url: String },
    #[error("no 4-digit year found in URL: {0}")]
    NoYearInUrl(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
