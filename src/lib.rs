pub mod discover;
pub mod download;
pub mod error;
pub mod fetch;
pub mod logger;
pub mod output;
pub mod pipeline;

#[cfg(test)]
mod testutil;

// Exporting types for convenience
pub use download::{DownloadReport, Filter};
pub use error::{Result, ScrapeError};
pub use fetch::{Fetch, HttpClient};
