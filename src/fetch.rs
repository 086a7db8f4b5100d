//! Blocking HTTP layer: one client, a fixed browser User-Agent, and a hard
//! 25-second timeout on every request.

use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::error::{Result, ScrapeError};

const TIMEOUT: Duration = Duration::from_secs(25);

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Fetching seam between the pipeline and the network. The discovery
/// engine and downloader only see this trait, so tests drive them with an
/// in-memory fake.
pub trait Fetch {
    fn get_text(&self, url: &str) -> Result<String>;
    fn get_json(&self, url: &str) -> Result<Value>;
}

pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));

        let client = Client::builder()
            .timeout(TIMEOUT)
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        HttpClient { client }
    }

    fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {url}");
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(resp)
    }
}

impl Fetch for HttpClient {
    fn get_text(&self, url: &str) -> Result<String> {
        Ok(self.get(url)?.text()?)
    }

    fn get_json(&self, url: &str) -> Result<Value> {
        Ok(self.get(url)?.json()?)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
