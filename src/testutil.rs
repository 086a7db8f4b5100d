//! Test doubles shared across the crate's unit tests.

use std::cell::RefCell;
use std::collections::HashMap;

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{Result, ScrapeError};
use crate::fetch::Fetch;

/// In-memory stand-in for the HTTP client: serves canned bodies and records
/// every requested URL. Unregistered URLs come back as a 404 status error.
pub struct FakeFetch {
    bodies: HashMap<String, String>,
    calls: RefCell<Vec<String>>,
}

impl FakeFetch {
    pub fn new() -> Self {
        FakeFetch {
            bodies: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn lookup(&self, url: &str) -> Result<String> {
        self.calls.borrow_mut().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::Status {
                url: url.to_string(),
                status: StatusCode::NOT_FOUND,
            })
    }
}

impl Fetch for FakeFetch {
    fn get_text(&self, url: &str) -> Result<String> {
        self.lookup(url)
    }

    fn get_json(&self, url: &str) -> Result<Value> {
        let body = self.lookup(url)?;
        Ok(serde_json::from_str(&body)?)
    }
}
