//! Locates the machine-readable overview feed behind a rankings page.
//!
//! The site has published at least two markup generations: the feed URL is
//! sometimes embedded verbatim in the page HTML, sometimes only reachable
//! through a companion `app.js` bundle, and sometimes only the versioned
//! base path is visible. The strategies below run cheapest-first over a
//! single page fetch.

use log::{info, warn};
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::fetch::Fetch;

/// Compiled URL patterns for the interactive feed host. Each `find_*`
/// method is a pure scan over already-fetched text.
pub struct UrlPatterns {
    overview_json: Regex,
    app_js: Regex,
    base_path: Regex,
}

impl UrlPatterns {
    pub fn new() -> Self {
        UrlPatterns {
            overview_json: Regex::new(
                r"https://interactive\.guim\.co\.uk/atoms/labs/\d{4}/\d{2}/university-guide/(?:overview/)?v/\d+/assets/data/overview\.json",
            )
            .expect("valid regex"),
            app_js: Regex::new(
                r"https://interactive\.guim\.co\.uk/atoms/labs/\d{4}/\d{2}/university-guide/(?:overview/)?v/\d+/app\.js",
            )
            .expect("valid regex"),
            base_path: Regex::new(
                r"https://interactive\.guim\.co\.uk/atoms/labs/\d{4}/\d{2}/university-guide/(?:overview/)?v/\d+/",
            )
            .expect("valid regex"),
        }
    }

    /// First overview-feed URL appearing anywhere in `text`.
    pub fn find_overview_url(&self, text: &str) -> Option<String> {
        self.overview_json.find(text).map(|m| m.as_str().to_string())
    }

    /// First `app.js` URL referenced by the page: `<script src>` attributes
    /// are checked before inline script bodies, with protocol-relative and
    /// root-relative sources resolved against the page's origin.
    pub fn find_app_js_url(&self, html: &str, page_url: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let scripts = Selector::parse("script").expect("valid selector");

        for element in document.select(&scripts) {
            if let Some(src) = element.value().attr("src") {
                let resolved = resolve_script_src(src, page_url);
                if let Some(m) = self.app_js.find(&resolved) {
                    return Some(m.as_str().to_string());
                }
            }
        }

        for element in document.select(&scripts) {
            if element.value().attr("src").is_some() {
                continue;
            }
            let body: String = element.text().collect();
            if let Some(m) = self.app_js.find(&body) {
                return Some(m.as_str().to_string());
            }
        }

        None
    }

    /// First bare `.../v/<digits>/` base path appearing in `text`.
    pub fn find_base_path(&self, text: &str) -> Option<String> {
        self.base_path.find(text).map(|m| m.as_str().to_string())
    }
}

fn resolve_script_src(src: &str, page_url: &str) -> String {
    if src.starts_with("//") {
        return format!("https:{src}");
    }
    if src.starts_with('/') {
        if let Ok(base) = Url::parse(page_url) {
            if let Ok(resolved) = base.join(src) {
                return resolved.to_string();
            }
        }
    }
    src.to_string()
}

/// Resolve the overview feed URL for a rankings page.
///
/// Ordered fallback chain, first success wins:
/// 1. the feed URL sits verbatim in the page HTML (no further fetches);
/// 2. the page references a companion `app.js`; fetch it and take the feed
///    URL from the script text — a fetched script with no match fails the
///    discovery outright;
/// 3. only a bare base path is visible; construct the candidate feed URL
///    under it and keep it if a validation fetch succeeds.
pub fn discover_overview_url<F: Fetch>(fetch: &F, page_url: &str) -> Result<String> {
    info!("Discovering overview feed from {page_url}");
    let html = fetch.get_text(page_url)?;
    let patterns = UrlPatterns::new();

    if let Some(found) = patterns.find_overview_url(&html) {
        info!("Overview feed URL found directly in page HTML");
        return Ok(found);
    }

    info!("No feed URL in the HTML, looking for app.js");
    if let Some(app_js_url) = patterns.find_app_js_url(&html, page_url) {
        info!("Fetching {app_js_url}");
        let script = fetch.get_text(&app_js_url)?;
        return patterns.find_overview_url(&script).ok_or_else(|| {
            ScrapeError::Discovery(format!("no overview feed URL in {app_js_url}"))
        });
    }

    info!("No app.js reference, trying to construct from a base path");
    if let Some(base) = patterns.find_base_path(&html) {
        let candidate = format!("{base}assets/data/overview.json");
        match fetch.get_text(&candidate) {
            Ok(_) => {
                info!("Constructed overview feed URL validated");
                return Ok(candidate);
            }
            Err(e) => warn!("Constructed candidate {candidate} did not validate: {e}"),
        }
    }

    Err(ScrapeError::Discovery(
        "could not locate overview feed".to_string(),
    ))
}
