use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use regex::Regex;

use crate::error::{Result, ScrapeError};

/// Year label for a rankings page URL: the first 4-digit number between
/// path separators, plus one. The published guide year runs one ahead of
/// the article's dateline year.
pub fn year_label_from_url(url: &str) -> Result<String> {
    let re = Regex::new(r"/(\d{4})/").expect("valid regex");
    let caps = re
        .captures(url)
        .ok_or_else(|| ScrapeError::NoYearInUrl(url.to_string()))?;
    let year: u32 = caps[1]
        .parse()
        .map_err(|_| ScrapeError::NoYearInUrl(url.to_string()))?;
    Ok((year + 1).to_string())
}

/// Create the run directory `gug_<year>.at <YYYY-Mon-DD>_<HHMM>` under
/// `base_dir`. The minute stamp keeps reruns apart; creation is idempotent.
pub fn create_output_dir(base_dir: &Path, year_label: &str) -> Result<PathBuf> {
    let now = Local::now();
    let name = format!(
        "gug_{}.at {}_{}",
        year_label,
        now.format("%Y-%b-%d"),
        now.format("%H%M")
    );
    let dir = base_dir.join(name);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Replace characters that filesystems reject in file names with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}
