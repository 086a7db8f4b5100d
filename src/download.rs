//! Dataset Downloader: materializes the overview feed and every kept
//! per-subject feed as CSV files inside a run directory.
//!
//! Feed rows are heterogeneous JSON objects; the filter addresses the
//! second column positionally, so document key order is preserved end to
//! end (serde_json's `preserve_order` feature) and CSV column order is the
//! first-seen key order across rows.

use std::path::Path;

use log::{info, warn};
use serde_json::{Map, Value};

use crate::error::{Result, ScrapeError};
use crate::fetch::Fetch;
use crate::output::sanitize_filename;

/// Institution filter, collected once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Save every subject feed.
    All,
    /// Save a subject feed only when some row's second column equals this
    /// (lowercased, trimmed) institution name.
    Institution(String),
}

impl Filter {
    /// Blank input or `all` (case-insensitive) is the save-everything
    /// sentinel; anything else is an exact institution-name criterion.
    pub fn parse(input: &str) -> Self {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() || needle == "all" {
            Filter::All
        } else {
            Filter::Institution(needle)
        }
    }

    /// Suffix used in output filenames and summary headers.
    pub fn suffix(&self) -> &str {
        match self {
            Filter::All => "all",
            Filter::Institution(needle) => needle,
        }
    }
}

/// Kept and skipped subject titles, in feed order.
#[derive(Debug, Default)]
pub struct DownloadReport {
    pub found: Vec<String>,
    pub skipped: Vec<String>,
}

enum SubjectOutcome {
    Saved,
    FilteredOut,
    NotFound,
}

/// Fetch the overview feed and every subject feed, writing `subjects.csv`,
/// `Overall.csv` (when present), one CSV per kept subject and the
/// kept/skipped summary into `output_dir`.
///
/// Only the overview fetch and its `subjects` check are fatal; a subject
/// whose feed cannot be fetched, decoded or written is recorded in the
/// skipped column and the loop moves on.
pub fn download_all<F: Fetch>(
    fetch: &F,
    overview_url: &str,
    output_dir: &Path,
    year_label: &str,
    filter: &Filter,
) -> Result<DownloadReport> {
    let overview = fetch.get_json(overview_url)?;
    let subjects = object_rows(&overview, "subjects").ok_or_else(|| ScrapeError::MissingKey {
        key: "subjects",
        url: overview_url.to_string(),
    })?;

    write_rows_csv(&output_dir.join("subjects.csv"), &subjects)?;
    info!("Saved subjects.csv ({} subjects)", subjects.len());

    if let Some(institutions) = object_rows(&overview, "institutions") {
        write_rows_csv(&output_dir.join("Overall.csv"), &institutions)?;
        info!("Saved Overall.csv");
    }

    // Subject feeds live next to the overview feed, one <id>.json each.
    let base_prefix = overview_url
        .rsplit_once('/')
        .map(|(base, _)| base)
        .unwrap_or(overview_url);

    let mut report = DownloadReport::default();
    for subject in &subjects {
        let title = cell_text(subject.get("title")).trim().to_string();
        let outcome = process_subject(fetch, base_prefix, subject, &title, output_dir, year_label, filter);
        match outcome {
            SubjectOutcome::Saved => report.found.push(title),
            SubjectOutcome::FilteredOut | SubjectOutcome::NotFound => report.skipped.push(title),
        }
    }

    let summary_name = format!("subjects_summary_{}_{}.csv", year_label, filter.suffix());
    write_summary(
        &output_dir.join(&summary_name),
        filter.suffix(),
        &report.found,
        &report.skipped,
    )?;
    info!("Saved {summary_name}");

    if !report.found.is_empty() {
        info!("Subjects saved:");
        for title in &report.found {
            info!(" - {title}");
        }
    }
    if !report.skipped.is_empty() {
        info!("Subjects skipped:");
        for title in &report.skipped {
            info!(" - {title}");
        }
    }

    Ok(report)
}

fn process_subject<F: Fetch>(
    fetch: &F,
    base_prefix: &str,
    subject: &Map<String, Value>,
    title: &str,
    output_dir: &Path,
    year_label: &str,
    filter: &Filter,
) -> SubjectOutcome {
    let id = cell_text(subject.get("id")).trim().to_string();
    if id.is_empty() {
        warn!("Subject '{title}' has no usable id, recording as not found");
        return SubjectOutcome::NotFound;
    }

    let subject_url = format!("{base_prefix}/{id}.json");
    info!("Downloading JSON for subject '{title}' from {subject_url}");

    let feed = match fetch.get_json(&subject_url) {
        Ok(feed) => feed,
        Err(e) => {
            warn!("Error fetching subject JSON for '{title}': {e}");
            return SubjectOutcome::NotFound;
        }
    };

    let rows = match object_rows(&feed, "institutions") {
        Some(rows) => rows,
        None => {
            warn!("No 'institutions' key in JSON for '{title}' ({subject_url})");
            return SubjectOutcome::NotFound;
        }
    };

    let columns = column_order(&rows);
    if !feed_matches(filter, &rows, &columns) {
        info!(
            "Skipping save for '{}': '{}' not found in second column",
            title,
            filter.suffix()
        );
        return SubjectOutcome::FilteredOut;
    }

    let filename = format!(
        "{}_{}_{}.csv",
        sanitize_filename(title),
        year_label,
        filter.suffix()
    );
    if let Err(e) = write_rows_csv(&output_dir.join(&filename), &rows) {
        warn!("Error saving {filename}: {e}");
        return SubjectOutcome::FilteredOut;
    }
    info!("Saved {filename}");
    SubjectOutcome::Saved
}

/// Filtering decides whether a feed is saved, never which of its rows:
/// `All` keeps everything, otherwise some row's second-column value must
/// equal the needle case-insensitively after trimming. Feeds with fewer
/// than two columns never match.
fn feed_matches(filter: &Filter, rows: &[&Map<String, Value>], columns: &[String]) -> bool {
    match filter {
        Filter::All => true,
        Filter::Institution(needle) => {
            let Some(second) = columns.get(1) else {
                return false;
            };
            rows.iter().any(|row| {
                cell_text(row.get(second)).trim().to_lowercase() == *needle
            })
        }
    }
}

/// Two-column kept/skipped summary; the shorter list is padded with empty
/// cells so both columns run the same length.
pub fn write_summary(
    path: &Path,
    suffix: &str,
    found: &[String],
    skipped: &[String],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record([
        format!("Subjects with '{suffix}'"),
        format!("Subjects without '{suffix}'"),
    ])?;
    for i in 0..found.len().max(skipped.len()) {
        writer.write_record([
            found.get(i).map(String::as_str).unwrap_or(""),
            skipped.get(i).map(String::as_str).unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// The object rows under `key`, or None when the key is absent or not a
/// list. Non-object entries are dropped.
fn object_rows<'a>(doc: &'a Value, key: &str) -> Option<Vec<&'a Map<String, Value>>> {
    let rows = doc.get(key)?.as_array()?;
    Some(rows.iter().filter_map(Value::as_object).collect())
}

/// First-seen key order across all rows.
fn column_order(rows: &[&Map<String, Value>]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// CSV cell text for a JSON value: strings as-is, null and absent as
/// empty, everything else in its compact JSON form.
fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn write_rows_csv(path: &Path, rows: &[&Map<String, Value>]) -> Result<()> {
    let columns = column_order(rows);
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;
    for row in rows {
        let record: Vec<String> = columns.iter().map(|c| cell_text(row.get(c))).collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
