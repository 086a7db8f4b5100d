//! One full run for one rankings page: year label, run directory,
//! discovery, download. Runs are independent; the orchestrator calls this
//! once per year and logs any failure without touching the other run.

use std::path::{Path, PathBuf};

use log::info;

use crate::discover::discover_overview_url;
use crate::download::{download_all, Filter};
use crate::error::Result;
use crate::fetch::Fetch;
use crate::output::{create_output_dir, year_label_from_url};

/// Scrape one rankings page into a fresh run directory under `base_dir`,
/// returning that directory. `year_label` overrides the label normally
/// derived from the page URL.
pub fn run_year<F: Fetch>(
    fetch: &F,
    page_url: &str,
    base_dir: &Path,
    year_label: Option<&str>,
    filter: &Filter,
) -> Result<PathBuf> {
    let year_label = match year_label {
        Some(label) => label.to_string(),
        None => year_label_from_url(page_url)?,
    };

    let output_dir = create_output_dir(base_dir, &year_label)?;
    let overview_url = discover_overview_url(fetch, page_url)?;
    let report = download_all(fetch, &overview_url, &output_dir, &year_label, filter)?;

    info!(
        "Data for {} saved in {} ({} subjects saved, {} skipped)",
        year_label,
        output_dir.display(),
        report.found.len(),
        report.skipped.len()
    );
    Ok(output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use crate::testutil::FakeFetch;

    const PAGE: &str =
        "https://www.theguardian.com/education/ng-interactive/2024/sep/07/the-rankings";
    const FEED: &str =
        "https://interactive.guim.co.uk/atoms/labs/2024/08/university-guide/v/3/assets/data/overview.json";
    const SUBJECT: &str =
        "https://interactive.guim.co.uk/atoms/labs/2024/08/university-guide/v/3/assets/data/s1.json";

    #[test]
    fn full_run_writes_all_four_files() {
        let html = format!(r#"<html><body>window.feed = "{FEED}";</body></html>"#);
        let overview = r#"{
            "subjects": [{"id": "s1", "title": "Physics"}],
            "institutions": [{"rank": 1, "name": "X"}]
        }"#;
        let subject = r#"{"institutions": [{"rank": 1, "name": "Oxford"}]}"#;
        let fetch = FakeFetch::new()
            .with(PAGE, &html)
            .with(FEED, overview)
            .with(SUBJECT, subject);
        let base = tempfile::tempdir().unwrap();

        let dir = run_year(&fetch, PAGE, base.path(), None, &Filter::All).unwrap();

        let name = dir.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("gug_2025.at "), "unexpected dir {name}");

        let count = |file: &str| {
            let mut reader = csv::Reader::from_path(dir.join(file)).unwrap();
            reader.records().filter(|r| r.is_ok()).count()
        };
        assert_eq!(count("subjects.csv"), 1);
        assert_eq!(count("Overall.csv"), 1);
        assert_eq!(count("Physics_2025_all.csv"), 1);

        let mut summary = csv::Reader::from_path(dir.join("subjects_summary_2025_all.csv")).unwrap();
        assert_eq!(
            summary.headers().unwrap().iter().collect::<Vec<_>>(),
            vec!["Subjects with 'all'", "Subjects without 'all'"]
        );
        let rows: Vec<_> = summary.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "Physics");
        assert_eq!(&rows[0][1], "");
    }

    #[test]
    fn explicit_year_label_overrides_the_url_year() {
        let html = format!("see {FEED}");
        let fetch = FakeFetch::new()
            .with(PAGE, &html)
            .with(FEED, r#"{"subjects": []}"#);
        let base = tempfile::tempdir().unwrap();

        let dir = run_year(&fetch, PAGE, base.path(), Some("1999"), &Filter::All).unwrap();
        let name = dir.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("gug_1999.at "), "unexpected dir {name}");
    }

    #[test]
    fn malformed_url_fails_before_any_fetch() {
        let fetch = FakeFetch::new();
        let base = tempfile::tempdir().unwrap();

        let err = run_year(
            &fetch,
            "https://example.com/no-year-here",
            base.path(),
            None,
            &Filter::All,
        )
        .unwrap_err();
        assert!(matches!(err, ScrapeError::NoYearInUrl(_)), "got {err}");
        assert_eq!(fetch.call_count(), 0);
    }
}
