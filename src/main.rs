use std::io::{self, Write};
use std::path::PathBuf;

use log::{error, info};

use gug_scraper::pipeline::run_year;
use gug_scraper::{logger, Filter, HttpClient};

const URL_PROMPTS: [&str; 2] = [
    "\nEnter the first Guardian university rankings page URL: \ne.g. \nhttps://www.theguardian.com/education/ng-interactive/2024/sep/07/the-guardian-university-guide-2025-the-rankings \nPaste URL and hit enter:",
    "\nEnter the second Guardian university rankings page URL: \ne.g. \nhttps://www.theguardian.com/education/ng-interactive/2023/sep/09/the-guardian-university-guide-2024-the-rankings \nPaste URL and hit enter:",
];

const FILTER_PROMPT: &str = "\nEnter the institution name to search for in subject tables. It will only save a subject if the name appears.\nThe institution name must match how The Guardian defines it!\nOR leave blank to save everything:";

fn prompt(text: &str) -> io::Result<String> {
    println!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn main() -> io::Result<()> {
    logger::init();
    info!("Starting Guardian University Guide scraper...");

    let base_dir = prompt("Enter the folder where output should be saved:")?;
    if base_dir.is_empty() {
        println!("No folder given, exiting.");
        return Ok(());
    }
    let base_dir = PathBuf::from(base_dir);

    let client = HttpClient::new();

    // Two independent runs, current year then previous year. A failed run
    // is logged and does not stop the other one.
    for url_prompt in URL_PROMPTS {
        let page_url = prompt(url_prompt)?;
        if page_url.is_empty() {
            info!("No URL given, skipping this run.");
            continue;
        }

        let filter = Filter::parse(&prompt(FILTER_PROMPT)?);

        match run_year(&client, &page_url, &base_dir, None, &filter) {
            Ok(dir) => info!("Run finished, output in {}", dir.display()),
            Err(e) => error!("Run for {page_url} failed: {e}"),
        }
    }

    Ok(())
}
