use std::thread;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use tracing::{info, warn};

use crate::error::{FetchError, InputError};
use crate::fetcher::PageSource;
use crate::parser;
use crate::record::RawRecord;
use crate::settings::Settings;

/// Page-loop knobs.
#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    /// Wait between consecutive page requests.
    pub pacing: Duration,
    /// Extra attempts for a failed page before it is skipped.
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        ScrapeOptions {
            pacing: Duration::from_secs(4),
            max_retries: 0,
            retry_backoff: Duration::from_millis(2000),
        }
    }
}

impl ScrapeOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        ScrapeOptions {
            pacing: settings.pacing(),
            max_retries: settings.max_retries,
            retry_backoff: settings.retry_backoff(),
        }
    }
}

/// Fetch pages 1..=num_pages in order and collect every qualifying listing.
///
/// A page that cannot be retrieved is logged and contributes nothing; the run
/// carries on. Only bad input is reported to the caller.
pub fn scrape<S: PageSource + ?Sized>(
    source: &S,
    search_term: &str,
    num_pages: u32,
    opts: &ScrapeOptions,
) -> Result<Vec<RawRecord>, InputError> {
    let search_term = search_term.trim();
    if search_term.is_empty() {
        return Err(InputError::EmptySearchTerm);
    }
    if num_pages == 0 {
        return Err(InputError::NoPages);
    }

    let pb = ProgressBar::new(num_pages as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40} page {pos}/{len} ({msg})")
    {
        pb.set_style(style.progress_chars("=> "));
    }

    let mut results = Vec::new();
    let mut ok = 0usize;
    let mut errors = 0usize;

    for page in 1..=num_pages {
        match fetch_with_retry(source, search_term, page, opts) {
            Ok(doc) => {
                let extracted = parser::process_page(&doc);
                info!(
                    "Page {} scraped successfully ({} items, {} listings)",
                    page,
                    extracted.items,
                    extracted.records.len()
                );
                results.extend(extracted.records);
                ok += 1;
            }
            Err(e) => {
                warn!("{}", e);
                errors += 1;
            }
        }
        pb.set_message(format!("{} listings", results.len()));
        pb.inc(1);

        if page < num_pages && !opts.pacing.is_zero() {
            thread::sleep(opts.pacing);
        }
    }

    pb.finish_and_clear();
    info!(
        "Scraped {} pages ({} ok, {} errors), {} listings",
        num_pages,
        ok,
        errors,
        results.len()
    );

    Ok(results)
}

fn fetch_with_retry<S: PageSource + ?Sized>(
    source: &S,
    search_term: &str,
    page: u32,
    opts: &ScrapeOptions,
) -> Result<Html, FetchError> {
    let mut attempt = 0;
    loop {
        match source.fetch(search_term, page) {
            Ok(doc) => return Ok(doc),
            Err(e) if attempt < opts.max_retries => {
                let backoff = opts
                    .retry_backoff
                    .saturating_mul(2u32.saturating_pow(attempt));
                warn!(
                    "{} (attempt {}/{}), backing off {:.1}s",
                    e,
                    attempt + 1,
                    opts.max_retries + 1,
                    backoff.as_secs_f64()
                );
                if !backoff.is_zero() {
                    thread::sleep(backoff);
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

// ── Tests ──
