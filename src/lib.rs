//! Search-results listing scraper: fetch result pages, extract listing
//! fields, normalize prices, shipping and locations.
//!
//! The pipeline is `scrape` → `clean`; persistence and display live in
//! `export`, `db` and the binary.

pub mod cleaner;
pub mod db;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod parser;
pub mod record;
pub mod scrape;
pub mod settings;

pub use cleaner::{clean, clean_with_counts, NullCounts};
pub use error::{FetchError, InputError};
pub use fetcher::{HttpFetcher, PageSource};
pub use record::{CleanedRecord, RawRecord};
pub use scrape::{scrape, ScrapeOptions};
pub use settings::Settings;
