use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A results page could not be retrieved. Recovered by the page loop, never
/// surfaced to callers of `scrape`.
#[derive(Debug, Error)]
#[error("failed to retrieve page {page}: {source}")]
pub struct FetchError {
    pub page: u32,
    #[source]
    pub source: BoxError,
}

impl FetchError {
    pub fn new(page: u32, source: impl Into<BoxError>) -> Self {
        FetchError {
            page,
            source: source.into(),
        }
    }
}

/// Rejected before any request is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("search term must not be empty")]
    EmptySearchTerm,
    #[error("number of pages must be at least 1")]
    NoPages,
}
