use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::Url;
use scraper::Html;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::settings::Settings;

/// Anything that can hand back a parsed results page for a search term.
pub trait PageSource {
    fn fetch(&self, search_term: &str, page: u32) -> Result<Html, FetchError>;
}

/// Blocking HTTP fetcher for the live search endpoint. One request per call,
/// no retries.
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url)
            .with_context(|| format!("Invalid base_url {:?}", settings.base_url))?;
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpFetcher { client, base_url })
    }

    /// `<base>?_nkw=<term>&_pgn=<page>`
    pub fn search_url(&self, search_term: &str, page: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("_nkw", search_term)
            .append_pair("_pgn", &page.to_string());
        url
    }
}

impl PageSource for HttpFetcher {
    fn fetch(&self, search_term: &str, page: u32) -> Result<Html, FetchError> {
        let url = self.search_url(search_term, page);
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::new(page, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Page {} returned {}, parsing body anyway", page, status);
        }

        let body = response.text().map_err(|e| FetchError::new(page, e))?;
        Ok(Html::parse_document(&body))
    }
}

// ── Tests ──
