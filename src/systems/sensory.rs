// src/systems/sensory.rs
// THE PAGE FETCHER
// One blocking GET with a browser User-Agent, then the <title> out of the HTML.
// No retries. Call it from the blocking pool.

use scraper::{Html, Selector};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::links::validate_url;
use crate::models::domain_of;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PageInfo {
    pub url: String,
    pub title: String,
    pub domain: String,
}

pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<PageInfo, FetchError>;
}

pub struct HttpPageFetcher {
    timeout: Duration,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl PageFetcher for HttpPageFetcher {
    fn fetch(&self, url: &str) -> Result<PageInfo, FetchError> {
        if !validate_url(url) {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }
        info!("👁️ SENSORY: Fetching {}", url);

        let client = reqwest::blocking::Client::new();
        let resp = client
            .get(url)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .timeout(self.timeout)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if let Some(err) = status_error(resp.status().as_u16()) {
            warn!("⚠️ SENSORY: {} failed: {}", url, err);
            return Err(err);
        }

        let body = resp.text().map_err(|e| FetchError::Network(e.to_string()))?;
        let title = parse_title(&body).ok_or(FetchError::Parsing)?;

        Ok(PageInfo {
            url: url.to_string(),
            title,
            domain: domain_of(url),
        })
    }
}

/// 403 and 429 mean the site refused us; any other non-2xx is a plain status error.
fn status_error(status: u16) -> Option<FetchError> {
    match status {
        403 | 429 => Some(FetchError::Access(status)),
        s if !(200..300).contains(&s) => Some(FetchError::Status(s)),
        _ => None,
    }
}

/// Whitespace-collapsed text of the first non-empty <title>.
pub fn parse_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|t| !t.is_empty())
}
