// src/links.rs
// Product-link analysis: validate, tag the platform, fetch, extract. Up to four links.

use serde::Serialize;
use tracing::{info, warn};

use crate::extractor;
use crate::models::{domain_of, ProductFields, SearchHit};
use crate::systems::sensory::PageFetcher;

pub const MAX_LINKS: usize = 4;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum Platform {
    #[serde(rename = "amazon.in")]
    AmazonIn,
    #[serde(rename = "flipkart.com")]
    Flipkart,
    #[serde(rename = "myntra.com")]
    Myntra,
    #[serde(rename = "snapdeal.com")]
    Snapdeal,
    #[serde(rename = "bigbasket.com")]
    BigBasket,
    #[serde(rename = "generic")]
    Generic,
}

/// http(s) with a host.
pub fn validate_url(raw: &str) -> bool {
    match url::Url::parse(raw.trim()) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.host_str().map_or(false, |h| !h.is_empty()),
        Err(_) => false,
    }
}

pub fn platform_for(raw: &str) -> Platform {
    let lower = raw.to_lowercase();
    if lower.contains("amazon.in") {
        Platform::AmazonIn
    } else if lower.contains("flipkart.com") {
        Platform::Flipkart
    } else if lower.contains("myntra.com") {
        Platform::Myntra
    } else if lower.contains("snapdeal.com") {
        Platform::Snapdeal
    } else if lower.contains("bigbasket.com") {
        Platform::BigBasket
    } else {
        Platform::Generic
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LinkAnalysis {
    pub url: String,
    pub platform: Platform,
    pub domain: String,
    pub title: Option<String>,
    /// Fields extracted from the page title.
    pub fields: Option<ProductFields>,
    pub error: Option<String>,
}

pub fn analyze_link(fetcher: &dyn PageFetcher, url: &str) -> LinkAnalysis {
    let url = url.trim();
    let mut analysis = LinkAnalysis {
        url: url.to_string(),
        platform: platform_for(url),
        domain: domain_of(url),
        title: None,
        fields: None,
        error: None,
    };

    match fetcher.fetch(url) {
        Ok(page) => {
            let hit = SearchHit::new(&page.title, url, "");
            analysis.fields = Some(extractor::extract(&hit));
            analysis.title = Some(page.title);
        }
        Err(e) => {
            warn!("⚠️ LINKS: {}: {}", url, e);
            analysis.error = Some(e.to_string());
        }
    }
    analysis
}

/// Each link is analysed on its own; one failure never hides the rest.
pub fn compare_links(fetcher: &dyn PageFetcher, urls: &[String]) -> Vec<LinkAnalysis> {
    let urls: Vec<&String> = urls.iter().filter(|u| !u.trim().is_empty()).collect();
    if urls.len() > MAX_LINKS {
        warn!("⚠️ LINKS: {} links given, only the first {} are analysed", urls.len(), MAX_LINKS);
    }
    info!("🔗 LINKS: Analysing {} links", urls.len().min(MAX_LINKS));

    urls.into_iter()
        .take(MAX_LINKS)
        .map(|u| analyze_link(fetcher, u))
        .collect()
}
