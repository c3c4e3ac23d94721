// src/scout.rs
// THE SEARCH GATEWAY
// One best-effort POST to the search API. Any failure degrades to demo hits.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::{GatewayError, OrFallback};
use crate::lexicon::{COMMON_QUERIES, SHOPPING_KEYWORDS};
use crate::models::{Query, SearchHit};

const TRENDING_QUERY: &str = "trending products India buy online";
const TRENDING_RESULTS: usize = 10;
pub const MAX_POPULAR: usize = 8;

/// Anything that can turn a query into raw hits.
pub trait SearchBackend: Send + Sync {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, GatewayError>;
}

// 1. The Data We Send
#[derive(Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
    gl: &'a str,
    hl: &'a str,
}

// 2. The Data We Get Back
#[derive(Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Deserialize)]
struct OrganicResult {
    #[serde(default = "default_title")]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

fn default_title() -> String {
    "Product".to_string()
}

impl SerperResponse {
    fn into_hits(self, limit: usize) -> Vec<SearchHit> {
        self.organic
            .into_iter()
            .take(limit)
            .map(|r| SearchHit::new(&r.title, &r.link, &r.snippet))
            .collect()
    }
}

fn check_status(status: u16) -> Result<(), GatewayError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(GatewayError::Status(status))
    }
}

/// Serper (Google search) client. Blocking; call it from `web::block`.
pub struct SerperClient {
    api_key: Option<String>,
    endpoint: String,
    timeout: Duration,
}

impl SerperClient {
    pub fn new(api_key: Option<String>, endpoint: &str, timeout: Duration) -> Self {
        Self {
            api_key,
            endpoint: endpoint.to_string(),
            timeout,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        Self::new(cfg.search_api_key.clone(), &cfg.search_endpoint, cfg.http_timeout())
    }
}

impl SearchBackend for SerperClient {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, GatewayError> {
        let key = self.api_key.as_deref().ok_or(GatewayError::MissingCredential)?;
        debug!("🔎 SCOUT: POST {} q='{}' num={}", self.endpoint, query, limit);

        // Built per call on the worker thread, never inside the async runtime.
        let client = reqwest::blocking::Client::new();
        let resp = client
            .post(&self.endpoint)
            .header("X-API-KEY", key)
            .json(&SerperRequest {
                q: query,
                num: limit,
                gl: "in",
                hl: "en",
            })
            .timeout(self.timeout)
            .send()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        check_status(resp.status().as_u16())?;

        let body: SerperResponse = resp.json().map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(body.into_hits(limit))
    }
}

/// Hits plus whether they came from the demo set.
#[derive(Clone, Debug, Serialize)]
pub struct ScoutReport {
    pub hits: Vec<SearchHit>,
    pub demo_mode: bool,
}

pub struct MarketScout {
    backend: Arc<dyn SearchBackend>,
}

impl MarketScout {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Searches for the normalized query; demo titles embed the translated
    /// one, so the user sees their own words rather than the search string.
    pub fn search(&self, query: &Query, limit: usize) -> ScoutReport {
        let limit = limit.max(1);
        info!("🔎 SCOUT: Searching for '{}' (limit {})", query.normalized, limit);

        let mut demo_mode = false;
        let hits = self.backend.search(&query.normalized, limit).or_fallback("SCOUT", || {
            demo_mode = true;
            demo_hits(&query.translated, limit)
        });

        if !demo_mode {
            info!("✅ SCOUT: {} live hits", hits.len());
        }
        ScoutReport { hits, demo_mode }
    }

    /// Up to eight sample queries pulled from trending result titles.
    pub fn popular_queries(&self) -> Vec<String> {
        let keywords = self
            .backend
            .search(TRENDING_QUERY, TRENDING_RESULTS)
            .map(|hits| trending_keywords(&hits))
            .or_fallback("SCOUT", common_queries);

        if keywords.is_empty() {
            return common_queries();
        }
        debug!("🔎 SCOUT: {} trending keywords", keywords.len());
        keywords.into_iter().take(MAX_POPULAR).collect()
    }
}

/// Alphabetic title words longer than three letters, first occurrence only.
fn trending_keywords(hits: &[SearchHit]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for hit in hits {
        for word in hit.title.to_lowercase().split_whitespace() {
            if word.chars().count() > 3
                && word.chars().all(char::is_alphabetic)
                && !SHOPPING_KEYWORDS.contains(&word)
                && !keywords.iter().any(|k| k == word)
            {
                keywords.push(word.to_string());
            }
        }
    }
    keywords
}

fn common_queries() -> Vec<String> {
    COMMON_QUERIES.iter().take(MAX_POPULAR).map(|q| q.to_string()).collect()
}

/// Fixed three-item sample set. Snippets carry the same cues live results do.
pub fn demo_hits(query: &str, limit: usize) -> Vec<SearchHit> {
    let name = title_case(query);
    let samples = [
        (1, 299, "4.2 out of 5 stars", "2-3 days delivery", "Demo Store"),
        (2, 199, "4.5 out of 5 stars", "1-2 days delivery", "Demo Mart"),
        (3, 399, "4.0 out of 5 stars", "3-4 days delivery", "Demo Shop"),
    ];

    samples
        .iter()
        .take(limit.max(1))
        .map(|(i, price, rating, delivery, store)| {
            let mut hit = SearchHit::new(
                &format!("Demo {} Product {}", name, i),
                &format!("https://example.com/product{}", i),
                &format!(
                    "Demo product for {}. Only ₹{}, {}, {}.",
                    query, price, rating, delivery
                ),
            );
            hit.source = store.to_string();
            hit
        })
        .collect()
}

pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
