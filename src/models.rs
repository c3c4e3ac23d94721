// src/models.rs
// Request-scoped data: queries, raw hits and the products derived from them.

use serde::{Deserialize, Serialize};

pub const NOT_AVAILABLE: &str = "not available";

/// A user query after language detection and normalization.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Query {
    pub raw: String,
    pub is_translated_language: bool,
    /// Lexicon applied, without the shopping suffix. Used for ranking.
    pub translated: String,
    /// What is actually sent to the search API.
    pub normalized: String,
}

/// One organic result from the search API.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: String,
}

impl SearchHit {
    pub fn new(title: &str, url: &str, snippet: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            snippet: snippet.to_string(),
            source: domain_of(url),
        }
    }
}

/// Host of a URL without the leading "www.", or "Unknown Store".
pub fn domain_of(raw: &str) -> String {
    url::Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "Unknown Store".to_string())
}

/// Everything the regex battery pulls out of a hit. Missing fields use sentinels.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProductFields {
    /// "₹<digits>" or "Price not available".
    pub price: String,
    pub original_price: Option<String>,
    /// Empty when absent.
    pub discount: String,
    pub rating: Option<f32>,
    /// Empty when absent.
    pub delivery: String,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub availability: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Product {
    #[serde(flatten)]
    pub hit: SearchHit,
    #[serde(flatten)]
    pub fields: ProductFields,
    pub seller: String,
    pub category: String,
    pub score: f32,
}

impl Product {
    pub fn price_amount(&self) -> Option<f64> {
        crate::extractor::parse_price_amount(&self.fields.price)
    }

    pub fn rating_display(&self) -> String {
        match self.fields.rating {
            Some(r) => format!("{:.1}/5", r),
            None => NOT_AVAILABLE.to_string(),
        }
    }

    pub fn delivery_display(&self) -> String {
        if self.fields.delivery.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            self.fields.delivery.clone()
        }
    }
}
