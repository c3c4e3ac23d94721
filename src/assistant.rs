// src/assistant.rs
// THE SEARCH PIPELINE
// detect → translate → enhance → search → extract → rank → narrate

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::analyst;
use crate::brain::LanguageModel;
use crate::models::{Product, Query};
use crate::normalizer::QueryNormalizer;
use crate::ranker;
use crate::scout::MarketScout;

#[derive(Clone, Debug, Serialize)]
pub struct SearchOutcome {
    pub query: Query,
    pub products: Vec<Product>,
    pub ai_response: String,
    pub demo_mode: bool,
}

pub struct ShoppingAssistant {
    normalizer: QueryNormalizer,
    scout: MarketScout,
    brain: Arc<dyn LanguageModel>,
}

impl ShoppingAssistant {
    pub fn new(normalizer: QueryNormalizer, scout: MarketScout, brain: Arc<dyn LanguageModel>) -> Self {
        Self { normalizer, scout, brain }
    }

    pub fn normalizer(&self) -> &QueryNormalizer {
        &self.normalizer
    }

    pub fn popular_queries(&self) -> Vec<String> {
        self.scout.popular_queries()
    }

    pub fn search_products(&self, raw_query: &str, limit: usize) -> SearchOutcome {
        // 1. Understand the query
        let query = self.normalizer.prepare(raw_query);

        // 2. One search call (or the demo set)
        let report = self.scout.search(&query, limit);

        // 3. Extract + rank against the translated query, not the suffixed one
        let products = ranker::rank_hits(report.hits, &query.translated);
        info!("📦 ASSISTANT: {} products for '{}'", products.len(), query.raw);

        // 4. Narrate
        let ai_response = analyst::search_narrative(self.brain.as_ref(), &query.raw, &products);

        SearchOutcome {
            query,
            products,
            ai_response,
            demo_mode: report.demo_mode,
        }
    }
}
