// src/comparison.rs
// THE PROVIDER COMPARISON
// One site-restricted search per marketplace, best deal per provider, one summary.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::analyst;
use crate::brain::LanguageModel;
use crate::error::GatewayError;
use crate::extractor;
use crate::lexicon;
use crate::models::{Product, ProductFields, SearchHit};
use crate::ranker;
use crate::scout::{title_case, SearchBackend};

/// Parsed price used when a product has none, so it sorts last.
pub const MISSING_PRICE: f64 = 999_999.0;
const RESULTS_PER_PROVIDER: usize = 5;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ProviderInfo {
    pub key: &'static str,
    pub name: &'static str,
    pub domain: &'static str,
    /// Storefront search URL; `{query}` is replaced by the percent-encoded product name.
    pub search_url: &'static str,
    pub color: &'static str,
    /// Used when a snippet states no delivery time.
    pub typical_delivery: &'static str,
    #[serde(skip)]
    pub demo_prices: &'static [u32],
    #[serde(skip)]
    pub demo_delivery: &'static [&'static str],
}

impl ProviderInfo {
    pub fn search_url_for(&self, product: &str) -> String {
        self.search_url
            .replace("{query}", &urlencoding::encode(product.trim()))
    }
}

pub const PROVIDERS: &[ProviderInfo] = &[
    ProviderInfo {
        key: "amazon",
        name: "Amazon India",
        domain: "amazon.in",
        search_url: "https://www.amazon.in/s?k={query}",
        color: "#FF9900",
        typical_delivery: "1-2 days",
        demo_prices: &[299, 349, 399],
        demo_delivery: &["1-2 days", "Same day delivery", "2-3 days"],
    },
    ProviderInfo {
        key: "flipkart",
        name: "Flipkart",
        domain: "flipkart.com",
        search_url: "https://www.flipkart.com/search?q={query}",
        color: "#2874F0",
        typical_delivery: "1-2 days",
        demo_prices: &[279, 329, 379],
        demo_delivery: &["1-2 days", "Next day delivery", "2-3 days"],
    },
    ProviderInfo {
        key: "bigbasket",
        name: "BigBasket",
        domain: "bigbasket.com",
        search_url: "https://www.bigbasket.com/pd/{query}",
        color: "#4CAF50",
        typical_delivery: "Same day",
        demo_prices: &[289, 339, 389],
        demo_delivery: &["Same day", "2-3 hours", "Next day"],
    },
    ProviderInfo {
        key: "zepto",
        name: "Zepto",
        domain: "zepto.in",
        search_url: "https://www.zepto.in/search?q={query}",
        color: "#FF6B35",
        typical_delivery: "10 minutes",
        demo_prices: &[269, 319, 369],
        demo_delivery: &["10 minutes", "15 minutes", "20 minutes"],
    },
    ProviderInfo {
        key: "blinkit",
        name: "Blinkit",
        domain: "blinkit.com",
        search_url: "https://blinkit.com/search?q={query}",
        color: "#FF6B6B",
        typical_delivery: "10 minutes",
        demo_prices: &[259, 309, 359],
        demo_delivery: &["10 minutes", "15 minutes", "20 minutes"],
    },
    ProviderInfo {
        key: "grofers",
        name: "Grofers",
        domain: "grofers.com",
        search_url: "https://grofers.com/search?q={query}",
        color: "#4CAF50",
        typical_delivery: "Same day",
        demo_prices: &[279, 329, 379],
        demo_delivery: &["Same day", "2-3 hours", "Next day"],
    },
];

const DEMO_RATINGS: [f32; 5] = [4.2, 4.5, 4.0, 4.3, 4.1];

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PriceStats {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProviderResult {
    pub provider: ProviderInfo,
    pub search_url: String,
    pub products: Vec<Product>,
    pub best_deal: Option<Product>,
    pub available: bool,
    pub price_stats: Option<PriceStats>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ComparisonSummary {
    pub total_providers: usize,
    pub available_providers: usize,
    pub best_price: Option<String>,
    pub best_provider: Option<String>,
    pub fastest_delivery: Option<String>,
    pub fastest_provider: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ComparisonReport {
    pub product_name: String,
    pub providers: Vec<ProviderResult>,
    pub summary: ComparisonSummary,
    pub analysis: String,
    pub demo_mode: bool,
}

pub struct ComparisonAggregator {
    backend: Arc<dyn SearchBackend>,
    brain: Arc<dyn LanguageModel>,
    demo_fallback: bool,
    rng: Mutex<StdRng>,
}

impl ComparisonAggregator {
    pub fn new(backend: Arc<dyn SearchBackend>, brain: Arc<dyn LanguageModel>, demo_fallback: bool) -> Self {
        Self::with_rng(backend, brain, demo_fallback, StdRng::from_entropy())
    }

    pub fn with_rng(
        backend: Arc<dyn SearchBackend>,
        brain: Arc<dyn LanguageModel>,
        demo_fallback: bool,
        rng: StdRng,
    ) -> Self {
        Self {
            backend,
            brain,
            demo_fallback,
            rng: Mutex::new(rng),
        }
    }

    pub fn compare(&self, product_name: &str) -> ComparisonReport {
        let product_name = product_name.trim();
        info!("⚖️ COMPARE: '{}' across {} providers", product_name, PROVIDERS.len());

        let mut demo_mode = false;
        let providers: Vec<ProviderResult> = PROVIDERS
            .iter()
            .map(|provider| {
                let (result, used_demo) = self.compare_one(provider, product_name);
                demo_mode |= used_demo;
                result
            })
            .collect();

        let summary = summarize(&providers);
        info!(
            "✅ COMPARE: {}/{} providers available, best {:?} on {:?}",
            summary.available_providers, summary.total_providers, summary.best_price, summary.best_provider
        );

        let analysis = analyst::comparison_narrative(self.brain.as_ref(), product_name, &providers);

        ComparisonReport {
            product_name: product_name.to_string(),
            providers,
            summary,
            analysis,
            demo_mode,
        }
    }

    fn compare_one(&self, provider: &ProviderInfo, product_name: &str) -> (ProviderResult, bool) {
        let query = format!("{} site:{}", product_name, provider.domain);

        let (products, error, used_demo) = match self.backend.search(&query, RESULTS_PER_PROVIDER) {
            Ok(hits) => (provider_products(provider, hits, product_name), None, false),
            Err(GatewayError::MissingCredential) if self.demo_fallback => {
                (self.demo_products(provider, product_name), None, true)
            }
            Err(e) => {
                warn!("⚠️ COMPARE: {} unavailable: {}", provider.name, e);
                (Vec::new(), Some(e.to_string()), false)
            }
        };

        let result = ProviderResult {
            provider: provider.clone(),
            search_url: provider.search_url_for(product_name),
            best_deal: best_deal(&products).cloned(),
            available: !products.is_empty(),
            price_stats: price_stats(&products),
            products,
            error,
        };
        (result, used_demo)
    }

    /// Two or three plausible offers drawn from the provider's demo tables.
    fn demo_products(&self, provider: &ProviderInfo, product_name: &str) -> Vec<Product> {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let name = title_case(product_name);
        let count = rng.gen_range(2..=3);

        (1..=count)
            .map(|i| {
                let price = provider.demo_prices.choose(&mut *rng).copied().unwrap_or(299);
                let rating = DEMO_RATINGS.choose(&mut *rng).copied();
                let delivery = provider.demo_delivery.choose(&mut *rng).copied().unwrap_or("1-2 days");

                let hit = SearchHit::new(
                    &format!("{} - {} Option {}", name, provider.name, i),
                    &format!("https://{}/product{}", provider.domain, i),
                    &format!(
                        "High quality {} available on {}. Fresh and best price guaranteed.",
                        product_name, provider.name
                    ),
                );
                Product {
                    fields: ProductFields {
                        price: format!("₹{}", price),
                        original_price: None,
                        discount: String::new(),
                        rating,
                        delivery: delivery.to_string(),
                        brand: None,
                        size: None,
                        availability: "In Stock".to_string(),
                    },
                    seller: provider.name.to_string(),
                    category: lexicon::category_for(product_name),
                    score: ranker::score(&hit, product_name),
                    hit,
                }
            })
            .collect()
    }
}

fn provider_products(provider: &ProviderInfo, hits: Vec<SearchHit>, product_name: &str) -> Vec<Product> {
    let products = hits
        .into_iter()
        .map(|hit| {
            let mut p = ranker::build_product(hit, product_name);
            if p.fields.delivery.is_empty() {
                p.fields.delivery = provider.typical_delivery.to_string();
            }
            p
        })
        .collect();
    ranker::rank(products)
}

fn sort_price(p: &Product) -> f64 {
    p.price_amount().unwrap_or(MISSING_PRICE)
}

/// Lowest price, then highest rating; the earlier product wins a full tie.
pub fn best_deal(products: &[Product]) -> Option<&Product> {
    products.iter().min_by(|a, b| {
        sort_price(a)
            .partial_cmp(&sort_price(b))
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                let ra = a.fields.rating.unwrap_or(0.0);
                let rb = b.fields.rating.unwrap_or(0.0);
                rb.partial_cmp(&ra).unwrap_or(Ordering::Equal)
            })
    })
}

pub fn price_stats(products: &[Product]) -> Option<PriceStats> {
    let prices: Vec<f64> = products.iter().filter_map(|p| p.price_amount()).collect();
    if prices.is_empty() {
        return None;
    }
    let min = prices.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Some(PriceStats {
        min,
        max,
        average: prices.iter().sum::<f64>() / prices.len() as f64,
        count: prices.len(),
    })
}

pub fn format_rupees(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("₹{}", amount as i64)
    } else {
        format!("₹{:.2}", amount)
    }
}

pub fn summarize(providers: &[ProviderResult]) -> ComparisonSummary {
    let available: Vec<&ProviderResult> = providers.iter().filter(|p| p.available).collect();

    let mut best: Option<(f64, &str)> = None;
    let mut fastest: Option<(u32, &str)> = None;

    for result in &available {
        let Some(deal) = &result.best_deal else { continue };

        if let Some(amount) = deal.price_amount() {
            if best.map_or(true, |(b, _)| amount < b) {
                best = Some((amount, result.provider.name));
            }
        }
        if let Some(minutes) = extractor::delivery_minutes(&deal.fields.delivery) {
            if fastest.map_or(true, |(f, _)| minutes < f) {
                fastest = Some((minutes, result.provider.name));
            }
        }
    }

    ComparisonSummary {
        total_providers: providers.len(),
        available_providers: available.len(),
        best_price: best.map(|(amount, _)| format_rupees(amount)),
        best_provider: best.map(|(_, name)| name.to_string()),
        fastest_delivery: fastest.map(|(m, _)| format!("{} minutes", m)),
        fastest_provider: fastest.map(|(_, name)| name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::tests::ScriptedBrain;
    use crate::scout::tests::MockBackend;

    fn aggregator(backend: MockBackend, demo: bool, seed: u64) -> ComparisonAggregator {
        ComparisonAggregator::with_rng(
            Arc::new(backend),
            Arc::new(ScriptedBrain::offline()),
            demo,
            StdRng::seed_from_u64(seed),
        )
    }

    struct NoKey;
    impl SearchBackend for NoKey {
        fn search(&self, _: &str, _: usize) -> Result<Vec<SearchHit>, GatewayError> {
            Err(GatewayError::MissingCredential)
        }
    }

    fn product(title: &str, price: &str, rating: Option<f32>) -> Product {
        let mut p = ranker::build_product(SearchHit::new(title, "https://x.in", ""), "x");
        p.fields.price = price.to_string();
        p.fields.rating = rating;
        p
    }

    #[test]
    fn all_providers_failing_is_a_normal_empty_report() {
        let report = aggregator(MockBackend::failing(), false, 1).compare("atta");
        assert_eq!(report.summary.total_providers, 6);
        assert_eq!(report.summary.available_providers, 0);
        assert_eq!(report.summary.best_price, None);
        assert_eq!(report.summary.fastest_provider, None);
        assert!(report.providers.iter().all(|p| p.error.is_some() && p.best_deal.is_none()));
        assert!(report.analysis.contains("No providers currently have this product available"));
    }

    #[test]
    fn missing_key_without_demo_marks_everything_unavailable() {
        let agg = ComparisonAggregator::with_rng(
            Arc::new(NoKey),
            Arc::new(ScriptedBrain::offline()),
            false,
            StdRng::seed_from_u64(3),
        );
        let report = agg.compare("milk");
        assert_eq!(report.summary.available_providers, 0);
        assert!(!report.demo_mode);
    }

    #[test]
    fn demo_generator_fills_every_provider_deterministically() {
        let make = || {
            ComparisonAggregator::with_rng(
                Arc::new(NoKey),
                Arc::new(ScriptedBrain::offline()),
                true,
                StdRng::seed_from_u64(42),
            )
        };
        let a = make().compare("milk");
        let b = make().compare("milk");

        assert!(a.demo_mode);
        assert_eq!(a.summary.available_providers, 6);
        for p in &a.providers {
            assert!((2..=3).contains(&p.products.len()), "{}", p.provider.name);
            assert!(p.products[0].hit.title.starts_with("Milk - "));
        }

        let fastest = a.summary.fastest_provider.clone().unwrap_or_default();
        assert!(fastest == "Zepto" || fastest == "Blinkit", "{}", fastest);
        assert!(a.summary.fastest_delivery.as_deref().unwrap_or("").ends_with(" minutes"));

        let best = a.summary.best_price.as_deref().and_then(extractor::parse_price_amount);
        assert!(matches!(best, Some(v) if (259.0..=399.0).contains(&v)));

        let prices = |r: &ComparisonReport| -> Vec<String> {
            r.providers.iter().flat_map(|p| p.products.iter().map(|x| x.fields.price.clone())).collect()
        };
        assert_eq!(prices(&a), prices(&b));
    }

    #[test]
    fn live_results_use_site_queries_and_typical_delivery() {
        let backend = Arc::new(MockBackend::with_hits(vec![
            SearchHit::new("Aashirvaad Atta 5kg", "https://www.zepto.in/p/1", "₹289 4.4 out of 5"),
            SearchHit::new("Atta 10kg", "https://www.zepto.in/p/2", "₹520, delivery in 8 mins"),
        ]));
        let agg = ComparisonAggregator::with_rng(
            backend.clone(),
            Arc::new(ScriptedBrain::offline()),
            true,
            StdRng::seed_from_u64(7),
        );
        let report = agg.compare("atta");

        let seen = backend.seen.lock().unwrap();
        assert!(seen.contains(&"atta site:amazon.in".to_string()));
        assert!(seen.contains(&"atta site:zepto.in".to_string()));
        drop(seen);

        let zepto = &report.providers[3];
        assert_eq!(zepto.provider.key, "zepto");
        let deal = zepto.best_deal.as_ref().map(|d| d.fields.price.as_str());
        assert_eq!(deal, Some("₹289"));
        assert_eq!(zepto.best_deal.as_ref().map(|d| d.fields.delivery.as_str()), Some("10 minutes"));
        assert_eq!(
            zepto.price_stats,
            Some(PriceStats { min: 289.0, max: 520.0, average: 404.5, count: 2 })
        );
        assert_eq!(report.summary.best_price.as_deref(), Some("₹289"));
        assert_eq!(report.summary.best_provider.as_deref(), Some("Amazon India"));
        assert!(!report.demo_mode);
    }

    #[test]
    fn best_deal_prefers_price_then_rating() {
        let products = vec![
            product("a", "₹300", Some(4.9)),
            product("b", "₹250", Some(3.0)),
            product("c", "₹250", Some(4.0)),
            product("d", "Price not available", Some(5.0)),
        ];
        assert_eq!(best_deal(&products).map(|p| p.hit.title.as_str()), Some("c"));
        assert!(best_deal(&[]).is_none());

        let unpriced = vec![product("x", "Price not available", None), product("y", "Price not available", Some(4.0))];
        assert_eq!(best_deal(&unpriced).map(|p| p.hit.title.as_str()), Some("y"));
    }

    #[test]
    fn demo_offers_come_from_the_provider_itself() {
        assert!(PROVIDERS.iter().all(|p| !p.demo_prices.is_empty() && !p.demo_delivery.is_empty()));

        let bare = ProviderInfo {
            key: "local",
            name: "Local Kirana",
            domain: "kirana.example",
            search_url: "https://kirana.example/s?q={query}",
            color: "#000000",
            typical_delivery: "Same day",
            demo_prices: &[],
            demo_delivery: &[],
        };
        let products = aggregator(MockBackend::failing(), true, 5).demo_products(&bare, "milk");
        assert!((2..=3).contains(&products.len()));
        assert!(products.iter().all(|p| p.fields.price == "₹299" && p.fields.delivery == "1-2 days"));

        let json = serde_json::to_value(&PROVIDERS[0]).unwrap();
        assert!(json.get("demo_prices").is_none());
    }

    #[test]
    fn search_urls_are_percent_encoded() {
        assert_eq!(
            PROVIDERS[0].search_url_for("basmati rice"),
            "https://www.amazon.in/s?k=basmati%20rice"
        );
    }
}
