// src/ranker.rs
// Naive relevance: literal containment plus a bonus for known shopping hosts.

use std::cmp::Ordering;

use crate::extractor;
use crate::lexicon;
use crate::models::{Product, SearchHit};

pub const MAX_SCORE: f32 = 10.0;
const TITLE_BONUS: f32 = 5.0;
const SNIPPET_BONUS: f32 = 2.0;
const DOMAIN_BONUS: f32 = 3.0;

pub const SHOPPING_DOMAINS: &[&str] = &[
    "amazon", "flipkart", "myntra", "snapdeal", "paytmmall", "bigbasket", "zepto", "blinkit",
];

pub fn score(hit: &SearchHit, query: &str) -> f32 {
    let query = query.trim().to_lowercase();
    let mut total = 0.0;

    if !query.is_empty() {
        if hit.title.to_lowercase().contains(&query) {
            total += TITLE_BONUS;
        }
        if hit.snippet.to_lowercase().contains(&query) {
            total += SNIPPET_BONUS;
        }
    }

    let source = hit.source.to_lowercase();
    if SHOPPING_DOMAINS.iter().any(|d| source.contains(d)) {
        total += DOMAIN_BONUS;
    }

    total.min(MAX_SCORE)
}

/// Extract + score one hit.
pub fn build_product(hit: SearchHit, query: &str) -> Product {
    let fields = extractor::extract(&hit);
    Product {
        seller: extractor::seller_from_url(&hit.url),
        category: lexicon::category_for(query),
        score: score(&hit, query),
        fields,
        hit,
    }
}

/// Descending by score; equal scores keep their original order.
pub fn rank(products: Vec<Product>) -> Vec<Product> {
    let mut indexed: Vec<(usize, Product)> = products.into_iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| ia.cmp(ib))
    });
    indexed.into_iter().map(|(_, p)| p).collect()
}

pub fn rank_hits(hits: Vec<SearchHit>, query: &str) -> Vec<Product> {
    rank(hits.into_iter().map(|h| build_product(h, query)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(title: &str, url: &str, snippet: &str) -> SearchHit {
        SearchHit::new(title, url, snippet)
    }

    #[test]
    fn bonuses_add_up_to_the_cap() {
        let h = hit("Tomato 1kg", "https://www.bigbasket.com/pd/1", "fresh tomato daily");
        assert_eq!(score(&h, "tomato"), 10.0);

        let plain = hit("Tomato 1kg", "https://recipes.example.com", "soup");
        assert_eq!(score(&plain, "Tomato"), 5.0);

        let shop_only = hit("Onion", "https://www.flipkart.com/x", "fresh onion");
        assert_eq!(score(&shop_only, "tomato"), 3.0);
    }

    #[test]
    fn score_stays_in_range() {
        let cases = [
            hit("", "", ""),
            hit("aaa", "https://amazon.in", "aaa"),
            hit("x", "https://zepto.in", "x x x"),
        ];
        for h in &cases {
            for q in ["", "a", "aaa", "x", "zzz"] {
                let s = score(h, q);
                assert!((0.0..=MAX_SCORE).contains(&s), "{} for {:?}", s, h);
            }
        }
    }

    #[test]
    fn ties_keep_original_order() {
        let products = rank_hits(
            vec![
                hit("first", "https://a.com", ""),
                hit("tomato", "https://b.com", ""),
                hit("second", "https://c.com", ""),
                hit("third", "https://d.com", ""),
            ],
            "tomato",
        );
        let titles: Vec<&str> = products.iter().map(|p| p.hit.title.as_str()).collect();
        assert_eq!(titles, vec!["tomato", "first", "second", "third"]);
    }

    #[test]
    fn built_products_carry_seller_and_category() {
        let p = build_product(hit("Amul Milk 500 ml", "https://www.amazon.in/dp/1", "₹27"), "milk");
        assert_eq!(p.seller, "Amazon");
        assert_eq!(p.category, "Dairy Products");
        assert_eq!(p.fields.price, "₹27");
        assert_eq!(p.score, 8.0);
    }
}
