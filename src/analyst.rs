// src/analyst.rs
// THE NARRATIVE ENGINE
// Full prompt first, a simpler prompt second, a template built from the
// structured data last. The template never fails.

use tracing::{info, warn};

use crate::brain::LanguageModel;
use crate::comparison::{ProviderResult, MISSING_PRICE};
use crate::error::OrFallback;
use crate::extractor::PRICE_NOT_AVAILABLE;
use crate::models::Product;
use crate::scout::title_case;

const MAX_CONTEXT_PRODUCTS: usize = 8;
const SNIPPET_CHARS: usize = 150;

/// Trimmed per-product context shared by both prompts.
pub fn product_context(products: &[Product]) -> String {
    let mut context = String::new();
    for (i, p) in products.iter().take(MAX_CONTEXT_PRODUCTS).enumerate() {
        context.push_str(&format!("Product {}:\n", i + 1));
        context.push_str(&format!("Title: {}\n", p.hit.title));
        context.push_str(&format!("Description: {}...\n", truncate(&p.hit.snippet, SNIPPET_CHARS)));
        if p.fields.price != PRICE_NOT_AVAILABLE {
            context.push_str(&format!("Price: {}\n", p.fields.price));
        }
        if !p.fields.delivery.is_empty() {
            context.push_str(&format!("Delivery: {}\n", p.fields.delivery));
        }
        context.push_str(&format!("Store: {}\n\n", p.hit.source));
    }
    context
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn full_search_prompt(query: &str, context: &str) -> String {
    format!(
        "You are a multi-agent shopping assistant for Indian e-commerce. \
         Analyze the following search results and provide comprehensive shopping recommendations.\n\n\
         User Query: {}\n\n\
         Search Results:\n{}\n\
         Please provide:\n\
         1. 🔍 Query Analysis: Understanding of what the user is looking for\n\
         2. 💰 Price Analysis: Price ranges, best value options, budget considerations\n\
         3. 🚚 Delivery Analysis: Delivery options, speed, and costs\n\
         4. 🏆 Top Recommendations: Best 4 options (Best Value, Fastest Delivery, Premium, Budget)\n\
         5. 💡 Smart Shopping Tips: Payment offers, timing, alternatives\n\n\
         Format with emojis and clear sections. Focus on Indian market context.",
        query, context
    )
}

fn simple_search_prompt(query: &str, context: &str) -> String {
    format!(
        "Analyze these search results for \"{}\" and provide shopping recommendations:\n\n{}\n\
         Provide:\n- Best value products\n- Delivery options\n- Price comparison\n- Shopping tips\n\n\
         Keep it concise and helpful for Indian shoppers.",
        query, context
    )
}

pub fn templated_search(query: &str, products: &[Product]) -> String {
    format!(
        "🤖 Found {} products for '{}'. Check the results below for detailed information.",
        products.len(),
        query
    )
}

/// Runs the prompt chain. Each LLM failure is logged before the next step.
fn narrate(brain: &dyn LanguageModel, full: &str, simple: &str, template: impl FnOnce() -> String) -> String {
    brain
        .generate(full)
        .or_else(|e| {
            warn!("⚠️ ANALYST: full prompt failed: {} (trying simpler prompt)", e);
            brain.generate(simple)
        })
        .or_fallback("ANALYST", template)
}

pub fn search_narrative(brain: &dyn LanguageModel, query: &str, products: &[Product]) -> String {
    info!("🧠 ANALYST: Writing shopping analysis for '{}'", query);
    let context = product_context(products);
    narrate(
        brain,
        &full_search_prompt(query, &context),
        &simple_search_prompt(query, &context),
        || templated_search(query, products),
    )
}

pub fn comparison_context(product_name: &str, providers: &[ProviderResult]) -> String {
    let mut context = format!("Product: {}\n\n", product_name);
    for result in providers {
        context.push_str(&format!("**{}:**\n", result.provider.name));
        match (&result.best_deal, result.available) {
            (Some(deal), true) => {
                context.push_str(&format!("- Price: {}\n", deal.fields.price));
                context.push_str(&format!("- Rating: {}\n", deal.rating_display()));
                context.push_str(&format!("- Delivery: {}\n", deal.delivery_display()));
                context.push_str(&format!("- URL: {}\n", deal.hit.url));
            }
            _ => context.push_str("- Not available\n"),
        }
        context.push('\n');
    }
    context
}

fn full_comparison_prompt(product_name: &str, context: &str) -> String {
    format!(
        "Analyze the following product comparison for \"{}\" across multiple Indian e-commerce providers:\n\n\
         {}\n\
         Please provide a comprehensive analysis including:\n\
         1. 🏆 Best Value Provider: Which provider offers the best overall value\n\
         2. 💰 Price Analysis: Price comparison across providers\n\
         3. ⚡ Delivery Speed: Fastest delivery options\n\
         4. 🌟 Quality Indicators: Ratings and reviews comparison\n\
         5. 🎯 Recommendations: Top 3 recommendations with reasons\n\
         6. 💡 Shopping Tips: When to buy, best deals, etc.\n\n\
         Format with emojis and clear sections. Focus on Indian market context and practical advice.",
        product_name, context
    )
}

fn simple_comparison_prompt(product_name: &str, context: &str) -> String {
    format!(
        "Compare these offers for \"{}\" and say where to buy it:\n\n{}\n\
         Provide:\n- Cheapest provider\n- Fastest delivery\n- One recommendation\n\n\
         Keep it short.",
        product_name, context
    )
}

/// Plain summary from the structured comparison only.
pub fn templated_comparison(product_name: &str, providers: &[ProviderResult]) -> String {
    let mut analysis = format!("## 🛒 {} - Provider Comparison\n\n", title_case(product_name));

    let available: Vec<&ProviderResult> = providers.iter().filter(|p| p.available).collect();
    if available.is_empty() {
        analysis.push_str("❌ No providers currently have this product available.\n");
        return analysis;
    }

    analysis.push_str(&format!(
        "✅ Found {} on {} providers:\n\n",
        product_name,
        available.len()
    ));

    let mut prices: Vec<(&str, &Product)> = available
        .iter()
        .filter_map(|r| r.best_deal.as_ref().map(|d| (r.provider.name, d)))
        .collect();
    if !prices.is_empty() {
        prices.sort_by(|(_, a), (_, b)| {
            let pa = a.price_amount().unwrap_or(MISSING_PRICE);
            let pb = b.price_amount().unwrap_or(MISSING_PRICE);
            pa.partial_cmp(&pb).unwrap_or(std::cmp::Ordering::Equal)
        });

        analysis.push_str("💰 **Price Comparison:**\n");
        for (name, deal) in &prices {
            analysis.push_str(&format!("• {}: {}\n", name, deal.fields.price));
        }
        let (cheapest_name, cheapest) = prices[0];
        analysis.push_str(&format!(
            "\n🏆 **Best Price:** {} on {}\n\n",
            cheapest.fields.price, cheapest_name
        ));
    }

    analysis.push_str("⚡ **Delivery Options:**\n");
    for result in &available {
        if let Some(deal) = &result.best_deal {
            let delivery = if deal.fields.delivery.is_empty() {
                "Standard delivery"
            } else {
                deal.fields.delivery.as_str()
            };
            analysis.push_str(&format!("• {}: {}\n", result.provider.name, delivery));
        }
    }

    analysis
}

pub fn comparison_narrative(brain: &dyn LanguageModel, product_name: &str, providers: &[ProviderResult]) -> String {
    if providers.iter().all(|p| !p.available) {
        return templated_comparison(product_name, providers);
    }
    info!("🧠 ANALYST: Writing comparison analysis for '{}'", product_name);
    let context = comparison_context(product_name, providers);
    narrate(
        brain,
        &full_comparison_prompt(product_name, &context),
        &simple_comparison_prompt(product_name, &context),
        || templated_comparison(product_name, providers),
    )
}
