// src/extractor.rs
// THE REGEX BATTERY
// Pulls price, discount, rating, delivery, brand and size out of snippet text.
// Each field is an ordered rule table: the first rule that yields a value wins.
// A miss is never an error, it is the field's "absent" sentinel.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::lexicon::Lexicon;
use crate::models::{ProductFields, SearchHit};

pub const PRICE_NOT_AVAILABLE: &str = "Price not available";

type Rule<T> = (Regex, fn(&Captures) -> Option<T>);

fn rule<T>(pattern: &str, extract: fn(&Captures) -> Option<T>) -> Rule<T> {
    (Regex::new(pattern).unwrap(), extract)
}

fn first_match<T>(rules: &[Rule<T>], text: &str) -> Option<T> {
    rules
        .iter()
        .find_map(|(re, extract)| re.captures(text).and_then(|caps| extract(&caps)))
}

fn rupees(caps: &Captures) -> Option<String> {
    Some(format!("₹{}", &caps[1]))
}

fn percent_off(caps: &Captures) -> Option<String> {
    Some(format!("{}% OFF", &caps[1]))
}

fn whole_match(caps: &Captures) -> Option<String> {
    Some(caps[0].split_whitespace().collect::<Vec<_>>().join(" "))
}

fn bounded_rating(caps: &Captures) -> Option<f32> {
    let value: f32 = caps[1].parse().ok()?;
    if (0.0..=5.0).contains(&value) {
        Some((value * 10.0).round() / 10.0)
    } else {
        None
    }
}

fn sized(caps: &Captures) -> Option<String> {
    let unit = match &caps[2] {
        "gb" => "GB",
        "tb" => "TB",
        other => other,
    };
    Some(format!("{} {}", &caps[1], unit))
}

// Matched against lower-cased text.
static PRICE_RULES: Lazy<Vec<Rule<String>>> = Lazy::new(|| {
    vec![
        rule(r"₹\s*(\d+(?:,\d+)*(?:\.\d{1,2})?)", rupees),
        rule(r"\brs\.?\s*(\d+(?:,\d+)*(?:\.\d{1,2})?)", rupees),
        rule(r"\binr\s*(\d+(?:,\d+)*(?:\.\d{1,2})?)", rupees),
        rule(r"\$\s*(\d+(?:,\d+)*(?:\.\d{1,2})?)", rupees),
        rule(r"\b(\d+(?:,\d+)*(?:\.\d{1,2})?)\s*(?:rupees?|rs\b)", rupees),
    ]
});

static MRP_RULES: Lazy<Vec<Rule<String>>> = Lazy::new(|| {
    vec![rule(r"\bmrp\s*[:\-]?\s*(?:₹|rs\.?|inr)?\s*(\d+(?:,\d+)*(?:\.\d{1,2})?)", rupees)]
});

static DISCOUNT_RULES: Lazy<Vec<Rule<String>>> = Lazy::new(|| {
    vec![
        rule(r"\b(\d{1,2}(?:\.\d+)?)\s*%\s*off\b", percent_off),
        rule(r"\bsave\s*(?:₹|rs\.?|inr)\s*(\d+(?:,\d+)*)", |c| Some(format!("Save ₹{}", &c[1]))),
        rule(r"\b(\d{1,2}(?:\.\d+)?)\s*%\s*discount", percent_off),
    ]
});

// Scale-anchored forms go first so "4.2 out of 5 stars" reads 4.2, not 5.
static RATING_RULES: Lazy<Vec<Rule<f32>>> = Lazy::new(|| {
    vec![
        rule(r"(\d+(?:\.\d+)?)\s*out\s*of\s*5\b", bounded_rating),
        rule(r"(\d+(?:\.\d+)?)\s*/\s*5\b", bounded_rating),
        rule(r"\brating\s*(?:of\s*)?[:\-]?\s*(\d+(?:\.\d+)?)", bounded_rating),
        rule(r"(\d+(?:\.\d+)?)\s*stars?\b", bounded_rating),
    ]
});

static DELIVERY_RULES: Lazy<Vec<Rule<String>>> = Lazy::new(|| {
    vec![
        rule(r"\b\d+\s*(?:-\s*\d+\s*)?(?:mins?|minutes?)\b(?:\s*delivery)?", whole_match),
        rule(r"\binstant\s*delivery", whole_match),
        rule(r"\bsame[\s-]*day(?:\s*delivery)?", whole_match),
        rule(r"\bnext[\s-]*day(?:\s*delivery)?", whole_match),
        rule(
            r"\b(?:delivery|delivered)\s*(?:in|within)\s*\d+(?:\s*-\s*\d+)?\s*(?:hours?|hrs?|days?)\b",
            whole_match,
        ),
        rule(r"\b\d+(?:\s*-\s*\d+)?\s*(?:hours?|hrs?|days?)\s*delivery", whole_match),
        rule(r"\bfree\s*delivery", whole_match),
        rule(r"\bexpress\s*delivery", whole_match),
    ]
});

static MINUTES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*(?:minutes?|mins?)\b").unwrap());

// Matched against original-case text.
static BRAND_RULES: Lazy<Vec<Rule<String>>> = Lazy::new(|| {
    vec![
        rule(r"(?i)\bbrand\s*[:\-]\s*([a-z][\w&'.-]*)", |c| Some(c[1].to_string())),
        rule(r"\b[Bb]y\s+([A-Z][A-Za-z0-9&'-]+)", |c| Some(c[1].to_string())),
    ]
});

static SIZE_RULES: Lazy<Vec<Rule<String>>> = Lazy::new(|| {
    vec![
        rule(r"\bpack\s*of\s*(\d+)\b", |c| Some(format!("pack of {}", &c[1]))),
        rule(
            r"\b(\d+(?:\.\d+)?)\s*(kgs?|gms?|grams?|g|mg|ltr|litres?|liters?|l|ml|pcs|pieces?|units?|cm|mm|inch(?:es)?|gb|tb)\b",
            sized,
        ),
    ]
});

static AMOUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").unwrap());

const LEADING_STOPWORDS: &[&str] = &[
    "fresh", "buy", "best", "new", "the", "top", "organic", "premium", "demo", "online", "shop",
    "order", "get", "a", "an", "pure", "natural", "original", "official", "price", "sale", "deal",
    "deals", "cheap", "combo", "pack", "set", "latest", "exclusive", "indian", "india", "from",
];

pub fn extract_price(text: &str) -> String {
    first_match(&PRICE_RULES, &text.to_lowercase()).unwrap_or_else(|| PRICE_NOT_AVAILABLE.to_string())
}

/// Numeric value of a canonical price string; `None` for the sentinel.
pub fn parse_price_amount(price: &str) -> Option<f64> {
    let raw = AMOUNT.find(price)?.as_str().replace(',', "");
    raw.parse::<f64>().ok()
}

pub fn extract_discount(text: &str) -> String {
    first_match(&DISCOUNT_RULES, &text.to_lowercase()).unwrap_or_default()
}

pub fn extract_rating(text: &str) -> Option<f32> {
    first_match(&RATING_RULES, &text.to_lowercase())
}

pub fn extract_delivery(text: &str) -> String {
    first_match(&DELIVERY_RULES, &text.to_lowercase()).unwrap_or_default()
}

/// Minute count stated in a delivery string ("10 minutes" → 10).
pub fn delivery_minutes(delivery: &str) -> Option<u32> {
    MINUTES
        .captures(&delivery.to_lowercase())
        .and_then(|caps| caps[1].parse::<u32>().ok())
}

pub fn extract_brand(title: &str, text: &str) -> Option<String> {
    if let Some(brand) = first_match(&BRAND_RULES, text) {
        return Some(brand);
    }

    let tokens: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    let lexicon = Lexicon::shared();
    if let Some(known) = tokens.iter().find(|t| lexicon.is_brand(t)) {
        return Some(capitalize(known));
    }

    let lead = title.split_whitespace().next()?;
    let lead = lead.trim_matches(|c: char| !c.is_alphanumeric());
    let starts_upper = lead.chars().next().map(|c| c.is_uppercase()).unwrap_or(false);
    if lead.chars().count() >= 2
        && starts_upper
        && lead.chars().all(|c| c.is_alphabetic())
        && !LEADING_STOPWORDS.contains(&lead.to_lowercase().as_str())
    {
        Some(lead.to_string())
    } else {
        None
    }
}

pub fn extract_size(text: &str) -> Option<String> {
    first_match(&SIZE_RULES, &text.to_lowercase())
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// MRP when stated, otherwise derived from a percentage discount.
fn original_price(lower: &str, price: &str, discount: &str) -> Option<String> {
    if let Some(mrp) = first_match(&MRP_RULES, lower) {
        if mrp != price {
            return Some(mrp);
        }
    }

    let percent: f64 = discount.strip_suffix("% OFF")?.parse().ok()?;
    let amount = parse_price_amount(price)?;
    if percent <= 0.0 || percent >= 100.0 {
        return None;
    }
    Some(format!("₹{}", (amount / (1.0 - percent / 100.0)).round() as i64))
}

pub fn extract(hit: &SearchHit) -> ProductFields {
    let text = format!("{} {}", hit.title, hit.snippet);
    let lower = text.to_lowercase();

    let price = extract_price(&text);
    let discount = extract_discount(&text);
    let original_price = if price == PRICE_NOT_AVAILABLE {
        None
    } else {
        original_price(&lower, &price, &discount)
    };

    ProductFields {
        original_price,
        discount,
        rating: extract_rating(&text),
        delivery: extract_delivery(&text),
        brand: extract_brand(&hit.title, &text),
        size: extract_size(&text),
        availability: if lower.contains("out of stock") {
            "Out of Stock".to_string()
        } else {
            "In Stock".to_string()
        },
        price,
    }
}

/// Marketplace display name from the URL host.
pub fn seller_from_url(url: &str) -> String {
    const SELLERS: &[(&str, &str)] = &[
        ("bigbasket.com", "BigBasket"),
        ("amazon.in", "Amazon"),
        ("flipkart.com", "Flipkart"),
        ("zeptonow.com", "Zepto"),
        ("zepto.in", "Zepto"),
        ("blinkit.com", "Blinkit"),
        ("swiggy.com", "Swiggy Instamart"),
        ("dunzo.com", "Dunzo"),
        ("jiomart.com", "JioMart"),
        ("myntra.com", "Myntra"),
        ("snapdeal.com", "Snapdeal"),
    ];
    let lower = url.to_lowercase();
    SELLERS
        .iter()
        .find(|(domain, _)| lower.contains(domain))
        .map(|(_, seller)| seller.to_string())
        .unwrap_or_else(|| "Online Store".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_keeps_grouping_and_prefers_rupee_symbol() {
        assert_eq!(extract_price("Price: ₹1,299 only"), "₹1,299");
        assert_eq!(extract_price("Rs. 450 per pack"), "₹450");
        assert_eq!(extract_price("INR 99.50"), "₹99.50");
        assert_eq!(extract_price("now $25"), "₹25");
        assert_eq!(extract_price("just 120 rupees"), "₹120");
    }

    #[test]
    fn price_miss_is_the_sentinel() {
        assert_eq!(extract_price("fresh and crunchy"), PRICE_NOT_AVAILABLE);
        assert_eq!(extract_price(""), PRICE_NOT_AVAILABLE);
        // "hours" must not read as "rs"
        assert_eq!(extract_price("ships in 5 hours 30 minutes"), PRICE_NOT_AVAILABLE);
    }

    #[test]
    fn price_amounts_parse_without_grouping() {
        assert_eq!(parse_price_amount("₹1,299"), Some(1299.0));
        assert_eq!(parse_price_amount("₹99.50"), Some(99.5));
        assert_eq!(parse_price_amount(PRICE_NOT_AVAILABLE), None);
    }

    #[test]
    fn discount_patterns_in_order() {
        assert_eq!(extract_discount("Flat 25% off today"), "25% OFF");
        assert_eq!(extract_discount("Save ₹200 on combo"), "Save ₹200");
        assert_eq!(extract_discount("10 % discount for members"), "10% OFF");
        assert_eq!(extract_discount("100% cotton"), "");
        assert_eq!(extract_discount("no offers"), "");
    }

    #[test]
    fn rating_patterns_and_range_check() {
        assert_eq!(extract_rating("4.2 out of 5 stars"), Some(4.2));
        assert_eq!(extract_rating("rated 4.5/5 by buyers"), Some(4.5));
        assert_eq!(extract_rating("Rating: 3.9"), Some(3.9));
        assert_eq!(extract_rating("4 stars"), Some(4.0));
        assert_eq!(extract_rating("rated 8 out of 5"), None);
        assert_eq!(extract_rating("no reviews yet"), None);
    }

    #[test]
    fn delivery_patterns_in_order() {
        assert_eq!(extract_delivery("Get it in 10 minutes delivery"), "10 minutes delivery");
        assert_eq!(extract_delivery("Instant Delivery available"), "instant delivery");
        assert_eq!(extract_delivery("Fresh Tomato ₹40/kg, same day delivery"), "same day delivery");
        assert_eq!(extract_delivery("next-day delivery"), "next-day delivery");
        assert_eq!(extract_delivery("delivered within 2 days"), "delivered within 2 days");
        assert_eq!(extract_delivery("Free delivery over ₹199"), "free delivery");
        assert_eq!(extract_delivery("Express Delivery"), "express delivery");
        assert_eq!(extract_delivery("30 days return"), "");
    }

    #[test]
    fn minutes_are_read_from_delivery_strings() {
        assert_eq!(delivery_minutes("10 minutes"), Some(10));
        assert_eq!(delivery_minutes("8 mins delivery"), Some(8));
        assert_eq!(delivery_minutes("same day delivery"), None);
        assert_eq!(delivery_minutes(""), None);
    }

    #[test]
    fn brand_heuristics() {
        assert_eq!(extract_brand("Toned Milk", "Toned Milk Brand: Nandini 500 ml"), Some("Nandini".into()));
        assert_eq!(extract_brand("Basmati Rice", "Basmati Rice by Daawat 5 kg"), Some("Daawat".into()));
        assert_eq!(extract_brand("amul taaza", "amul taaza toned milk"), Some("Amul".into()));
        assert_eq!(extract_brand("Tata Salt 1 kg", "Tata Salt 1 kg iodised"), Some("Tata".into()));
        assert_eq!(extract_brand("Fresh Tomato", "Fresh Tomato ₹40/kg"), None);
    }

    #[test]
    fn size_heuristics() {
        assert_eq!(extract_size("Amul Taaza 500 ml pouch"), Some("500 ml".into()));
        assert_eq!(extract_size("Aashirvaad Atta 5kg"), Some("5 kg".into()));
        assert_eq!(extract_size("Galaxy M14 (128 GB)"), Some("128 GB".into()));
        assert_eq!(extract_size("Maggi pack of 12"), Some("pack of 12".into()));
        assert_eq!(extract_size("Fresh Tomato ₹40/kg"), None);
    }

    #[test]
    fn extract_fills_every_field_independently() {
        let hit = SearchHit::new(
            "Fresh Tomato",
            "https://www.bigbasket.com/pd/tomato",
            "Fresh Tomato ₹40/kg, same day delivery",
        );
        let fields = extract(&hit);
        assert_eq!(fields.price, "₹40");
        assert!(fields.delivery.contains("same day"));
        assert_eq!(fields.rating, None);
        assert_eq!(fields.discount, "");
        assert_eq!(fields.original_price, None);
        assert_eq!(fields.availability, "In Stock");
    }

    #[test]
    fn original_price_from_mrp_or_discount() {
        let derived = SearchHit::new("Ghee 1 l", "https://x.in", "₹600 (25% off)");
        assert_eq!(extract(&derived).original_price, Some("₹800".into()));

        let stated = SearchHit::new("Ghee", "https://x.in", "Deal ₹560 MRP ₹700, out of stock");
        let fields = extract(&stated);
        assert_eq!(fields.original_price, Some("₹700".into()));
        assert_eq!(fields.availability, "Out of Stock");
    }

    #[test]
    fn sellers_come_from_the_host() {
        assert_eq!(seller_from_url("https://www.amazon.in/dp/B0"), "Amazon");
        assert_eq!(seller_from_url("https://example.com/x"), "Online Store");
    }
}
