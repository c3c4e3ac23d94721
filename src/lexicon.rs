// src/lexicon.rs
// THE LEXICON
// Single source of truth for transliterated-Hindi shopping vocabulary.
// Every consumer (normalizer, suggestions, categories) reads these tables.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;

/// Product vocabulary. Multi-word grocery names live here too so that
/// "moong dal" wins over the bare "dal" (longest key first).
pub const WORD_MAPPINGS: &[(&str, &str)] = &[
    // Vegetables
    ("tamatar", "tomato"),
    ("pyaaz", "onion"),
    ("pyaz", "onion"),
    ("aloo", "potato"),
    ("alu", "potato"),
    ("gajar", "carrot"),
    ("gajjar", "carrot"),
    ("baingan", "eggplant"),
    ("brinjal", "eggplant"),
    ("kheera", "cucumber"),
    ("khira", "cucumber"),
    ("palak", "spinach"),
    ("methi", "fenugreek"),
    ("bhindi", "okra"),
    ("karela", "bitter gourd"),
    ("matar", "green peas"),
    ("gobhi", "cauliflower"),
    ("lauki", "bottle gourd"),
    ("kaddu", "pumpkin"),
    ("shimla mirch", "capsicum"),
    // Herbs & spices
    ("kothimbir", "coriander"),
    ("kothmir", "coriander"),
    ("dhaniya", "coriander"),
    ("dhania", "coriander"),
    ("pudina", "mint"),
    ("adrak", "ginger"),
    ("lehsun", "garlic"),
    ("hari mirch", "green chili"),
    ("lal mirch", "red chili"),
    ("haldi", "turmeric"),
    ("jeera", "cumin"),
    // Dairy
    ("doodh", "milk"),
    ("dudh", "milk"),
    ("paneer", "cottage cheese"),
    ("ghee", "clarified butter"),
    ("dahi", "yogurt"),
    ("makhan", "butter"),
    ("malai", "cream"),
    // Grains & pulses
    ("atta", "wheat flour"),
    ("maida", "refined flour"),
    ("besan", "gram flour"),
    ("suji", "semolina"),
    ("poha", "flattened rice"),
    ("daliya", "broken wheat"),
    ("chawal", "rice"),
    ("chaval", "rice"),
    ("daal", "lentils"),
    ("dal", "lentils"),
    ("moong dal", "green gram lentils"),
    ("toor dal", "pigeon pea lentils"),
    ("chana dal", "split chickpea lentils"),
    ("masoor dal", "red lentils"),
    ("urad dal", "black gram lentils"),
    ("rajma", "kidney beans"),
    ("chana", "chickpeas"),
    ("kabuli chana", "white chickpeas"),
    // Pantry
    ("tel", "cooking oil"),
    ("sarson ka tel", "mustard oil"),
    ("nariyal ka tel", "coconut oil"),
    ("namak", "salt"),
    ("chini", "sugar"),
    ("gud", "jaggery"),
    ("namkeen", "savory snacks"),
    ("mithai", "indian sweets"),
    ("chai", "tea"),
    ("paani", "water"),
    // Everything else
    ("headphone", "headphones"),
    ("kapda", "clothes"),
    ("pant", "pants"),
];

/// Conversational phrases, applied after the word stage.
pub const PHRASE_MAPPINGS: &[(&str, &str)] = &[
    ("kya chahiye", "what do you want"),
    ("kya hai", "what is"),
    ("kahan hai", "where is"),
    ("kitne ka", "how much"),
    ("kaise hai", "how is"),
    ("acha hai", "good"),
    ("bura hai", "bad"),
    ("mehenga", "expensive"),
    ("sasta", "cheap"),
    ("accha", "good"),
    ("bura", "bad"),
];

/// Whole-word tokens that mark a query as transliterated Hindi.
pub const HINDI_INDICATORS: &[&str] = &[
    "kya", "kaise", "kahan", "kab", "kaun", "hai", "ho", "aap", "tum", "hum", "wo", "ye", "ka",
    "ki", "ke", "kaa", "kii", "kee", "se", "par", "pe", "ko", "chahiye", "kitna", "kitne",
    "mujhe", "wala", "wali",
];

/// Never translated, even if a lexicon key collides with them.
pub const BRAND_NAMES: &[&str] = &[
    "amul", "nirma", "surf", "rin", "wheel", "ariel", "tide", "colgate", "closeup", "pepsodent",
    "samsung", "apple", "nokia", "micromax", "lava", "karbonn", "intex", "panasonic", "lg", "sony",
    "philips", "whirlpool", "godrej", "bajaj", "usha", "prestige", "butterfly", "havells",
    "anchor", "finolex",
];

pub const SHOPPING_KEYWORDS: &[&str] = &["buy", "purchase", "shop", "order", "online", "store", "price"];
pub const SHOPPING_SUFFIX: &str = "buy online price";

pub const COMMON_QUERIES: &[&str] = &[
    "tomato price",
    "onion online",
    "milk delivery",
    "bread fresh",
    "mobile phone",
    "laptop buy",
    "shirt men",
    "shoes women",
];

/// Sample entries shown on the language help page, grouped for display.
pub const LANGUAGE_HELP: &[(&str, &[&str])] = &[
    ("Vegetables & Fruits", &["tamatar", "pyaaz", "aloo", "gajar", "baingan", "kheera", "palak"]),
    ("Dairy & Groceries", &["doodh", "paneer", "ghee", "atta", "chawal", "daal", "chai"]),
    ("Electronics", &["mobile", "laptop", "computer", "headphone", "charger"]),
    ("Clothing", &["kapda", "shirt", "pant", "shoes", "bag"]),
];

/// Coarse grocery categories keyed by Hindi term or its English value.
pub const CATEGORY_HINTS: &[(&str, &str)] = &[
    ("palak", "Fresh Vegetables"),
    ("spinach", "Fresh Vegetables"),
    ("bhindi", "Fresh Vegetables"),
    ("okra", "Fresh Vegetables"),
    ("tamatar", "Fresh Vegetables"),
    ("tomato", "Fresh Vegetables"),
    ("onion", "Fresh Vegetables"),
    ("potato", "Fresh Vegetables"),
    ("doodh", "Dairy Products"),
    ("milk", "Dairy Products"),
    ("paneer", "Dairy Products"),
    ("cottage cheese", "Dairy Products"),
    ("chawal", "Grains & Cereals"),
    ("rice", "Grains & Cereals"),
    ("atta", "Grains & Cereals"),
    ("flour", "Grains & Cereals"),
    ("kothimbir", "Fresh Herbs"),
    ("coriander", "Fresh Herbs"),
    ("mint", "Fresh Herbs"),
    ("dal", "Pulses & Lentils"),
    ("lentils", "Pulses & Lentils"),
];

static SHARED: Lazy<Arc<Lexicon>> = Lazy::new(|| {
    Arc::new(Lexicon::from_tables(WORD_MAPPINGS, PHRASE_MAPPINGS, BRAND_NAMES))
});

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct HelpSection {
    pub category: String,
    pub entries: Vec<(String, String)>,
}

/// One substitution stage: a lookup map plus a longest-first alternation.
struct Stage {
    map: HashMap<String, String>,
    pattern: Option<Regex>,
}

impl Stage {
    fn build(entries: &[(&str, &str)], brands: &HashSet<String>) -> Self {
        let mut map = HashMap::new();
        for (key, value) in entries {
            let key = collapse_whitespace(&key.to_lowercase());
            if key.is_empty() || brands.contains(&key) {
                continue;
            }
            // First entry wins for duplicate keys.
            map.entry(key).or_insert_with(|| value.to_string());
        }

        let mut keys: Vec<&String> = map.keys().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let pattern = if keys.is_empty() {
            None
        } else {
            let alternation = keys
                .iter()
                .map(|k| regex::escape(k).replace(' ', r"\s+"))
                .collect::<Vec<_>>()
                .join("|");
            match Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("⚠️ LEXICON: substitution pattern rejected: {}", e);
                    None
                }
            }
        };

        Self { map, pattern }
    }

    fn apply(&self, text: &str) -> String {
        let Some(re) = &self.pattern else {
            return text.to_string();
        };
        re.replace_all(text, |caps: &Captures| {
            let matched = &caps[0];
            let key = collapse_whitespace(&matched.to_lowercase());
            self.map.get(&key).cloned().unwrap_or_else(|| matched.to_string())
        })
        .into_owned()
    }
}

pub struct Lexicon {
    words: Stage,
    phrases: Stage,
    indicators: HashSet<String>,
    brands: HashSet<String>,
}

impl Lexicon {
    /// The process-wide lexicon built from the static tables.
    pub fn shared() -> Arc<Lexicon> {
        SHARED.clone()
    }

    pub fn from_tables(words: &[(&str, &str)], phrases: &[(&str, &str)], brands: &[&str]) -> Self {
        let brands: HashSet<String> = brands.iter().map(|b| b.to_lowercase()).collect();
        Self {
            words: Stage::build(words, &brands),
            phrases: Stage::build(phrases, &brands),
            indicators: HINDI_INDICATORS.iter().map(|s| s.to_string()).collect(),
            brands,
        }
    }

    /// Word stage, then phrase stage. Case-insensitive, word-boundary anchored.
    pub fn translate(&self, text: &str) -> String {
        let after_words = self.words.apply(text);
        self.phrases.apply(&after_words)
    }

    pub fn is_indicator(&self, token: &str) -> bool {
        self.indicators.contains(token)
    }

    pub fn is_brand(&self, token: &str) -> bool {
        self.brands.contains(&token.to_lowercase())
    }

    /// Translation of a single key, word stage first.
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = collapse_whitespace(&key.to_lowercase());
        self.words
            .map
            .get(&key)
            .or_else(|| self.phrases.map.get(&key))
            .map(String::as_str)
    }

    /// Grouped (key, value) pairs for the help page. Sample keys the lexicon
    /// does not know are skipped; every phrase is listed at the end.
    pub fn help(&self) -> Vec<HelpSection> {
        let mut sections: Vec<HelpSection> = LANGUAGE_HELP
            .iter()
            .map(|(category, keys)| HelpSection {
                category: category.to_string(),
                entries: keys
                    .iter()
                    .filter_map(|k| self.get(k).map(|v| (k.to_string(), v.to_string())))
                    .collect(),
            })
            .filter(|section| !section.entries.is_empty())
            .collect();

        let mut phrases: Vec<(String, String)> =
            self.phrases.map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        phrases.sort();
        if !phrases.is_empty() {
            sections.push(HelpSection {
                category: "Phrases".to_string(),
                entries: phrases,
            });
        }
        sections
    }

    /// All (key, value) pairs from both stages.
    pub fn entries(&self) -> impl Iterator<Item = (&String, &String)> {
        self.words.map.iter().chain(self.phrases.map.iter())
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn category_for(query: &str) -> String {
    let lower = query.to_lowercase();
    CATEGORY_HINTS
        .iter()
        .find(|(hint, _)| lower.contains(hint))
        .map(|(_, category)| category.to_string())
        .unwrap_or_else(|| "Grocery".to_string())
}
