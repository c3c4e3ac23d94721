// src/normalizer.rs
// Query detection, translation and shopping-context enhancement.

use std::sync::Arc;
use tracing::info;

use crate::lexicon::{self, Lexicon, COMMON_QUERIES, SHOPPING_KEYWORDS, SHOPPING_SUFFIX};
use crate::models::Query;

// Keys shorter than this only count as whole tokens ("alu" must not fire on "value").
const SUBSTRING_MIN_KEY_LEN: usize = 4;
const MAX_SUGGESTIONS: usize = 5;

#[derive(Clone)]
pub struct QueryNormalizer {
    lexicon: Arc<Lexicon>,
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self::new(Lexicon::shared())
    }
}

impl QueryNormalizer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// True if a whole token is a Hindi indicator or a lexicon key shows up in the text.
    pub fn is_probably_translated_language(&self, query: &str) -> bool {
        let lower = query.to_lowercase();
        let tokens: Vec<&str> = tokenize(&lower);

        if tokens.iter().any(|t| self.lexicon.is_indicator(t)) {
            return true;
        }

        let collapsed = lexicon::collapse_whitespace(&lower);
        self.lexicon.entries().any(|(key, _)| {
            if key.len() >= SUBSTRING_MIN_KEY_LEN {
                collapsed.contains(key.as_str())
            } else {
                tokens.iter().any(|t| t == key)
            }
        })
    }

    /// Lexicon substitution only.
    pub fn translate(&self, query: &str) -> String {
        lexicon::collapse_whitespace(&self.lexicon.translate(query))
    }

    /// Appends the shopping suffix unless a shopping keyword is already present.
    pub fn enhance(&self, query: &str) -> String {
        let lower = query.to_lowercase();
        if SHOPPING_KEYWORDS.iter().any(|k| lower.contains(k)) {
            query.to_string()
        } else if query.is_empty() {
            SHOPPING_SUFFIX.to_string()
        } else {
            format!("{} {}", query, SHOPPING_SUFFIX)
        }
    }

    pub fn normalize(&self, query: &str) -> String {
        self.enhance(&self.translate(query.trim()))
    }

    pub fn prepare(&self, raw: &str) -> Query {
        let raw = raw.trim();
        let is_translated_language = self.is_probably_translated_language(raw);
        let translated = self.translate(raw);
        let normalized = self.normalize(raw);

        if is_translated_language && translated != raw {
            info!("🔤 NORMALIZER: Translated query '{}' → '{}'", raw, translated);
        }

        Query {
            raw: raw.to_string(),
            is_translated_language,
            translated,
            normalized,
        }
    }

    /// Up to five suggestions: lexicon entries like "tamatar (tomato)", then common queries.
    pub fn suggest(&self, partial: &str) -> Vec<String> {
        let partial = partial.trim().to_lowercase();
        if partial.is_empty() {
            return COMMON_QUERIES.iter().take(MAX_SUGGESTIONS).map(|s| s.to_string()).collect();
        }

        let mut lexicon_hits: Vec<String> = self
            .lexicon
            .entries()
            .filter(|(k, v)| k.starts_with(&partial) || v.starts_with(&partial))
            .map(|(k, v)| format!("{} ({})", k, v))
            .collect();
        // HashMap order is not stable
        lexicon_hits.sort();

        lexicon_hits
            .into_iter()
            .chain(
                COMMON_QUERIES
                    .iter()
                    .filter(|q| q.contains(partial.as_str()))
                    .map(|q| q.to_string()),
            )
            .take(MAX_SUGGESTIONS)
            .collect()
    }
}

fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{PHRASE_MAPPINGS, WORD_MAPPINGS};

    fn normalizer() -> QueryNormalizer {
        QueryNormalizer::default()
    }

    fn has_word(text: &str, word: &str) -> bool {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();
        let target: Vec<&str> = word.split_whitespace().collect();
        words.windows(target.len()).any(|w| w == target.as_slice())
    }

    #[test]
    fn every_key_is_replaced_by_its_value() {
        let n = normalizer();
        for (key, value) in WORD_MAPPINGS.iter().chain(PHRASE_MAPPINGS.iter()) {
            let out = n.normalize(&format!("need {} today", key));
            assert!(out.contains(value), "{} -> {}", key, out);
            assert!(!has_word(&out, key), "{} still present in {}", key, out);
        }
    }

    #[test]
    fn detects_hindi_and_ignores_plain_english() {
        let n = normalizer();
        assert!(!n.is_probably_translated_language("buy laptop online"));
        assert!(n.is_probably_translated_language("laptop kya price hai"));
        assert!(n.is_probably_translated_language("tamatar"));
        assert!(n.is_probably_translated_language("ek kilo Pyaaz"));
    }

    #[test]
    fn short_keys_need_a_whole_token() {
        let n = normalizer();
        assert!(!n.is_probably_translated_language("value pack"));
        assert!(n.is_probably_translated_language("alu 2kg"));
    }

    #[test]
    fn suffix_is_added_only_when_missing() {
        let n = normalizer();
        assert_eq!(n.normalize("tamatar"), "tomato buy online price");
        assert_eq!(n.normalize("order milk"), "order milk");
    }

    #[test]
    fn normalize_is_idempotent_on_english() {
        let n = normalizer();
        for q in ["laptop", "tomato buy online price", "shoes women", "mobile phone"] {
            let once = n.normalize(q);
            assert_eq!(n.normalize(&once), once);
        }
    }

    #[test]
    fn prepare_keeps_translation_without_suffix() {
        let q = normalizer().prepare("  tamatar ");
        assert_eq!(q.raw, "tamatar");
        assert!(q.is_translated_language);
        assert_eq!(q.translated, "tomato");
        assert_eq!(q.normalized, "tomato buy online price");
    }

    #[test]
    fn suggestions_mix_lexicon_and_common_queries() {
        let n = normalizer();
        let s = n.suggest("tam");
        assert_eq!(s.first().map(String::as_str), Some("tamatar (tomato)"));
        assert!(n.suggest("tom").iter().any(|x| x == "tomato price"));
        assert!(n.suggest("").len() <= 5);
        assert!(n.suggest("a").len() <= 5);
    }
}
