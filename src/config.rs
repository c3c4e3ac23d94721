// src/config.rs
// Process-wide settings, read once at startup and never mutated afterwards.

use std::time::Duration;

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://google.serper.dev/search";
pub const DEFAULT_LLM_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_LLM_MODEL: &str = "gemini-1.5-flash";

// Values shipped in the sample .env that must not count as real credentials.
const PLACEHOLDER_KEYS: [&str; 2] = ["your_serper_api_key_here", "your_google_api_key_here"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub search_api_key: Option<String>,
    pub llm_api_key: Option<String>,
    pub search_endpoint: String,
    pub llm_endpoint: String,
    pub llm_model: String,
    pub http_timeout_secs: u64, // 10
    pub bind_addr: String,      // 127.0.0.1
    pub port: u16,              // 8080

    /// true: providers without live credentials get generated demo offers.
    /// false: they are reported as unavailable.
    pub demo_fallback: bool, // true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search_api_key: None,
            llm_api_key: None,
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            llm_endpoint: DEFAULT_LLM_ENDPOINT.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            http_timeout_secs: 10,
            bind_addr: "127.0.0.1".to_string(),
            port: 8080,
            demo_fallback: true,
        }
    }
}

impl AppConfig {
    /// - SERPER_API_KEY (optional)
    /// - GOOGLE_API_KEY (optional)
    /// - SEARCH_ENDPOINT (default google.serper.dev)
    /// - LLM_ENDPOINT / LLM_MODEL (default Gemini 1.5 Flash)
    /// - HTTP_TIMEOUT_SECS (default 10)
    /// - DUKAAN_BIND (default 127.0.0.1)
    /// - DUKAAN_PORT (default 8080)
    /// - DEMO_FALLBACK (bool, default true)
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        cfg.search_api_key = credential(std::env::var("SERPER_API_KEY").ok());
        cfg.llm_api_key = credential(std::env::var("GOOGLE_API_KEY").ok());

        if let Ok(v) = std::env::var("SEARCH_ENDPOINT") {
            cfg.search_endpoint = v;
        }
        if let Ok(v) = std::env::var("LLM_ENDPOINT") {
            cfg.llm_endpoint = v;
        }
        if let Ok(v) = std::env::var("LLM_MODEL") {
            cfg.llm_model = v;
        }
        if let Ok(v) = std::env::var("DUKAAN_BIND") {
            cfg.bind_addr = v;
        }

        cfg.http_timeout_secs = parse_env_u64("HTTP_TIMEOUT_SECS", cfg.http_timeout_secs).max(1);
        cfg.port = std::env::var("DUKAAN_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(cfg.port);
        cfg.demo_fallback = parse_env_bool("DEMO_FALLBACK", cfg.demo_fallback);

        cfg
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn has_search_key(&self) -> bool {
        self.search_api_key.is_some()
    }

    pub fn has_llm_key(&self) -> bool {
        self.llm_api_key.is_some()
    }
}

/// Blank and placeholder keys are treated as absent.
pub fn credential(raw: Option<String>) -> Option<String> {
    let key = raw?.trim().to_string();
    if key.is_empty() || PLACEHOLDER_KEYS.contains(&key.as_str()) {
        None
    } else {
        Some(key)
    }
}

fn parse_env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
