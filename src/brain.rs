// src/brain.rs
// THE LANGUAGE MODEL BRIDGE
// One text-completion call per prompt. The reply is opaque narrative.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::BrainError;

pub trait LanguageModel: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, BrainError>;
}

// 1. The Data We Send
#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<PartIn<'a>>,
}

#[derive(Serialize)]
struct PartIn<'a> {
    text: &'a str,
}

// 2. The Data We Get Back
#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Deserialize, Debug)]
struct PartOut {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .map(|p| p.text)
            .find(|t| !t.trim().is_empty())
    }
}

/// Gemini `generateContent` client.
pub struct GeminiBrain {
    api_key: Option<String>,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl GeminiBrain {
    pub fn new(api_key: Option<String>, endpoint: &str, model: &str, timeout: Duration) -> Self {
        Self {
            api_key,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        let brain = Self::new(
            cfg.llm_api_key.clone(),
            &cfg.llm_endpoint,
            &cfg.llm_model,
            cfg.http_timeout(),
        );
        if brain.api_key.is_some() {
            info!("🧠 BRAIN: {} ready", brain.model);
        } else {
            info!("🧠 BRAIN: No LLM key, narratives will be templated");
        }
        brain
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent", self.endpoint, self.model)
    }
}

impl LanguageModel for GeminiBrain {
    fn generate(&self, prompt: &str) -> Result<String, BrainError> {
        let key = self.api_key.as_deref().ok_or(BrainError::MissingCredential)?;
        debug!("🧠 BRAIN: Sending {} chars to {}", prompt.len(), self.model);

        let client = reqwest::blocking::Client::new();
        let resp = client
            .post(self.url())
            .query(&[("key", key)])
            .json(&GenerateRequest {
                contents: vec![Content {
                    parts: vec![PartIn { text: prompt }],
                }],
            })
            .timeout(self.timeout)
            .send()
            .map_err(|e| BrainError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(BrainError::Status(resp.status().as_u16()));
        }

        let body: GenerateResponse = resp.json().map_err(|e| BrainError::Transport(e.to_string()))?;
        body.first_text().ok_or(BrainError::EmptyResponse)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Answers from a script; an exhausted script fails.
    pub struct ScriptedBrain {
        replies: Mutex<Vec<Result<String, BrainError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedBrain {
        pub fn new(mut replies: Vec<Result<String, BrainError>>) -> Self {
            replies.reverse();
            Self { replies: Mutex::new(replies), prompts: Mutex::new(Vec::new()) }
        }

        pub fn offline() -> Self {
            Self::new(Vec::new())
        }
    }

    impl LanguageModel for ScriptedBrain {
        fn generate(&self, prompt: &str) -> Result<String, BrainError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies.lock().unwrap().pop().unwrap_or(Err(BrainError::MissingCredential))
        }
    }

    #[test]
    fn reply_text_comes_from_the_first_candidate() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Buy the 1kg pack."}]}}]}"#,
        )
        .unwrap();
        assert_eq!(body.first_text().as_deref(), Some("Buy the 1kg pack."));
    }

    #[test]
    fn blocked_or_empty_replies_have_no_text() {
        let blocked: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(blocked.first_text().is_none());
        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.first_text().is_none());
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let brain = GeminiBrain::new(None, "http://127.0.0.1:9/", "m", Duration::from_secs(1));
        assert!(matches!(brain.generate("hi"), Err(BrainError::MissingCredential)));
        assert_eq!(brain.url(), "http://127.0.0.1:9/m:generateContent");
    }
}
