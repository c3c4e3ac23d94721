// src/error.rs
// Error kinds for every outbound call, plus the one rule that turns them into fallbacks.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt::Display;
use thiserror::Error;
use tracing::warn;

/// Search API failures. Every variant degrades to demo data at the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("search API key is not configured")]
    MissingCredential,
    #[error("search request failed: {0}")]
    Transport(String),
    #[error("search API returned HTTP {0}")]
    Status(u16),
    #[error("search response could not be decoded: {0}")]
    Decode(String),
}

/// LLM failures. The narrative falls back to a simpler prompt, then to a template.
#[derive(Debug, Error)]
pub enum BrainError {
    #[error("LLM API key is not configured")]
    MissingCredential,
    #[error("LLM request failed: {0}")]
    Transport(String),
    #[error("LLM API returned HTTP {0}")]
    Status(u16),
    #[error("LLM returned no text")]
    EmptyResponse,
}

/// Product page fetch failures, reported per link.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("access denied (HTTP {0})")]
    Access(u16),
    #[error("page returned HTTP {0}")]
    Status(u16),
    #[error("page has no readable title")]
    Parsing,
}

/// Errors that reach the HTTP surface.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        ApiError::Internal(format!("worker pool unavailable: {}", e))
    }
}

/// On `Err`, log the failure and substitute the documented fallback value.
pub trait OrFallback<T> {
    fn or_fallback<F: FnOnce() -> T>(self, what: &str, fallback: F) -> T;
}

impl<T, E: Display> OrFallback<T> for Result<T, E> {
    fn or_fallback<F: FnOnce() -> T>(self, what: &str, fallback: F) -> T {
        match self {
            Ok(value) => value,
            Err(e) => {
                warn!("⚠️ {}: {} (using fallback)", what, e);
                fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_values_pass_through() {
        let r: Result<u32, GatewayError> = Ok(7);
        assert_eq!(r.or_fallback("search", || 0), 7);
    }

    #[test]
    fn errors_take_the_fallback() {
        let r: Result<u32, GatewayError> = Err(GatewayError::Status(503));
        assert_eq!(r.or_fallback("search", || 42), 42);
    }

    #[test]
    fn api_errors_map_to_status_codes() {
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("session".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::NotFound("session".into()).to_string(), "session not found");
    }
}
