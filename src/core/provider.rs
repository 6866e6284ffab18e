//! Provider abstraction over the completion service
//!
//! The invoker and the context core only talk to this trait, so the HTTP
//! client can be swapped for a fake in tests.

use crate::models::openai::{OpenAIChatCompletionRequest, OpenAIChatCompletionResponse};
use async_trait::async_trait;
use thiserror::Error;

/// Error types for provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("HTTP client setup failed: {0}")]
    Setup(String),
}

impl ProviderError {
    /// Map a non-success HTTP status and its already classified message
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => ProviderError::Authentication(message),
            429 => ProviderError::RateLimit(message),
            400 => ProviderError::BadRequest(message),
            _ => ProviderError::ApiError { status, message },
        }
    }
}

/// Trait for chat completion services
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send a non-streaming chat completion request
    ///
    /// `request_id` identifies the call in logs.
    async fn create_chat_completion(
        &self,
        request: &OpenAIChatCompletionRequest,
        request_id: &str,
    ) -> Result<OpenAIChatCompletionResponse, ProviderError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ProviderError::from_status(401, "x".into()),
            ProviderError::Authentication(_)
        ));
        assert!(matches!(
            ProviderError::from_status(429, "x".into()),
            ProviderError::RateLimit(_)
        ));
        assert!(matches!(
            ProviderError::from_status(400, "x".into()),
            ProviderError::BadRequest(_)
        ));
        assert!(matches!(
            ProviderError::from_status(503, "x".into()),
            ProviderError::ApiError { status: 503, .. }
        ));
    }
}
