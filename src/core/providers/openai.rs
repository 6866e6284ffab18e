//! OpenAI provider implementation

use crate::core::provider::{Provider, ProviderError};
use crate::models::openai::{OpenAIChatCompletionRequest, OpenAIChatCompletionResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// OpenAI provider (supports OpenAI and Azure OpenAI)
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    api_version: Option<String>,
}

impl std::fmt::Debug for OpenAIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIProvider")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    ///
    /// # Arguments
    ///
    /// * `api_key` - OpenAI API key
    /// * `base_url` - OpenAI API base URL or Azure endpoint
    /// * `timeout` - Request timeout in seconds
    /// * `api_version` - Optional Azure API version (enables Azure mode)
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Setup`] if the HTTP client cannot be built.
    pub fn new(
        api_key: String,
        base_url: String,
        timeout: u64,
        api_version: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| ProviderError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version,
        })
    }

    /// Classify OpenAI errors and provide helpful messages
    fn classify_error(error_detail: &str) -> String {
        let error_lower = error_detail.to_lowercase();

        if error_lower.contains("unsupported_country_region_territory")
            || error_lower.contains("country, region, or territory not supported")
        {
            return "OpenAI API is not available in your region. Consider using a VPN or Azure OpenAI service.".to_string();
        }

        if error_lower.contains("invalid_api_key") || error_lower.contains("unauthorized") {
            return "Invalid API key. Please check your OPENAI_API_KEY configuration.".to_string();
        }

        if error_lower.contains("rate_limit") || error_lower.contains("quota") {
            return "Rate limit exceeded. Please wait and try again, or upgrade your API plan."
                .to_string();
        }

        if error_lower.contains("model")
            && (error_lower.contains("not found") || error_lower.contains("does not exist"))
        {
            return "Model not found. Please check your model configuration.".to_string();
        }

        if error_lower.contains("billing") || error_lower.contains("payment") {
            return "Billing issue. Please check your OpenAI account billing status.".to_string();
        }

        // Prefer the service's own message over the raw JSON envelope
        serde_json::from_str::<serde_json::Value>(error_detail)
            .ok()
            .and_then(|body| {
                body.pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| error_detail.to_string())
    }

    fn completions_url(&self, model: &str) -> String {
        match &self.api_version {
            Some(api_version) => format!(
                "{}/openai/deployments/{}/chat/completions?api-version={}",
                self.base_url, model, api_version
            ),
            None => format!("{}/chat/completions", self.base_url),
        }
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    async fn create_chat_completion(
        &self,
        request: &OpenAIChatCompletionRequest,
        request_id: &str,
    ) -> Result<OpenAIChatCompletionResponse, ProviderError> {
        let url = self.completions_url(&request.model);
        debug!(request_id, %url, "Posting chat completion");

        let mut req_builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        if self.api_version.is_some() {
            // Azure uses api-key header
            req_builder = req_builder.header("api-key", &self.api_key);
        } else {
            req_builder = req_builder.bearer_auth(&self.api_key);
        }

        let response = req_builder
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(request_id, status = status.as_u16(), "Completion service rejected request");
            let classified_error = Self::classify_error(&error_text);

            return Err(ProviderError::from_status(status.as_u16(), classified_error));
        }

        response
            .json::<OpenAIChatCompletionResponse>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }

    fn provider_name(&self) -> &str {
        if self.api_version.is_some() {
            "Azure OpenAI"
        } else {
            "OpenAI"
        }
    }
}
