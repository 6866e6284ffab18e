//! One-shot chat completion invoker
//!
//! Builds a single request, sends it through a [`Provider`], and reports the
//! outcome: the first choice's text on the output stream, or exactly one
//! diagnostic line on the diagnostic stream. The outcome is also returned as a
//! typed result so callers can pick an exit status.

use crate::core::config::Config;
use crate::core::constants::diagnostic;
use crate::core::provider::{Provider, ProviderError};
use crate::core::providers::OpenAIProvider;
use crate::models::openai::{EmptyConversation, OpenAIChatCompletionRequest, OpenAIMessage};
use std::fmt::Display;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Ways a completion call can fail
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error(transparent)]
    EmptyConversation(#[from] EmptyConversation),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("completion service returned no choices with content")]
    EmptyResponse,

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Send `request` and return the first choice's content
///
/// Every call gets a fresh request id; nothing is carried between calls.
///
/// # Errors
///
/// Returns [`InvokeError::Provider`] if the service call fails and
/// [`InvokeError::EmptyResponse`] if it answers without usable content.
pub async fn complete(
    provider: &dyn Provider,
    request: &OpenAIChatCompletionRequest,
) -> Result<String, InvokeError> {
    let request_id = Uuid::new_v4().to_string();
    info!(
        request_id = %request_id,
        provider = provider.provider_name(),
        model = %request.model,
        messages = request.messages().len(),
        "Sending chat completion request"
    );

    let response = provider.create_chat_completion(request, &request_id).await?;
    debug!(
        request_id = %request_id,
        response_id = %response.id,
        model = %response.model,
        choices = response.choices.len(),
        finish_reason = ?response.choices.first().and_then(|c| c.finish_reason.as_deref()),
        total_tokens = ?response.usage.as_ref().map(|u| u.total_tokens),
        "Received response"
    );

    response
        .first_content()
        .map(str::to_string)
        .ok_or(InvokeError::EmptyResponse)
}

/// Write one diagnostic line: `prefix`, a space, then `err`
///
/// Newlines inside the error text are flattened so the diagnostic stays on a
/// single line.
pub fn write_diagnostic<D: Write + ?Sized>(diag: &mut D, prefix: &str, err: &dyn Display) {
    let message = err.to_string().replace(['\r', '\n'], " ");
    if let Err(e) = writeln!(diag, "{prefix} {message}") {
        warn!("Failed to write diagnostic: {}", e);
    }
}

/// Issues the default one-message request against a provider
pub struct Invoker {
    provider: Arc<dyn Provider>,
    model: String,
    prompt: String,
}

impl Invoker {
    /// Create an invoker over an already constructed provider
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            prompt: prompt.into(),
        }
    }

    /// Build the HTTP provider from configuration, injecting the credential
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::MissingCredential`] when no key is configured and
    /// [`InvokeError::Provider`] if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, InvokeError> {
        let provider = build_provider(config)?;
        Ok(Self::new(provider, &config.model, &config.prompt))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The single-user-message request this invoker sends
    ///
    /// # Errors
    ///
    /// Never fails in practice; the conversation always holds one message.
    pub fn default_request(&self) -> Result<OpenAIChatCompletionRequest, InvokeError> {
        Ok(OpenAIChatCompletionRequest::new(
            &self.model,
            vec![OpenAIMessage::user(&self.prompt)],
        )?)
    }

    /// Send `request` and return the first choice's content
    ///
    /// # Errors
    ///
    /// See [`complete`].
    pub async fn invoke(&self, request: &OpenAIChatCompletionRequest) -> Result<String, InvokeError> {
        complete(self.provider.as_ref(), request).await
    }

    /// Run the default request and report the outcome
    ///
    /// On success the content plus a newline goes to `out`. On failure one
    /// diagnostic line goes to `diag` and `out` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns whatever [`Invoker::invoke`] returns, or
    /// [`InvokeError::Output`] if `out` cannot be written.
    pub async fn run<O, D>(&self, out: &mut O, diag: &mut D) -> Result<String, InvokeError>
    where
        O: Write + ?Sized,
        D: Write + ?Sized,
    {
        let outcome = match self.default_request() {
            Ok(request) => self.invoke(&request).await,
            Err(e) => Err(e),
        };

        let outcome = outcome.and_then(|content| {
            writeln!(out, "{content}")?;
            out.flush()?;
            Ok(content)
        });

        if let Err(ref err) = outcome {
            write_diagnostic(diag, diagnostic::INVOKE, err);
        }

        outcome
    }
}

/// Construct the configured HTTP provider
///
/// # Errors
///
/// Returns [`InvokeError::MissingCredential`] when no key is configured and
/// [`InvokeError::Provider`] if the HTTP client cannot be built.
pub fn build_provider(config: &Config) -> Result<Arc<dyn Provider>, InvokeError> {
    let api_key = config.credential()?;
    if !config.validate_api_key() {
        warn!("API key does not look like an OpenAI key; sending it anyway");
    }

    let provider = OpenAIProvider::new(
        api_key.to_string(),
        config.base_url.clone(),
        config.request_timeout,
        config.azure_api_version.clone(),
    )?;
    Ok(Arc::new(provider))
}
