//! OpenAI API data models
//!
//! This module defines the request and response structures for the chat
//! completion endpoint. Only the fields this tool sends or reads are modeled;
//! unknown response fields are ignored on deserialization.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::constants::response_format;

/// Returned when a request is built without any message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("chat completion request needs at least one message")]
pub struct EmptyConversation;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// OpenAI message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl OpenAIMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
        }
    }
}

/// Output format requested from the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAIResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl OpenAIResponseFormat {
    pub fn text() -> Self {
        Self {
            format_type: response_format::TEXT.to_string(),
        }
    }

    pub fn json_object() -> Self {
        Self {
            format_type: response_format::JSON_OBJECT.to_string(),
        }
    }
}

/// OpenAI chat completion request
///
/// The message list is private so the non-empty invariant established by
/// [`OpenAIChatCompletionRequest::new`] cannot be broken afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct OpenAIChatCompletionRequest {
    pub model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<OpenAIResponseFormat>,
}

impl OpenAIChatCompletionRequest {
    /// Build a request for `model` with the given conversation
    ///
    /// # Errors
    ///
    /// Returns [`EmptyConversation`] if `messages` is empty.
    pub fn new(
        model: impl Into<String>,
        messages: Vec<OpenAIMessage>,
    ) -> Result<Self, EmptyConversation> {
        if messages.is_empty() {
            return Err(EmptyConversation);
        }

        Ok(Self {
            model: model.into(),
            messages,
            temperature: None,
            response_format: None,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_response_format(mut self, format: OpenAIResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn messages(&self) -> &[OpenAIMessage] {
        &self.messages
    }
}

/// OpenAI chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<OpenAIChoice>,
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

impl OpenAIChatCompletionResponse {
    /// Text of the first choice, if the service returned one
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

/// OpenAI choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIChoice {
    #[serde(default)]
    pub index: u32,
    pub message: OpenAIMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// OpenAI usage statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_conversation_rejected() {
        let result = OpenAIChatCompletionRequest::new("gpt-4-turbo", Vec::new());
        assert_eq!(result.unwrap_err(), EmptyConversation);
    }

    #[test]
    fn test_request_serializes_only_set_fields() {
        let request =
            OpenAIChatCompletionRequest::new("gpt-4-turbo", vec![OpenAIMessage::user("Hola")])
                .unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "gpt-4-turbo",
                "messages": [{"role": "user", "content": "Hola"}]
            })
        );
    }

    #[test]
    fn test_request_with_json_format() {
        let request =
            OpenAIChatCompletionRequest::new("gpt-4o-mini", vec![OpenAIMessage::system("x")])
                .unwrap()
                .with_temperature(0.0)
                .with_response_format(OpenAIResponseFormat::json_object());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_format"], json!({"type": "json_object"}));
        assert_eq!(value["temperature"], json!(0.0));
        assert_eq!(value["messages"][0]["role"], "system");
    }

    #[test]
    fn test_response_ignores_unknown_fields() {
        let response: OpenAIChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "gpt-4-turbo",
            "system_fingerprint": "fp_123",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Node.js es un entorno."},
                "logprobs": null,
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();
        assert_eq!(response.first_content(), Some("Node.js es un entorno."));
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_first_content_without_choices() {
        let response: OpenAIChatCompletionResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(response.first_content(), None);
    }

    #[test]
    fn test_first_content_with_null_content() {
        let response: OpenAIChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        }))
        .unwrap();
        assert_eq!(response.first_content(), None);
    }
}
