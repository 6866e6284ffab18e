//! Scripted provider for tests.
//!
//! Replies are handed out in order, cycling once exhausted, and every request
//! is recorded so tests can inspect what was sent.

use crate::core::provider::{Provider, ProviderError};
use crate::models::openai::{
    OpenAIChatCompletionRequest, OpenAIChatCompletionResponse, OpenAIChoice, OpenAIMessage, Role,
};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum FakeReply {
    Content(String),
    NoChoices,
    NetworkError(String),
    Status(u16, String),
}

impl FakeReply {
    pub fn content(text: impl Into<String>) -> Self {
        FakeReply::Content(text.into())
    }
}

#[derive(Debug)]
pub struct FakeProvider {
    replies: Vec<FakeReply>,
    next: AtomicUsize,
    requests: Mutex<Vec<(String, OpenAIChatCompletionRequest)>>,
}

impl FakeProvider {
    pub fn new(replies: Vec<FakeReply>) -> Self {
        Self {
            replies,
            next: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, with their request ids
    pub fn requests(&self) -> Vec<(String, OpenAIChatCompletionRequest)> {
        self.requests.lock().unwrap().clone()
    }

    fn response(content: Option<String>) -> OpenAIChatCompletionResponse {
        let choices = content
            .map(|text| {
                vec![OpenAIChoice {
                    index: 0,
                    message: OpenAIMessage {
                        role: Role::Assistant,
                        content: Some(text),
                    },
                    finish_reason: Some("stop".to_string()),
                }]
            })
            .unwrap_or_default();

        OpenAIChatCompletionResponse {
            id: "chatcmpl-fake".to_string(),
            object: "chat.completion".to_string(),
            created: 0,
            model: "fake".to_string(),
            choices,
            usage: None,
        }
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn create_chat_completion(
        &self,
        request: &OpenAIChatCompletionRequest,
        request_id: &str,
    ) -> Result<OpenAIChatCompletionResponse, ProviderError> {
        self.requests
            .lock()
            .unwrap()
            .push((request_id.to_string(), request.clone()));

        let index = self.next.fetch_add(1, Ordering::SeqCst);
        match &self.replies[index % self.replies.len()] {
            FakeReply::Content(text) => Ok(Self::response(Some(text.clone()))),
            FakeReply::NoChoices => Ok(Self::response(None)),
            FakeReply::NetworkError(message) => Err(ProviderError::Transport(message.clone())),
            FakeReply::Status(status, message) => {
                Err(ProviderError::from_status(*status, message.clone()))
            }
        }
    }

    fn provider_name(&self) -> &str {
        "Fake"
    }
}
