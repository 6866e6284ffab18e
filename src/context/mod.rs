//! Merchant context core
//!
//! A business-context agent built on the same provider as the one-shot
//! invoker: it routes raw text to a merchant, condenses it into a persisted
//! context, and derives CRM fields and query answers from that context.

pub mod agent;
pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod store;

use crate::core::invoker::InvokeError;
use agent::CoreMode;
use thiserror::Error;

/// Errors from the context core
#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error("merchant context required for {0} mode")]
    ContextRequired(CoreMode),

    #[error("{mode} mode returned invalid JSON: {source}")]
    InvalidJson {
        mode: CoreMode,
        source: serde_json::Error,
    },

    #[error("could not identify a merchant in the input text")]
    UnknownMerchant,

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
