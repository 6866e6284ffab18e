//! Provider implementations

#[cfg(test)]
pub mod fake;
pub mod openai;

pub use openai::OpenAIProvider;
