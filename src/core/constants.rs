//! Shared constants
//!
//! Defaults for the one-shot invocation, wire-level string values, and the
//! fixed prefixes written to the diagnostic stream.

/// Defaults used when neither the config file nor the command line override them
pub mod defaults {
    /// Chat completion endpoint base URL
    pub const BASE_URL: &str = "https://api.openai.com/v1";

    /// Model for the one-shot invocation and the context core
    pub const MODEL: &str = "gpt-4-turbo";

    /// Model used to route raw text to a merchant
    pub const ROUTING_MODEL: &str = "gpt-4o-mini";

    /// Prompt sent by the one-shot invocation
    pub const PROMPT: &str = "Hola, dime qué es Node.js en una frase";

    /// Request timeout in seconds
    pub const REQUEST_TIMEOUT: u64 = 90;

    /// Log level
    pub const LOG_LEVEL: &str = "info";

    /// Config file looked up when `CONFIG_PATH` is unset
    pub const CONFIG_FILE: &str = "config.toml";
}

/// Environment variable names
pub mod env {
    /// Completion service credential
    pub const API_KEY: &str = "OPENAI_API_KEY";

    /// Base URL override
    pub const BASE_URL: &str = "OPENAI_BASE_URL";

    /// Config file location
    pub const CONFIG_PATH: &str = "CONFIG_PATH";

    /// Log level override
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
}

/// Response format type constants
pub mod response_format {
    /// Free text output
    pub const TEXT: &str = "text";

    /// JSON object output
    pub const JSON_OBJECT: &str = "json_object";
}

/// Prefixes for the single diagnostic line written on failure
pub mod diagnostic {
    /// One-shot invocation failures
    pub const INVOKE: &str = "Error en la llamada a OpenAI:";

    /// Context core pipeline failures
    pub const CONTEXT: &str = "Error en el Context Core:";
}
