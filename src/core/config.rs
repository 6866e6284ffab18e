//! Application configuration management
//!
//! Settings come from an optional TOML file, then environment variables on
//! top. The credential is only ever read from the environment and is handed
//! to the provider explicitly.

use crate::core::constants::{defaults, env};
use crate::core::invoker::InvokeError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct OpenAIConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub azure_api_version: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvokeConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for InvokeConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            prompt: default_prompt(),
            request_timeout: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_routing_model")]
    pub routing_model: String,
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            routing_model: default_routing_model(),
            store_dir: default_store_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_model() -> String {
    defaults::MODEL.to_string()
}

fn default_prompt() -> String {
    defaults::PROMPT.to_string()
}

fn default_request_timeout() -> u64 {
    defaults::REQUEST_TIMEOUT
}

fn default_routing_model() -> String {
    defaults::ROUTING_MODEL.to_string()
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    defaults::LOG_LEVEL.to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub openai: OpenAIConfig,
    #[serde(default)]
    pub invoke: InvokeConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Application configuration
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct Config {
    /// Completion service credential, from `OPENAI_API_KEY`
    pub api_key: Option<String>,

    /// API base URL or Azure endpoint
    pub base_url: String,

    /// Azure API version (enables Azure mode)
    pub azure_api_version: Option<String>,

    /// Model for the one-shot invocation
    pub model: String,

    /// Prompt for the one-shot invocation
    pub prompt: String,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Model for the context core modes
    pub context_model: String,

    /// Model for merchant routing
    pub routing_model: String,

    /// Directory holding merchant context files
    pub store_dir: PathBuf,

    /// Logging level
    pub log_level: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("azure_api_version", &self.azure_api_version)
            .field("model", &self.model)
            .field("prompt", &self.prompt)
            .field("request_timeout", &self.request_timeout)
            .field("context_model", &self.context_model)
            .field("routing_model", &self.routing_model)
            .field("store_dir", &self.store_dir)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl From<TomlConfig> for Config {
    fn from(config: TomlConfig) -> Self {
        Config {
            api_key: None,
            base_url: config
                .openai
                .base_url
                .unwrap_or_else(|| defaults::BASE_URL.to_string()),
            azure_api_version: config.openai.azure_api_version,
            model: config.invoke.model,
            prompt: config.invoke.prompt,
            request_timeout: config.invoke.request_timeout,
            context_model: config.context.model,
            routing_model: config.context.routing_model,
            store_dir: config.context.store_dir,
            log_level: config.logging.log_level,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

impl Config {
    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns error if the text is not valid TOML for [`TomlConfig`].
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).context("Failed to parse TOML configuration")?;
        Ok(config.into())
    }

    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from the config file (if any) and the environment
    ///
    /// Looks for `CONFIG_PATH`, falling back to `config.toml` in the current
    /// directory. A missing default file is not an error; a missing file named
    /// by `CONFIG_PATH` is.
    ///
    /// # Errors
    ///
    /// Returns an error if the file named by `CONFIG_PATH` does not exist, or
    /// if the config file that is used cannot be read or is not valid TOML.
    pub fn from_env() -> Result<Self> {
        let base = match std::env::var(env::CONFIG_PATH) {
            Ok(path) => Self::from_file(path)?,
            Err(_) if Path::new(defaults::CONFIG_FILE).exists() => {
                Self::from_file(defaults::CONFIG_FILE)?
            }
            Err(_) => Self::default(),
        };
        Ok(base.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply environment-style overrides from `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(api_key) = non_blank(env::API_KEY) {
            self.api_key = Some(api_key.trim().to_string());
        }
        if let Some(base_url) = non_blank(env::BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(log_level) = non_blank(env::LOG_LEVEL) {
            self.log_level = log_level;
        }
        self
    }

    /// The credential to inject into the provider
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::MissingCredential`] when `OPENAI_API_KEY` was not set.
    pub fn credential(&self) -> Result<&str, InvokeError> {
        self.api_key
            .as_deref()
            .ok_or(InvokeError::MissingCredential(env::API_KEY))
    }

    /// Check the API key format
    ///
    /// OpenAI keys start with `sk-`; Azure keys have no fixed prefix.
    pub fn validate_api_key(&self) -> bool {
        match (&self.api_key, &self.azure_api_version) {
            (None, _) => false,
            (Some(key), None) => key.starts_with("sk-"),
            (Some(key), Some(_)) => !key.is_empty(),
        }
    }
}
