//! Provider configuration and credential resolution.

use spellcheck_core::{Error, Result};
use std::fmt;
use std::time::Duration;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the model.
pub const MODEL_ENV: &str = "OPENAI_MODEL";
/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Settings for [`OpenAiProvider`](crate::OpenAiProvider).
#[derive(Clone, PartialEq)]
pub struct OpenAiConfig {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAiConfig {
    /// Create a configuration with default settings and the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.1,
            max_tokens: 2000,
            timeout: Duration::from_secs(60),
        }
    }

    /// Resolve a configuration from an explicit key and an environment lookup.
    ///
    /// The explicit key wins over `OPENAI_API_KEY`; a missing or blank key is
    /// a configuration error. `OPENAI_MODEL` and `OPENAI_BASE_URL` override
    /// the defaults when set.
    pub fn resolve<F>(api_key: Option<String>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env(API_KEY_ENV).filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                Error::ConfigError(format!(
                    "an OpenAI API key is required (pass it as an argument or set {})",
                    API_KEY_ENV
                ))
            })?;

        let mut config = Self::new(api_key.trim());
        if let Some(model) = env(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            config = config.with_model(model.trim());
        }
        if let Some(url) = env(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }
        Ok(config)
    }

    /// Resolve against the process environment.
    pub fn from_env(api_key: Option<String>) -> Result<Self> {
        Self::resolve(api_key, |name| std::env::var(name).ok())
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL of the chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

// Keeps the key out of logs.
impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}
