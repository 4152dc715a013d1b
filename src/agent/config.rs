//! Reasoning-engine configuration with builder pattern and environment
//! variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AgentError;

/// Default provider name.
pub const DEFAULT_PROVIDER: &str = "gemini";
/// Default chat model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Gemini's `OpenAI`-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
/// Default max tokens for conversational turns.
const DEFAULT_CHAT_MAX_TOKENS: u32 = 1024;
/// Default max tokens for triage summaries.
const DEFAULT_SUMMARY_MAX_TOKENS: u32 = 512;
/// Default sampling temperature for conversational turns.
const DEFAULT_TEMPERATURE: f32 = 0.2;
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Default maximum tool-calling rounds per turn.
const DEFAULT_MAX_TOOL_ITERATIONS: usize = 10;

/// Configuration for the reasoning engine.
#[derive(Clone)]
pub struct AgentConfig {
    /// Provider name (`gemini` or `openai`).
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: Option<String>,
    /// Model for conversational turns.
    pub chat_model: String,
    /// Model for triage summaries.
    pub summary_model: String,
    /// Maximum tokens for conversational responses.
    pub chat_max_tokens: u32,
    /// Maximum tokens for summaries.
    pub summary_max_tokens: u32,
    /// Sampling temperature for conversational turns.
    pub temperature: f32,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum tool-calling rounds within one turn.
    pub max_tool_iterations: usize,
    /// Directory containing prompt template files.
    ///
    /// When set, system and summary prompts are loaded from markdown files
    /// in this directory, falling back to compiled-in defaults for any
    /// missing files.
    pub prompt_dir: Option<PathBuf>,
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("summary_model", &self.summary_model)
            .field("chat_max_tokens", &self.chat_max_tokens)
            .field("summary_max_tokens", &self.summary_max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("max_tool_iterations", &self.max_tool_iterations)
            .field("prompt_dir", &self.prompt_dir)
            .finish()
    }
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    chat_model: Option<String>,
    summary_model: Option<String>,
    chat_max_tokens: Option<u32>,
    summary_max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout: Option<Duration>,
    max_tool_iterations: Option<usize>,
    prompt_dir: Option<PathBuf>,
}

impl std::fmt::Debug for AgentConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfigBuilder")
            .field("provider", &self.provider)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("summary_model", &self.summary_model)
            .field("chat_max_tokens", &self.chat_max_tokens)
            .field("summary_max_tokens", &self.summary_max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("max_tool_iterations", &self.max_tool_iterations)
            .field("prompt_dir", &self.prompt_dir)
            .finish()
    }
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("FIRST_AID_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("FIRST_AID_API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("FIRST_AID_BASE_URL")
                .or_else(|_| std::env::var("OPENAI_BASE_URL"))
                .ok();
        }
        if self.chat_model.is_none() {
            self.chat_model = std::env::var("FIRST_AID_MODEL").ok();
        }
        if self.summary_model.is_none() {
            self.summary_model = std::env::var("FIRST_AID_SUMMARY_MODEL").ok();
        }
        if self.max_tool_iterations.is_none() {
            self.max_tool_iterations = std::env::var("FIRST_AID_MAX_TOOL_ITERATIONS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.prompt_dir.is_none() {
            self.prompt_dir = std::env::var("FIRST_AID_PROMPT_DIR")
                .ok()
                .map(PathBuf::from);
        }
        self
    }

    /// Sets the provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the conversational model.
    #[must_use]
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = Some(model.into());
        self
    }

    /// Sets the summary model.
    #[must_use]
    pub fn summary_model(mut self, model: impl Into<String>) -> Self {
        self.summary_model = Some(model.into());
        self
    }

    /// Sets the conversational max tokens.
    #[must_use]
    pub const fn chat_max_tokens(mut self, n: u32) -> Self {
        self.chat_max_tokens = Some(n);
        self
    }

    /// Sets the summary max tokens.
    #[must_use]
    pub const fn summary_max_tokens(mut self, n: u32) -> Self {
        self.summary_max_tokens = Some(n);
        self
    }

    /// Sets the conversational temperature.
    #[must_use]
    pub const fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the maximum tool-calling rounds per turn.
    #[must_use]
    pub const fn max_tool_iterations(mut self, n: usize) -> Self {
        self.max_tool_iterations = Some(n);
        self
    }

    /// Sets the prompt template directory.
    #[must_use]
    pub fn prompt_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.prompt_dir = Some(dir.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<AgentConfig, AgentError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(AgentError::ApiKeyMissing)?;
        let chat_model = self.chat_model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| DEFAULT_PROVIDER.to_string()),
            api_key,
            base_url: self.base_url,
            summary_model: self.summary_model.unwrap_or_else(|| chat_model.clone()),
            chat_model,
            chat_max_tokens: self.chat_max_tokens.unwrap_or(DEFAULT_CHAT_MAX_TOKENS),
            summary_max_tokens: self
                .summary_max_tokens
                .unwrap_or(DEFAULT_SUMMARY_MAX_TOKENS),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_tool_iterations: self
                .max_tool_iterations
                .unwrap_or(DEFAULT_MAX_TOOL_ITERATIONS)
                .max(1),
            prompt_dir: self.prompt_dir,
        })
    }
}
