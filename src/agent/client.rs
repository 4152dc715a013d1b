//! Provider selection.
//!
//! Both supported engines speak the `OpenAI` chat completion protocol; they
//! differ in endpoint and in how they are named in logs.

use tracing::debug;

use crate::agent::config::{AgentConfig, DEFAULT_BASE_URL};
use crate::agent::provider::LlmProvider;
use crate::agent::providers::OpenAiProvider;
use crate::error::AgentError;

/// Supported reasoning-engine vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Gemini through its `OpenAI`-compatible endpoint (default).
    Gemini,
    /// `OpenAI` or any proxy exposing its API.
    OpenAi,
}

impl ProviderKind {
    /// Resolves a configured provider name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnsupportedProvider`] for unknown names.
    pub fn from_name(name: &str) -> Result<Self, AgentError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            _ => Err(AgentError::UnsupportedProvider {
                name: name.to_string(),
            }),
        }
    }

    /// Name reported by the provider.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }

    /// Endpoint used when no base URL is configured. `None` keeps the
    /// SDK's own default.
    #[must_use]
    pub const fn default_base_url(self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some(DEFAULT_BASE_URL),
            Self::OpenAi => None,
        }
    }
}

/// Creates an [`LlmProvider`] for the configured provider name.
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for unknown provider names,
/// or [`AgentError::ApiRequest`] if the HTTP client cannot be built.
pub fn create_provider(config: &AgentConfig) -> Result<Box<dyn LlmProvider>, AgentError> {
    let kind = ProviderKind::from_name(&config.provider)?;
    let provider = OpenAiProvider::new(config, kind)?;
    debug!(
        provider = kind.name(),
        chat_model = %config.chat_model,
        summary_model = %config.summary_model,
        "reasoning engine configured"
    );
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn config(provider: &str) -> AgentConfig {
        AgentConfig::builder()
            .api_key("test")
            .provider(provider)
            .build()
            .unwrap_or_else(|_| unreachable!())
    }

    #[test_case("gemini", ProviderKind::Gemini; "gemini")]
    #[test_case("Google", ProviderKind::Gemini; "google alias")]
    #[test_case(" openai ", ProviderKind::OpenAi; "openai trimmed")]
    fn test_from_name(name: &str, expected: ProviderKind) {
        assert_eq!(ProviderKind::from_name(name).ok(), Some(expected));
    }

    #[test]
    fn test_default_provider_is_gemini() {
        let config = AgentConfig::builder()
            .api_key("test")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let provider = create_provider(&config).unwrap_or_else(|_| unreachable!());
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn test_create_openai_provider() {
        let provider = create_provider(&config("openai")).unwrap_or_else(|_| unreachable!());
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider(&config("anthropic-local"));
        assert!(matches!(result, Err(AgentError::UnsupportedProvider { .. })));
    }
}
