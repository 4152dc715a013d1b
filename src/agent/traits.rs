//! Agent trait definition.
//!
//! The support agent (conversational, tool-enabled) and the summary agent
//! (single-shot, no tools) share this trait, which fixes each role's
//! model, system prompt and sampling settings.

use async_trait::async_trait;

use super::message::{ChatMessage, ChatRequest, ChatResponse, system_message, user_message};
use super::provider::LlmProvider;
use super::tool::ToolDefinition;
use crate::error::AgentError;

/// Response from a single-shot agent execution.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The agent's text output.
    pub content: String,
    /// Token usage for this call.
    pub usage: super::message::TokenUsage,
    /// Why the model stopped generating (e.g. `"stop"`, `"length"`).
    pub finish_reason: Option<String>,
}

/// Trait implemented by all agents in the system.
///
/// Agents encapsulate a specific role with a fixed system prompt and model
/// configuration. Agents that support tool-calling override
/// [`Agent::tools`].
#[async_trait]
pub trait Agent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// Model identifier to use for this agent.
    fn model(&self) -> &str;

    /// System prompt that defines the agent's role and behavior.
    fn system_prompt(&self) -> &str;

    /// Sampling temperature (0.0 = deterministic, higher = more creative).
    fn temperature(&self) -> f32 {
        0.0
    }

    /// Maximum tokens for the response.
    fn max_tokens(&self) -> u32 {
        1024
    }

    /// Tool definitions available to this agent.
    ///
    /// Returns an empty vec by default (no tools).
    fn tools(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }

    /// Maximum tool-calling rounds per turn before aborting.
    fn max_tool_iterations(&self) -> usize {
        10
    }

    /// Builds a request over `messages` with this agent's settings.
    ///
    /// Prepends the system prompt when `messages` is empty.
    fn build_request(&self, mut messages: Vec<ChatMessage>) -> ChatRequest {
        if messages.is_empty() {
            messages.push(system_message(self.system_prompt()));
        }
        ChatRequest {
            model: self.model().to_string(),
            messages,
            temperature: Some(self.temperature()),
            max_tokens: Some(self.max_tokens()),
            tools: self.tools(),
        }
    }

    /// Executes the agent once with the given user message (no tools).
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures or response parsing errors.
    async fn execute(
        &self,
        provider: &dyn LlmProvider,
        user_msg: &str,
    ) -> Result<AgentResponse, AgentError> {
        let mut request = self.build_request(vec![system_message(self.system_prompt())]);
        request.messages.push(user_message(user_msg));
        request.tools.clear();

        let response: ChatResponse = provider.chat(&request).await?;

        Ok(AgentResponse {
            content: response.content,
            usage: response.usage,
            finish_reason: response.finish_reason,
        })
    }
}
