//! Support session orchestrator.
//!
//! A [`Session`] owns one merchant conversation: the engine history
//! (system instruction, user turns, tool calls and results), the
//! transcript used for summaries, and the turn state machine. Engine
//! failures never escape a turn; they become [`APOLOGY`] and the history
//! is rolled back so the next turn starts clean.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use super::agentic_loop::agentic_loop;
use super::config::AgentConfig;
use super::executor::{ToolEvent, ToolExecutor};
use super::message::{ChatMessage, assistant_message, system_message, user_message};
use super::provider::LlmProvider;
use super::summary::TranscriptEntry;
use super::tool::{ToolCall, ToolDefinition, ToolSet};
use super::traits::Agent;
use crate::diagnostics::DiagnosticBackend;
use crate::error::AgentError;

/// Reply shown to the merchant when a turn fails.
pub const APOLOGY: &str =
    "I'm having trouble connecting to the diagnostic server. Please contact human support.";

/// Turn state of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No turn in progress. A session returns here once a turn's reply
    /// is recorded.
    #[default]
    Idle,
    /// Input sent to the engine; waiting for its response.
    AwaitingModel,
    /// The engine asked for a tool call.
    ToolRequested,
    /// The engine produced the final text of the turn; the reply is
    /// being recorded.
    Responded,
}

/// One entry of the session transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversationTurn {
    /// Merchant message.
    User {
        /// Message text.
        text: String,
    },
    /// Tool call requested by the engine.
    ToolRequest {
        /// The honored call.
        call: ToolCall,
    },
    /// Tool output fed back to the engine.
    ToolResult {
        /// Id of the call this answers.
        call_id: String,
        /// Serialized result.
        content: String,
        /// Whether the tool failed.
        is_error: bool,
    },
    /// Bot reply shown to the merchant.
    Assistant {
        /// Reply text.
        text: String,
    },
}

/// Conversational agent with the diagnostic tool.
#[derive(Debug, Clone)]
pub struct SupportAgent {
    model: String,
    system_prompt: String,
    temperature: f32,
    max_tokens: u32,
    max_tool_iterations: usize,
    tools: ToolSet,
}

impl SupportAgent {
    /// Creates a support agent from config with the given system instruction.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: &str) -> Self {
        Self {
            model: config.chat_model.clone(),
            system_prompt: system_prompt.to_string(),
            temperature: config.temperature,
            max_tokens: config.chat_max_tokens,
            max_tool_iterations: config.max_tool_iterations,
            tools: ToolSet::diagnostic_tools(),
        }
    }
}

impl Agent for SupportAgent {
    fn name(&self) -> &'static str {
        "support"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        self.tools.definitions().to_vec()
    }

    fn max_tool_iterations(&self) -> usize {
        self.max_tool_iterations
    }
}

/// A single merchant support conversation.
pub struct Session {
    provider: Arc<dyn LlmProvider>,
    executor: ToolExecutor,
    agent: SupportAgent,
    history: Vec<ChatMessage>,
    transcript: Vec<ConversationTurn>,
    state: SessionState,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("provider", &self.provider.name())
            .field("agent", &self.agent)
            .field("history_len", &self.history.len())
            .field("transcript_len", &self.transcript.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Starts a session.
    ///
    /// # Arguments
    ///
    /// * `provider` - Reasoning engine.
    /// * `backend` - Diagnostics backend the tool queries.
    /// * `config` - Model and sampling settings.
    /// * `system_prompt` - Persona and tool-usage instruction.
    #[must_use]
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        backend: Arc<dyn DiagnosticBackend>,
        config: &AgentConfig,
        system_prompt: &str,
    ) -> Self {
        let agent = SupportAgent::new(config, system_prompt);
        Self {
            provider,
            executor: ToolExecutor::new(backend),
            history: vec![system_message(agent.system_prompt())],
            agent,
            transcript: Vec::new(),
            state: SessionState::Idle,
        }
    }

    /// Sends tool progress events to `sender`.
    #[must_use]
    pub fn with_events(mut self, sender: UnboundedSender<ToolEvent>) -> Self {
        self.executor.set_events(Some(sender));
        self
    }

    /// Current turn state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Full transcript, including tool turns.
    #[must_use]
    pub fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    /// Tools advertised to the engine.
    #[must_use]
    pub fn tools(&self) -> Vec<ToolDefinition> {
        self.agent.tools()
    }

    /// Transcript for summaries: merchant turns as `user`, bot replies as
    /// `model`. Tool turns are omitted.
    #[must_use]
    pub fn summary_transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript
            .iter()
            .filter_map(|turn| match turn {
                ConversationTurn::User { text } => Some(TranscriptEntry::new("user", text)),
                ConversationTurn::Assistant { text } => Some(TranscriptEntry::new("model", text)),
                ConversationTurn::ToolRequest { .. } | ConversationTurn::ToolResult { .. } => None,
            })
            .collect()
    }

    /// Clears the conversation and returns to [`SessionState::Idle`].
    pub fn reset(&mut self) {
        self.history.truncate(1);
        self.transcript.clear();
        self.state = SessionState::Idle;
    }

    /// Runs one merchant turn and returns the bot reply.
    ///
    /// Never fails: any engine error is logged, the turn is rolled back,
    /// and [`APOLOGY`] is returned.
    pub async fn send_message(&mut self, text: &str) -> String {
        let checkpoint = self.transcript.len();
        self.transcript.push(ConversationTurn::User {
            text: text.to_string(),
        });

        let reply = match self.try_send(text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "turn failed; replying with apology");
                self.transcript.truncate(checkpoint + 1);
                self.state = SessionState::Responded;
                APOLOGY.to_string()
            }
        };

        self.transcript.push(ConversationTurn::Assistant {
            text: reply.clone(),
        });
        self.state = SessionState::Idle;
        reply
    }

    async fn try_send(&mut self, text: &str) -> Result<String, AgentError> {
        if text.trim().is_empty() {
            return Err(AgentError::Orchestration {
                message: "empty user message".to_string(),
            });
        }

        let mut request = self.agent.build_request(self.history.clone());
        request.messages.push(user_message(text));

        let reply = agentic_loop(
            self.provider.as_ref(),
            &mut request,
            &self.executor,
            &mut self.transcript,
            &mut self.state,
            self.agent.max_tool_iterations(),
        )
        .await?;

        info!(
            agent = self.agent.name(),
            messages = request.messages.len(),
            "turn completed"
        );

        request.messages.push(assistant_message(&reply));
        self.history = request.messages;
        Ok(reply)
    }
}
