//! Single-tool turn loop.
//!
//! Drives the engine ↔ tool round-trip for one user turn: sends the
//! request, runs the one honored tool call in the response, appends the
//! call and its result, and repeats until the engine produces plain text
//! or the iteration limit is reached.

use tracing::{debug, warn};

use super::executor::ToolExecutor;
use super::message::{ChatRequest, ChatResponse, assistant_tool_call_message, tool_message};
use super::provider::LlmProvider;
use super::session::{ConversationTurn, SessionState};
use super::tool::ToolCall;
use crate::error::AgentError;

/// Picks the tool call to run from an engine response.
///
/// At most one tool call is honored per engine round. When the engine
/// asks for several, the first is kept and the rest are logged and
/// dropped; they never reach the engine history, so no request is left
/// without a result. Returns `None` for a plain-text response.
///
/// A call without an id is named `call_<history_len>`, where
/// `history_len` is the length of the engine history it is appended to.
/// The history only grows within a session, so assigned ids never repeat.
pub fn honor_first_tool_call(response: &ChatResponse, history_len: usize) -> Option<ToolCall> {
    let (first, rest) = response.tool_calls.split_first()?;
    if !rest.is_empty() {
        let dropped: Vec<&str> = rest.iter().map(|c| c.name.as_str()).collect();
        warn!(
            dropped = ?dropped,
            "engine requested multiple tool calls; honoring only the first"
        );
    }

    let mut call = first.clone();
    if call.id.is_empty() {
        call.id = format!("call_{history_len}");
    }
    Some(call)
}

/// Runs the turn loop: model → tool call → tool result → model → …
///
/// # Arguments
///
/// * `provider` - Reasoning engine to call.
/// * `request` - Request holding the session history plus the new user
///   message; tool calls and results are appended in place.
/// * `executor` - Runs the diagnostic tool.
/// * `transcript` - Session transcript; tool request/result turns are
///   appended as pairs.
/// * `state` - Session state, advanced as the loop progresses.
/// * `max_iterations` - Limit on engine round-trips.
///
/// # Returns
///
/// The engine's final text.
///
/// # Errors
///
/// Returns [`AgentError::ToolLoopExceeded`] if the engine keeps requesting
/// tools beyond `max_iterations`. Propagates any provider errors.
pub async fn agentic_loop(
    provider: &dyn LlmProvider,
    request: &mut ChatRequest,
    executor: &ToolExecutor,
    transcript: &mut Vec<ConversationTurn>,
    state: &mut SessionState,
    max_iterations: usize,
) -> Result<String, AgentError> {
    for round in 0..max_iterations {
        *state = SessionState::AwaitingModel;
        let response = provider.chat(request).await?;

        let Some(call) = honor_first_tool_call(&response, request.messages.len()) else {
            debug!(round, "turn completed with final text response");
            *state = SessionState::Responded;
            return Ok(response.content);
        };

        *state = SessionState::ToolRequested;
        debug!(round, tool = %call.name, call_id = %call.id, "executing tool call");

        request
            .messages
            .push(assistant_tool_call_message(&response.content, call.clone()));
        transcript.push(ConversationTurn::ToolRequest { call: call.clone() });

        let result = executor.execute(&call).await;
        debug!(
            tool = %call.name,
            call_id = %call.id,
            is_error = result.is_error,
            "tool execution complete"
        );

        request
            .messages
            .push(tool_message(&result.tool_call_id, &result.content));
        transcript.push(ConversationTurn::ToolResult {
            call_id: result.tool_call_id,
            content: result.content,
            is_error: result.is_error,
        });
    }

    Err(AgentError::ToolLoopExceeded { max_iterations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::message::ChatResponse;

    fn call(id: &str, name: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: "{}".to_string(),
        }
    }

    #[test]
    fn test_honor_first_tool_call_plain_text() {
        assert!(honor_first_tool_call(&ChatResponse::text("hi"), 0).is_none());
    }

    #[test]
    fn test_honor_first_tool_call_keeps_first() {
        let response = ChatResponse::tool_calls(vec![call("a", "first"), call("b", "second")]);
        let honored = honor_first_tool_call(&response, 0).unwrap_or_else(|| unreachable!());
        assert_eq!(honored.id, "a");
        assert_eq!(honored.name, "first");
    }

    #[test]
    fn test_honor_first_tool_call_assigns_missing_id() {
        let response = ChatResponse::tool_calls(vec![call("", "checkMerchantLogs")]);
        let honored = honor_first_tool_call(&response, 7).unwrap_or_else(|| unreachable!());
        assert_eq!(honored.id, "call_7");
    }
}
