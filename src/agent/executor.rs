//! Tool executor that dispatches engine tool calls to the diagnostics
//! backend.
//!
//! Emits a [`ToolEvent::Started`] before the query and a
//! [`ToolEvent::Finished`] once it returns, so a front end can show
//! progress next to the bot's answer.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::tool::{CHECK_MERCHANT_LOGS, DiagnosticToolArgs, ToolCall, ToolResult};
use crate::diagnostics::{DiagnosticBackend, DiagnosticIntent, DiagnosticResult};
use crate::error::AgentError;

/// Maximum raw byte length of tool argument JSON from the engine.
const MAX_TOOL_ARGS_LEN: usize = 10_000;

/// Display label for the diagnostic tool in progress notifications.
pub const DIAGNOSTIC_TOOL_LABEL: &str = "Analytics (transaction logs)";

/// Progress notification for a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ToolEvent {
    /// The query is about to run.
    Started {
        /// Display label of the tool.
        label: String,
        /// Requested intent.
        intent: DiagnosticIntent,
        /// Merchant being queried.
        merchant_id: String,
        /// Human-readable progress line.
        detail: String,
    },
    /// The query returned.
    Finished {
        /// Display label of the tool.
        label: String,
        /// Requested intent.
        intent: DiagnosticIntent,
        /// The result handed back to the engine.
        result: DiagnosticResult,
        /// Human-readable line with the serialized result.
        detail: String,
    },
}

impl ToolEvent {
    /// Display label of the tool.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Started { label, .. } | Self::Finished { label, .. } => label,
        }
    }

    /// Human-readable progress line.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Started { detail, .. } | Self::Finished { detail, .. } => detail,
        }
    }
}

/// Executes tool calls against a [`DiagnosticBackend`].
pub struct ToolExecutor {
    backend: Arc<dyn DiagnosticBackend>,
    events: Option<UnboundedSender<ToolEvent>>,
}

impl std::fmt::Debug for ToolExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolExecutor")
            .field("backend", &"<dyn DiagnosticBackend>")
            .field("events", &self.events.is_some())
            .finish()
    }
}

impl ToolExecutor {
    /// Creates an executor backed by the given diagnostics backend.
    #[must_use]
    pub fn new(backend: Arc<dyn DiagnosticBackend>) -> Self {
        Self {
            backend,
            events: None,
        }
    }

    /// Sends tool progress events to `sender`.
    #[must_use]
    pub fn with_events(mut self, sender: UnboundedSender<ToolEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Replaces the event sender.
    pub fn set_events(&mut self, sender: Option<UnboundedSender<ToolEvent>>) {
        self.events = sender;
    }

    /// Dispatches a tool call.
    ///
    /// Unknown tools and malformed arguments yield an error result that is
    /// fed back to the engine; they do not abort the turn.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        if call.arguments.len() > MAX_TOOL_ARGS_LEN {
            return ToolResult {
                tool_call_id: call.id.clone(),
                content: format!(
                    "tool arguments too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
                    call.arguments.len()
                ),
                is_error: true,
            };
        }

        let result = match call.name.as_str() {
            CHECK_MERCHANT_LOGS => self.tool_check_merchant_logs(&call.arguments).await,
            other => Err(AgentError::ToolExecution {
                name: other.to_string(),
                message: "unknown tool".to_string(),
            }),
        };

        match result {
            Ok(content) => ToolResult {
                tool_call_id: call.id.clone(),
                content,
                is_error: false,
            },
            Err(e) => ToolResult {
                tool_call_id: call.id.clone(),
                content: e.to_string(),
                is_error: true,
            },
        }
    }

    async fn tool_check_merchant_logs(&self, arguments: &str) -> Result<String, AgentError> {
        let args =
            DiagnosticToolArgs::parse(arguments).map_err(|e| AgentError::ToolExecution {
                name: CHECK_MERCHANT_LOGS.to_string(),
                message: format!("invalid arguments: {e}"),
            })?;

        self.emit(ToolEvent::Started {
            label: DIAGNOSTIC_TOOL_LABEL.to_string(),
            intent: args.intent,
            merchant_id: args.merchant_id.clone(),
            detail: format!("Querying {}...", args.intent),
        });

        let result = self.backend.query(&args.merchant_id, args.intent).await;
        let payload = result.to_json();
        debug!(
            intent = %args.intent,
            merchant_id = %args.merchant_id,
            %payload,
            "diagnostic query returned"
        );

        self.emit(ToolEvent::Finished {
            label: DIAGNOSTIC_TOOL_LABEL.to_string(),
            intent: args.intent,
            result,
            detail: format!("Result: {payload}"),
        });

        Ok(serde_json::json!({ "result": payload }).to_string())
    }

    fn emit(&self, event: ToolEvent) {
        if let Some(sender) = &self.events {
            // A dropped receiver just means nobody is watching.
            let _ = sender.send(event);
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::diagnostics::HealthStatus;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Backend that records every query and answers with a fixed result.
    #[derive(Default)]
    pub(crate) struct RecordingBackend {
        pub(crate) calls: Mutex<Vec<(String, DiagnosticIntent)>>,
    }

    impl RecordingBackend {
        pub(crate) fn calls(&self) -> Vec<(String, DiagnosticIntent)> {
            self.calls
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone()
        }

        pub(crate) fn fixed_result() -> DiagnosticResult {
            DiagnosticResult {
                success_rate: 0,
                fra_blocks: 42,
                api_failures: 0,
                last_error_code: Some("RISK_BLOCK_VELOCITY".to_string()),
                status: HealthStatus::Critical,
            }
        }
    }

    #[async_trait]
    impl DiagnosticBackend for RecordingBackend {
        async fn query(&self, merchant_id: &str, intent: DiagnosticIntent) -> DiagnosticResult {
            self.calls
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push((merchant_id.to_string(), intent));
            Self::fixed_result()
        }
    }

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[tokio::test]
    async fn test_execute_check_merchant_logs() {
        let backend = Arc::new(RecordingBackend::default());
        let executor = ToolExecutor::new(backend.clone());

        let result = executor
            .execute(&call(CHECK_MERCHANT_LOGS, r#"{"queryType":"FRA_BLOCKS","merchantId":"M-1"}"#))
            .await;

        assert!(!result.is_error);
        assert_eq!(result.tool_call_id, "call_1");
        let content: serde_json::Value =
            serde_json::from_str(&result.content).unwrap_or_else(|e| panic!("bad json: {e}"));
        assert_eq!(content["result"], RecordingBackend::fixed_result().to_json());
        assert_eq!(
            backend.calls(),
            vec![("M-1".to_string(), DiagnosticIntent::FraBlocks)]
        );
    }

    #[tokio::test]
    async fn test_execute_emits_started_then_finished() {
        let backend = Arc::new(RecordingBackend::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let executor = ToolExecutor::new(backend).with_events(tx);

        let _ = executor
            .execute(&call(CHECK_MERCHANT_LOGS, r#"{"queryType":"INTEGRATION_HEALTH"}"#))
            .await;

        let started = rx.recv().await.unwrap_or_else(|| panic!("no started event"));
        assert!(matches!(
            &started,
            ToolEvent::Started { intent: DiagnosticIntent::IntegrationHealth, merchant_id, .. }
                if merchant_id == "current_merchant"
        ));
        assert_eq!(started.detail(), "Querying INTEGRATION_HEALTH...");

        let finished = rx.recv().await.unwrap_or_else(|| panic!("no finished event"));
        assert!(matches!(finished, ToolEvent::Finished { .. }));
        assert!(finished.detail().starts_with("Result: {"));
        assert!(finished.detail().contains("\"fra_blocks\":42"));
        assert_eq!(finished.label(), DIAGNOSTIC_TOOL_LABEL);
    }

    #[tokio::test]
    async fn test_execute_numeric_merchant_id() {
        let backend = Arc::new(RecordingBackend::default());
        let executor = ToolExecutor::new(backend.clone());

        let result = executor
            .execute(&call(CHECK_MERCHANT_LOGS, r#"{"queryType":"FRA_BLOCKS","merchantId":12345}"#))
            .await;

        assert!(!result.is_error);
        assert_eq!(
            backend.calls(),
            vec![("12345".to_string(), DiagnosticIntent::FraBlocks)]
        );
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let backend = Arc::new(RecordingBackend::default());
        let executor = ToolExecutor::new(backend.clone());

        let result = executor.execute(&call("refund_payment", "{}")).await;
        assert!(result.is_error);
        assert!(result.content.contains("unknown tool"));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_execute_malformed_arguments() {
        let backend = Arc::new(RecordingBackend::default());
        let executor = ToolExecutor::new(backend.clone());

        let result = executor.execute(&call(CHECK_MERCHANT_LOGS, "{not json")).await;
        assert!(result.is_error);
        assert!(result.content.contains("invalid arguments"));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_execute_oversized_arguments() {
        let backend = Arc::new(RecordingBackend::default());
        let executor = ToolExecutor::new(backend);
        let huge = "x".repeat(MAX_TOOL_ARGS_LEN + 1);

        let result = executor.execute(&call(CHECK_MERCHANT_LOGS, &huge)).await;
        assert!(result.is_error);
        assert!(result.content.contains("too large"));
    }
}
