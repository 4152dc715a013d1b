//! Conversational diagnosis for merchant support.
//!
//! Wraps a pluggable reasoning engine behind a session that can query the
//! merchant analytics logs through a single registered tool, and a
//! summary agent that turns the conversation into a triage note.
//!
//! # Architecture
//!
//! ```text
//! Merchant message → Session
//!   ├── SupportAgent request (system instruction + checkMerchantLogs)
//!   ├── agentic_loop
//!   │   ├── engine asks for checkMerchantLogs → ToolExecutor
//!   │   │   └── DiagnosticBackend::query → {"result": ...}
//!   │   └── engine answers in text → reply
//!   └── engine error → apology, history rolled back
//!
//! Transcript → SummaryGenerator → TriageNote (ISSUE / DIAGNOSIS / ACTION)
//! ```

pub mod agentic_loop;
pub mod client;
pub mod config;
pub mod executor;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod session;
pub mod summary;
pub mod tool;
pub mod traits;

// Re-export key types
pub use client::create_provider;
pub use config::AgentConfig;
pub use executor::{ToolEvent, ToolExecutor};
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use prompt::PromptSet;
pub use provider::LlmProvider;
pub use session::{APOLOGY, ConversationTurn, Session, SessionState, SupportAgent};
pub use summary::{SummaryGenerator, TranscriptEntry, TriageNote};
pub use tool::{ToolCall, ToolDefinition, ToolResult, ToolSet};
pub use traits::Agent;
