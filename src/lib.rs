//! # first-aid-rs
//!
//! First-line diagnostics assistant for payment-gateway merchants.
//!
//! A merchant describes a problem in plain language; a reasoning engine
//! decides whether to query the merchant analytics logs through the
//! `checkMerchantLogs` tool, reads the structured result, and answers.
//! When the merchant needs a human, the conversation is summarized into
//! an ISSUE / DIAGNOSIS / ACTION triage note and attached to a ticket.
//!
//! ## Modules
//!
//! - [`diagnostics`]: query client for the analytics service, with a
//!   synthetic fallback when the service is unreachable or disabled
//! - [`agent`]: session orchestrator, tool registry, summary generator
//!   and reasoning-engine providers
//! - [`escalation`]: ticket creation from a finished conversation
//! - [`cli`]: command-line interface

pub mod agent;
pub mod cli;
pub mod diagnostics;
pub mod error;
pub mod escalation;

pub use agent::{AgentConfig, PromptSet, Session, SummaryGenerator, TranscriptEntry, TriageNote};
pub use diagnostics::{
    DiagnosticBackend, DiagnosticIntent, DiagnosticResult, DiagnosticsConfig, HealthStatus,
    QueryClient,
};
pub use error::{AgentError, CommandError, DiagnosticsError, Error, Result};
pub use escalation::Ticket;
