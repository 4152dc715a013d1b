//! Escalation of a support conversation to a human-handled ticket.
//!
//! A [`Ticket`] bundles the triage note with the conversation so the
//! support agent picking it up sees the diagnosis first. Storage of
//! tickets is left to the caller.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::agent::provider::LlmProvider;
use crate::agent::summary::{SummaryGenerator, TranscriptEntry, TriageNote};
use crate::error::AgentError;

/// Subject used when the conversation has no merchant message.
pub const DEFAULT_SUBJECT: &str = "Support Request";

/// Characters of the first merchant message kept in the subject.
const SUBJECT_PREFIX_CHARS: usize = 30;

/// Ticket lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Waiting for a support agent.
    Open,
    /// Being worked on.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Closed.
    Resolved,
}

/// Ticket priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    /// Low priority.
    Low,
    /// Default priority for escalations.
    Medium,
    /// High priority.
    High,
}

/// A support ticket created from an escalated conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket id, `TKT-<n>`.
    pub id: String,
    /// Merchant display name.
    pub merchant_name: String,
    /// Short subject line.
    pub subject: String,
    /// Lifecycle status.
    pub status: TicketStatus,
    /// Priority.
    pub priority: Priority,
    /// Triage note for the support agent.
    pub diagnosis: TriageNote,
    /// The conversation that led to the ticket.
    pub chat_history: Vec<TranscriptEntry>,
    /// Creation time, seconds since the Unix epoch.
    pub created_at: u64,
}

impl Ticket {
    /// Summarizes `transcript` and opens a ticket for it.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Orchestration`] for an empty transcript and
    /// propagates summary failures.
    pub async fn escalate(
        summarizer: &SummaryGenerator,
        provider: &dyn LlmProvider,
        transcript: &[TranscriptEntry],
        merchant_name: &str,
    ) -> Result<Self, AgentError> {
        let id = ticket_id(&mut rand::thread_rng());
        Self::escalate_as(id, summarizer, provider, transcript, merchant_name).await
    }

    /// Same as [`Ticket::escalate`] with a caller-chosen ticket id.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Orchestration`] for an empty transcript and
    /// propagates summary failures.
    pub async fn escalate_as(
        id: String,
        summarizer: &SummaryGenerator,
        provider: &dyn LlmProvider,
        transcript: &[TranscriptEntry],
        merchant_name: &str,
    ) -> Result<Self, AgentError> {
        if transcript.is_empty() {
            return Err(AgentError::Orchestration {
                message: "nothing to escalate: transcript is empty".to_string(),
            });
        }

        let diagnosis = summarizer.summarize(provider, transcript).await?;
        let ticket = Self::open(id, merchant_name, diagnosis, transcript.to_vec());
        info!(ticket = %ticket.id, merchant = merchant_name, "conversation escalated");
        Ok(ticket)
    }

    fn open(
        id: String,
        merchant_name: &str,
        diagnosis: TriageNote,
        chat_history: Vec<TranscriptEntry>,
    ) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        Self {
            id,
            merchant_name: merchant_name.to_string(),
            subject: subject_for(&chat_history),
            status: TicketStatus::Open,
            priority: Priority::Medium,
            diagnosis,
            chat_history,
            created_at,
        }
    }
}

/// Draws a ticket id, `TKT-0` to `TKT-9999`.
#[must_use]
pub fn ticket_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("TKT-{}", rng.gen_range(0..10_000))
}

/// Subject line: the first merchant message cut to 30 characters plus
/// `...`, or [`DEFAULT_SUBJECT`] when there is none.
#[must_use]
pub fn subject_for(transcript: &[TranscriptEntry]) -> String {
    transcript
        .iter()
        .find(|e| e.role == "user")
        .map_or_else(
            || DEFAULT_SUBJECT.to_string(),
            |e| {
                let prefix: String = e.text.chars().take(SUBJECT_PREFIX_CHARS).collect();
                format!("{prefix}...")
            },
        )
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::agent::config::AgentConfig;
    use crate::agent::message::ChatResponse;
    use crate::agent::provider::tests::ScriptedProvider;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn summarizer() -> SummaryGenerator {
        let config = AgentConfig::builder()
            .api_key("test-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        SummaryGenerator::new(&config, "write a note")
    }

    fn note_text() -> ChatResponse {
        ChatResponse::text("ISSUE: failing\nDIAGNOSIS: fraud block\nACTION: call risk team")
    }

    #[test]
    fn test_subject_truncates_first_user_message() {
        let transcript = vec![
            TranscriptEntry::new("user", "All my card payments started failing this morning"),
            TranscriptEntry::new("model", "Let me check."),
        ];
        assert_eq!(subject_for(&transcript), "All my card payments started f...");
    }

    #[test]
    fn test_subject_cuts_on_character_boundary() {
        let text = format!("{}é and more", "a".repeat(29));
        let transcript = vec![TranscriptEntry::new("user", &text)];
        assert_eq!(subject_for(&transcript), format!("{}é...", "a".repeat(29)));
    }

    #[test]
    fn test_subject_short_message_and_fallback() {
        assert_eq!(
            subject_for(&[TranscriptEntry::new("user", "help")]),
            "help..."
        );
        assert_eq!(
            subject_for(&[TranscriptEntry::new("model", "hi")]),
            DEFAULT_SUBJECT
        );
    }

    #[tokio::test]
    async fn test_escalate_builds_open_ticket() {
        let provider = ScriptedProvider::new(vec![Ok(note_text())]);
        let transcript = vec![
            TranscriptEntry::new("user", "payments failing"),
            TranscriptEntry::new("model", "checked logs, FRA block found"),
        ];
        let id = ticket_id(&mut StdRng::seed_from_u64(7));

        let ticket = Ticket::escalate_as(
            id.clone(),
            &summarizer(),
            &provider,
            &transcript,
            "Acme Coffee",
        )
        .await
        .unwrap_or_else(|e| panic!("escalate failed: {e}"));

        assert_eq!(ticket.id, id);
        assert!(ticket.id.starts_with("TKT-"));
        let n: u32 = ticket.id["TKT-".len()..]
            .parse()
            .unwrap_or_else(|e| panic!("bad id: {e}"));
        assert!(n < 10_000);
        assert_eq!(ticket.merchant_name, "Acme Coffee");
        assert_eq!(ticket.subject, "payments failing...");
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.priority, Priority::Medium);
        assert_eq!(ticket.diagnosis.diagnosis, "fraud block");
        assert_eq!(ticket.chat_history, transcript);
        assert!(ticket.created_at > 0);
    }

    #[tokio::test]
    async fn test_escalate_empty_transcript() {
        let provider = ScriptedProvider::new(vec![Ok(note_text())]);
        let result = Ticket::escalate(&summarizer(), &provider, &[], "Acme").await;
        assert!(matches!(result, Err(AgentError::Orchestration { .. })));
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_escalate_propagates_summary_failure() {
        let provider = ScriptedProvider::new(vec![Ok(ChatResponse::text("no sections here"))]);
        let transcript = vec![TranscriptEntry::new("user", "help")];
        let result = Ticket::escalate(&summarizer(), &provider, &transcript, "Acme").await;
        assert!(matches!(result, Err(AgentError::ResponseParse { .. })));
    }

    #[test]
    fn test_ticket_serializes_status_labels() {
        let json = serde_json::to_value(TicketStatus::InProgress).unwrap_or_default();
        assert_eq!(json, "In Progress");
    }
}
