//! Output formatting for CLI commands.

use std::fmt::Write;

use serde::Serialize;

use crate::agent::executor::ToolEvent;
use crate::agent::summary::TriageNote;
use crate::diagnostics::{DiagnosticIntent, DiagnosticResult};
use crate::escalation::Ticket;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name; anything other than `json` is text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Serializes `value` as pretty JSON with a trailing newline.
    pub fn to_json<T: Serialize>(self, value: &T) -> String {
        let mut out = serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"));
        out.push('\n');
        out
    }
}

/// Wire label of a unit enum (`WARNING`, `In Progress`, ...), so text
/// output uses the same labels as JSON output.
fn label<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_default()
}

/// Renders a tool progress event as a quoted block.
#[must_use]
pub fn format_event(event: &ToolEvent) -> String {
    format!("> {}\n>   {}\n", event.label(), event.detail())
}

/// Renders a diagnostic result as aligned key/value lines.
#[must_use]
pub fn format_diagnostic(
    intent: DiagnosticIntent,
    merchant_id: &str,
    result: &DiagnosticResult,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Intent:          {intent}");
    let _ = writeln!(out, "Merchant:        {merchant_id}");
    let _ = writeln!(out, "Status:          {}", label(&result.status));
    let _ = writeln!(out, "Success rate:    {}%", result.success_rate);
    let _ = writeln!(out, "Fraud blocks:    {}", result.fra_blocks);
    let _ = writeln!(out, "API failures:    {}", result.api_failures);
    let _ = writeln!(
        out,
        "Last error code: {}",
        result.last_error_code.as_deref().unwrap_or("-")
    );
    out
}

/// Renders a triage note.
#[must_use]
pub fn format_note(note: &TriageNote) -> String {
    format!("{note}\n")
}

/// Renders a ticket with its triage note.
#[must_use]
pub fn format_ticket(ticket: &Ticket) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Ticket {} opened for {}", ticket.id, ticket.merchant_name);
    let _ = writeln!(out, "Subject:  {}", ticket.subject);
    let _ = writeln!(
        out,
        "Status:   {} | Priority: {}",
        label(&ticket.status),
        label(&ticket.priority)
    );
    let _ = writeln!(out, "Messages: {}", ticket.chat_history.len());
    out.push('\n');
    out.push_str(&format_note(&ticket.diagnosis));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::HealthStatus;
    use crate::escalation::{Priority, TicketStatus};
    use test_case::test_case;

    #[test_case("json", OutputFormat::Json; "json")]
    #[test_case("JSON", OutputFormat::Json; "uppercase")]
    #[test_case("text", OutputFormat::Text; "text")]
    #[test_case("yaml", OutputFormat::Text; "unknown falls back")]
    fn test_parse_format(input: &str, expected: OutputFormat) {
        assert_eq!(OutputFormat::parse(input), expected);
    }

    #[test]
    fn test_format_diagnostic_lines() {
        let result = DiagnosticResult {
            success_rate: 45,
            fra_blocks: 2,
            api_failures: 50,
            last_error_code: Some("GATEWAY_TIMEOUT".to_string()),
            status: HealthStatus::Warning,
        };
        let text = format_diagnostic(DiagnosticIntent::TransactionStats, "M-1", &result);
        assert!(text.contains("Intent:          TRANSACTION_STATS"));
        assert!(text.contains("Status:          WARNING"));
        assert!(text.contains("Success rate:    45%"));
        assert!(text.contains("GATEWAY_TIMEOUT"));
    }

    #[test]
    fn test_format_ticket_uses_wire_labels() {
        let ticket = Ticket {
            id: "TKT-42".to_string(),
            merchant_name: "Acme Coffee".to_string(),
            subject: "payments failing...".to_string(),
            status: TicketStatus::InProgress,
            priority: Priority::Medium,
            diagnosis: TriageNote {
                issue: "failing".to_string(),
                diagnosis: "fraud block".to_string(),
                action: "call risk team".to_string(),
            },
            chat_history: Vec::new(),
            created_at: 0,
        };
        let text = format_ticket(&ticket);
        assert!(text.contains("Status:   In Progress | Priority: Medium"));
    }

    #[test]
    fn test_to_json_trailing_newline() {
        let out = OutputFormat::Json.to_json(&serde_json::json!({"a": 1}));
        assert!(out.ends_with("}\n"));
    }
}
