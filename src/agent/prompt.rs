//! System prompts and template builders.
//!
//! The session prompt fixes the bot persona, when to call the diagnostic
//! tool and how to read its numbers. The summary prompt constrains the
//! hand-off note to three labelled sections.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use super::summary::TranscriptEntry;

/// System instruction for a support session.
pub const SESSION_SYSTEM_PROMPT: &str = r#"You are 'MerchantBot', a specialized Level 1 support assistant for a payment gateway.
Your goal is to diagnose merchant issues by querying the merchant analytics logs through the `checkMerchantLogs` tool.

## Process

1. Listen to the merchant's complaint.
2. IF the complaint involves failed transactions, blocks, or integration errors, you MUST call `checkMerchantLogs` to investigate before answering. Call it at most once per reply.
3. Interpret the JSON result and explain it simply to the merchant.
4. If the logs show a critical error (like a fraud block or INVALID_SIGNATURE), explain the specific reason.
5. Be concise, professional, and empathetic.

## Interpreting results

- `sr` is the success rate in percent. If it is 0, the situation is critical.
- If `fra_blocks` > 0, tell the merchant they triggered a risk rule.
- If `last_error_code` is `INVALID_SIGNATURE`, tell them to check their secret keys.
- If `last_error_code` is `GATEWAY_TIMEOUT`, explain that the gateway is slow to respond and retries may succeed.
- `status` summarizes overall health: HEALTHY, WARNING or CRITICAL.

## Rules

- Never invent log values. Only report what the tool returned.
- If the merchant id is unknown, use "current_merchant".
- If the problem cannot be resolved in chat, suggest escalating to a human agent."#;

/// System instruction for triage-note generation.
pub const SUMMARY_SYSTEM_PROMPT: &str = r"You write private notes for Level 1 support agents. You are given a chat transcript between a merchant and the diagnostic bot.

Produce exactly three lines, in this order and with these labels:

ISSUE: [one sentence describing the merchant's problem]
DIAGNOSIS: [what the merchant logs showed]
ACTION: [what the support agent should do next]

Do not add any other text. If the transcript does not say something, write what is known and state what is missing.";

/// Default prompt directory under the user's home.
const DEFAULT_PROMPT_DIR: &str = ".config/first-aid-rs/prompts";

/// Filename for the session prompt template.
const SESSION_FILENAME: &str = "system.md";
/// Filename for the summary prompt template.
const SUMMARY_FILENAME: &str = "summary.md";

/// The system prompts used by the assistant.
///
/// Loaded from external template files when available, falling back to
/// compiled-in defaults.
#[derive(Debug, Clone)]
pub struct PromptSet {
    /// System instruction for support sessions.
    pub session: String,
    /// System instruction for triage summaries.
    pub summary: String,
}

impl PromptSet {
    /// Loads prompts from the given directory, falling back to compiled-in defaults.
    ///
    /// Resolution order for `prompt_dir`:
    /// 1. Explicit `prompt_dir` argument (from `--prompt-dir` or config)
    /// 2. `FIRST_AID_PROMPT_DIR` environment variable
    /// 3. `~/.config/first-aid-rs/prompts/`
    ///
    /// Each file is loaded independently; a missing file uses its default.
    #[must_use]
    pub fn load(prompt_dir: Option<&Path>) -> Self {
        let resolved_dir = prompt_dir
            .map(PathBuf::from)
            .or_else(|| std::env::var("FIRST_AID_PROMPT_DIR").ok().map(PathBuf::from))
            .or_else(Self::default_dir);

        let load_file = |filename: &str, default: &str| -> String {
            resolved_dir
                .as_ref()
                .map(|dir| dir.join(filename))
                .and_then(|path| std::fs::read_to_string(&path).ok())
                .filter(|content| !content.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            session: load_file(SESSION_FILENAME, SESSION_SYSTEM_PROMPT),
            summary: load_file(SUMMARY_FILENAME, SUMMARY_SYSTEM_PROMPT),
        }
    }

    /// Returns compiled-in defaults without checking the filesystem.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            session: SESSION_SYSTEM_PROMPT.to_string(),
            summary: SUMMARY_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Writes the compiled-in default prompts to the given directory.
    ///
    /// Creates the directory if it does not exist. Existing files are
    /// **not** overwritten.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if directory creation or file writing fails.
    pub fn write_defaults(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let templates = [
            (SESSION_FILENAME, SESSION_SYSTEM_PROMPT),
            (SUMMARY_FILENAME, SUMMARY_SYSTEM_PROMPT),
        ];

        let mut written = Vec::new();
        for (filename, content) in &templates {
            let path = dir.join(filename);
            if !path.exists() {
                std::fs::write(&path, content)?;
                written.push(path);
            }
        }

        Ok(written)
    }

    /// Returns the default prompt directory under the user's home.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(DEFAULT_PROMPT_DIR))
    }
}

/// Builds the user message for triage-note generation.
///
/// Each transcript entry becomes one `role: text` line.
#[must_use]
pub fn build_summary_prompt(transcript: &[TranscriptEntry]) -> String {
    let mut history = String::new();
    for entry in transcript {
        let _ = writeln!(history, "{}: {}", entry.role, entry.text);
    }

    format!(
        "Analyze the following chat transcript between a merchant and the diagnostic bot \
         and write the private note.\n\n\
         <transcript>\n{}</transcript>",
        history
    )
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_build_summary_prompt_labels_roles() {
        let transcript = vec![
            TranscriptEntry::new("user", "payments failing"),
            TranscriptEntry::new("model", "checked logs, FRA block found"),
        ];
        let prompt = build_summary_prompt(&transcript);
        assert!(prompt.contains("user: payments failing\n"));
        assert!(prompt.contains("model: checked logs, FRA block found\n"));
        assert!(prompt.contains("<transcript>"));
    }

    #[test]
    fn test_prompts_mention_contract() {
        assert!(SESSION_SYSTEM_PROMPT.contains("checkMerchantLogs"));
        assert!(SESSION_SYSTEM_PROMPT.contains("INVALID_SIGNATURE"));
        for label in ["ISSUE:", "DIAGNOSIS:", "ACTION:"] {
            assert!(SUMMARY_SYSTEM_PROMPT.contains(label));
        }
    }

    #[test]
    fn test_load_prefers_files_and_falls_back() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        std::fs::write(dir.path().join(SESSION_FILENAME), "custom persona")
            .unwrap_or_else(|e| panic!("write failed: {e}"));

        let prompts = PromptSet::load(Some(dir.path()));
        assert_eq!(prompts.session, "custom persona");
        assert_eq!(prompts.summary, SUMMARY_SYSTEM_PROMPT);
    }

    #[test]
    fn test_write_defaults_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
        std::fs::write(dir.path().join(SUMMARY_FILENAME), "mine")
            .unwrap_or_else(|e| panic!("write failed: {e}"));

        let written = PromptSet::write_defaults(dir.path())
            .unwrap_or_else(|e| panic!("write_defaults failed: {e}"));
        assert_eq!(written.len(), 1);
        let summary = std::fs::read_to_string(dir.path().join(SUMMARY_FILENAME))
            .unwrap_or_default();
        assert_eq!(summary, "mine");
    }
}
