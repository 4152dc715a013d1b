//! Triage-note generation.
//!
//! Turns a finished conversation into a private note for the support
//! agent taking over: what the merchant reported, what the logs showed,
//! and what to do next.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::AgentConfig;
use super::prompt::build_summary_prompt;
use super::provider::LlmProvider;
use super::traits::Agent;
use crate::error::AgentError;

/// One line of a conversation as seen by the summary generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Speaker: `user` or `model`.
    pub role: String,
    /// What was said.
    pub text: String,
}

impl TranscriptEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            text: text.into(),
        }
    }
}

/// Three-part hand-off note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageNote {
    /// The merchant's problem.
    pub issue: String,
    /// What the logs showed.
    pub diagnosis: String,
    /// Next step for the support agent.
    pub action: String,
}

static SECTION_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\s>*#_-]*(ISSUE|DIAGNOSIS|ACTION)[\s*_]*:[\s*_]*(.*)$").ok()
});

impl TriageNote {
    /// Parses engine output into the three sections.
    ///
    /// Labels are matched case-insensitively and may carry markdown
    /// decoration (`**ISSUE:**`, `- Action:`). Lines after a label that do
    /// not start a new section are appended to it.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ResponseParse`] if any section is missing or
    /// empty.
    pub fn parse(text: &str) -> Result<Self, AgentError> {
        let re = SECTION_RE.as_ref().ok_or_else(|| AgentError::ResponseParse {
            message: "section pattern failed to compile".to_string(),
            content: String::new(),
        })?;

        let mut sections: [Option<String>; 3] = [None, None, None];
        let mut current: Option<usize> = None;

        for line in text.lines() {
            if let Some(caps) = re.captures(line) {
                let label = caps.get(1).map_or("", |m| m.as_str()).to_ascii_uppercase();
                let idx = match label.as_str() {
                    "ISSUE" => 0,
                    "DIAGNOSIS" => 1,
                    _ => 2,
                };
                let body = caps.get(2).map_or("", |m| m.as_str());
                sections[idx] = Some(clean(body));
                current = Some(idx);
            } else if let Some(idx) = current {
                let extra = clean(line);
                if extra.is_empty() {
                    continue;
                }
                if let Some(section) = sections[idx].as_mut() {
                    if !section.is_empty() {
                        section.push(' ');
                    }
                    section.push_str(&extra);
                }
            }
        }

        let [issue, diagnosis, action] = sections;
        let take = |section: Option<String>, label: &str| {
            section
                .filter(|s| !s.is_empty())
                .ok_or_else(|| AgentError::ResponseParse {
                    message: format!("triage note has no {label} section"),
                    content: text.to_string(),
                })
        };

        Ok(Self {
            issue: take(issue, "ISSUE")?,
            diagnosis: take(diagnosis, "DIAGNOSIS")?,
            action: take(action, "ACTION")?,
        })
    }
}

impl fmt::Display for TriageNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ISSUE: {}", self.issue)?;
        writeln!(f, "DIAGNOSIS: {}", self.diagnosis)?;
        write!(f, "ACTION: {}", self.action)
    }
}

fn clean(s: &str) -> String {
    s.trim().trim_matches(['*', '_']).trim().to_string()
}

/// Single-shot agent that writes triage notes.
#[derive(Debug, Clone)]
pub struct SummaryGenerator {
    model: String,
    system_prompt: String,
    max_tokens: u32,
}

impl SummaryGenerator {
    /// Creates a generator from config with the given system instruction.
    #[must_use]
    pub fn new(config: &AgentConfig, system_prompt: &str) -> Self {
        Self {
            model: config.summary_model.clone(),
            system_prompt: system_prompt.to_string(),
            max_tokens: config.summary_max_tokens,
        }
    }

    /// Summarizes a transcript into a [`TriageNote`].
    ///
    /// Independent of any live session; the transcript may come from a
    /// file or from [`super::session::Session::summary_transcript`].
    ///
    /// # Errors
    ///
    /// Propagates engine errors and returns [`AgentError::ResponseParse`]
    /// if the output lacks a section.
    pub async fn summarize(
        &self,
        provider: &dyn LlmProvider,
        transcript: &[TranscriptEntry],
    ) -> Result<TriageNote, AgentError> {
        let prompt = build_summary_prompt(transcript);
        let response = self.execute(provider, &prompt).await?;
        debug!(
            agent = self.name(),
            entries = transcript.len(),
            tokens = response.usage.total_tokens,
            "summary generated"
        );
        TriageNote::parse(&response.content)
    }
}

impl Agent for SummaryGenerator {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
