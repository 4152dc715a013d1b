//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::agent::tool::CURRENT_MERCHANT;

/// first-aid-rs: first-line diagnostics assistant for payment merchants.
///
/// Chats with a merchant, queries the analytics logs when the complaint
/// calls for it, and escalates to a human with a triage note.
#[derive(Parser, Debug)]
#[command(name = "first-aid-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// Serve synthetic diagnostics instead of calling the analytics service.
    #[arg(long, global = true)]
    pub mock: bool,

    /// Directory with prompt overrides (`system.md`, `summary.md`).
    #[arg(long, global = true, env = "FIRST_AID_PROMPT_DIR")]
    pub prompt_dir: Option<PathBuf>,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive support conversation.
    ///
    /// Type a message and press enter. `/escalate` summarizes the
    /// conversation into a ticket, `/reset` starts over, `/quit` exits.
    #[command(after_help = r#"Examples:
  first-aid-rs chat
  first-aid-rs chat --merchant-name "Acme Coffee"
  first-aid-rs --mock chat                 # Synthetic diagnostics data
  GEMINI_API_KEY=... first-aid-rs chat
"#)]
    Chat {
        /// Merchant display name used on escalation tickets.
        #[arg(long, default_value = "Merchant")]
        merchant_name: String,
    },

    /// Send a single message and print the reply.
    #[command(after_help = r#"Examples:
  first-aid-rs ask "Why are my payments failing?"
  first-aid-rs --format json ask "I get signature errors" | jq .reply
"#)]
    Ask {
        /// The merchant's message.
        message: String,
    },

    /// Query the diagnostics backend directly, without the reasoning engine.
    #[command(after_help = r#"Examples:
  first-aid-rs diagnose --intent FRA_BLOCKS
  first-aid-rs diagnose --intent integration-health --merchant M-1042
  first-aid-rs --mock --format json diagnose --intent TRANSACTION_STATS
"#)]
    Diagnose {
        /// Analysis to run (TRANSACTION_STATS, FRA_BLOCKS, INTEGRATION_HEALTH).
        #[arg(short, long)]
        intent: String,

        /// Merchant identifier.
        #[arg(short, long, default_value = CURRENT_MERCHANT)]
        merchant: String,
    },

    /// Summarize a saved transcript into a triage note.
    ///
    /// The file holds a JSON array of `{"role": ..., "text": ...}` entries.
    Summarize {
        /// Path to the transcript JSON file.
        file: PathBuf,
    },

    /// Print the tool schema advertised to the reasoning engine.
    ToolSchema,

    /// Write the default prompt templates for customization.
    ///
    /// Existing files are not overwritten.
    InitPrompts {
        /// Target directory (default: ~/.config/first-aid-rs/prompts).
        dir: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_diagnose_defaults() {
        let cli = Cli::try_parse_from(["first-aid-rs", "diagnose", "--intent", "FRA_BLOCKS"])
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(cli.format, "text");
        assert!(!cli.mock);
        match cli.command {
            Commands::Diagnose { intent, merchant } => {
                assert_eq!(intent, "FRA_BLOCKS");
                assert_eq!(merchant, CURRENT_MERCHANT);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["first-aid-rs", "ask", "hello", "--mock", "--format", "json"])
            .unwrap_or_else(|_| unreachable!());
        assert!(cli.mock);
        assert_eq!(cli.format, "json");
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
