//! CLI layer for first-aid-rs.
//!
//! Provides the command-line interface using clap: an interactive chat,
//! one-shot questions, direct diagnostics queries and transcript
//! summaries.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
