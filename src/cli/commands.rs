//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

// Allow certain patterns that improve readability in CLI output formatting
#![allow(clippy::format_push_string)]

use std::io::Write as IoWrite;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tracing::debug;

use crate::agent::client::create_provider;
use crate::agent::config::AgentConfig;
use crate::agent::executor::ToolEvent;
use crate::agent::prompt::PromptSet;
use crate::agent::provider::LlmProvider;
use crate::agent::session::Session;
use crate::agent::summary::{SummaryGenerator, TranscriptEntry};
use crate::agent::tool::ToolSet;
use crate::cli::output::{
    OutputFormat, format_diagnostic, format_event, format_note, format_ticket,
};
use crate::cli::parser::{Cli, Commands};
use crate::diagnostics::{DiagnosticIntent, DiagnosticsConfig, QueryClient};
use crate::error::{CommandError, Result};
use crate::escalation::Ticket;

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Chat { merchant_name } => cmd_chat(cli, merchant_name, format),
        Commands::Ask { message } => cmd_ask(cli, message, format),
        Commands::Diagnose { intent, merchant } => cmd_diagnose(cli, intent, merchant, format),
        Commands::Summarize { file } => cmd_summarize(cli, file, format),
        Commands::ToolSchema => Ok(cmd_tool_schema()),
        Commands::InitPrompts { dir } => cmd_init_prompts(dir.as_deref(), format),
    }
}

// ==================== Wiring ====================

/// Creates a tokio runtime as sync/async bridge.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")).into()
    })
}

fn diagnostics_config(cli: &Cli) -> DiagnosticsConfig {
    let mut builder = DiagnosticsConfig::builder();
    if cli.mock {
        builder = builder.use_synthetic(true);
    }
    builder.from_env().build()
}

fn query_client(cli: &Cli) -> Result<Arc<QueryClient>> {
    let config = diagnostics_config(cli);
    debug!(offline = config.is_offline(), "diagnostics backend configured");
    let client = QueryClient::new(config).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to build diagnostics client: {e}"))
    })?;
    Ok(Arc::new(client))
}

fn agent_config(cli: &Cli) -> Result<AgentConfig> {
    let mut builder = AgentConfig::builder();
    if let Some(dir) = &cli.prompt_dir {
        builder = builder.prompt_dir(dir);
    }
    builder.from_env().build().map_err(|e| {
        CommandError::ExecutionFailed(format!("Agent configuration error: {e}")).into()
    })
}

fn provider(config: &AgentConfig) -> Result<Arc<dyn LlmProvider>> {
    let provider = create_provider(config).map_err(|e| {
        CommandError::ExecutionFailed(format!("Provider creation failed: {e}"))
    })?;
    Ok(Arc::from(provider))
}

/// Everything a conversation needs, built once per command.
struct Assistant {
    provider: Arc<dyn LlmProvider>,
    session: Session,
    summarizer: SummaryGenerator,
    events: UnboundedReceiver<ToolEvent>,
}

impl Assistant {
    fn new(cli: &Cli) -> Result<Self> {
        let config = agent_config(cli)?;
        let prompts = PromptSet::load(config.prompt_dir.as_deref());
        let provider = provider(&config)?;
        let backend = query_client(cli)?;

        let (tx, events) = unbounded_channel();
        let session =
            Session::new(Arc::clone(&provider), backend, &config, &prompts.session).with_events(tx);
        let summarizer = SummaryGenerator::new(&config, &prompts.summary);

        Ok(Self {
            provider,
            session,
            summarizer,
            events,
        })
    }

    /// Runs one turn and collects the tool events it produced.
    async fn turn(&mut self, message: &str) -> (String, Vec<ToolEvent>) {
        let reply = self.session.send_message(message).await;
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        (reply, events)
    }
}

fn render_turn(reply: &str, events: &[ToolEvent]) -> String {
    let mut output = String::new();
    for event in events {
        output.push_str(&format_event(event));
    }
    if !events.is_empty() {
        output.push('\n');
    }
    output.push_str(reply);
    output.push('\n');
    output
}

// ==================== Command Implementations ====================

fn cmd_ask(cli: &Cli, message: &str, format: OutputFormat) -> Result<String> {
    if message.trim().is_empty() {
        return Err(CommandError::InvalidArgument("message must not be empty".to_string()).into());
    }

    let mut assistant = Assistant::new(cli)?;
    let rt = runtime()?;
    let (reply, events) = rt.block_on(assistant.turn(message));

    match format {
        OutputFormat::Text => Ok(render_turn(&reply, &events)),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "reply": reply,
                "events": events,
                "transcript": assistant.session.transcript(),
            });
            Ok(format.to_json(&json))
        }
    }
}

fn cmd_chat(cli: &Cli, merchant_name: &str, format: OutputFormat) -> Result<String> {
    let mut assistant = Assistant::new(cli)?;
    let rt = runtime()?;
    rt.block_on(chat_loop(&mut assistant, merchant_name, format))?;
    Ok(String::new())
}

async fn chat_loop(
    assistant: &mut Assistant,
    merchant_name: &str,
    format: OutputFormat,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    writeln!(
        stdout,
        "Hi! Describe the problem you're seeing with your payments.\n\
         Commands: /escalate  /reset  /quit"
    )?;

    loop {
        write!(stdout, "you> ")?;
        stdout.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => {}
            "/quit" | "/exit" => break,
            "/reset" => {
                assistant.session.reset();
                writeln!(stdout, "Conversation cleared.")?;
            }
            "/escalate" => {
                let transcript = assistant.session.summary_transcript();
                match Ticket::escalate(
                    &assistant.summarizer,
                    assistant.provider.as_ref(),
                    &transcript,
                    merchant_name,
                )
                .await
                {
                    Ok(ticket) => {
                        let rendered = match format {
                            OutputFormat::Text => format_ticket(&ticket),
                            OutputFormat::Json => format.to_json(&ticket),
                        };
                        write!(stdout, "{rendered}")?;
                        assistant.session.reset();
                    }
                    Err(e) => writeln!(stdout, "Could not escalate: {e}")?,
                }
            }
            message => {
                let (reply, events) = assistant.turn(message).await;
                let rendered = match format {
                    OutputFormat::Text => format!("bot> {}", render_turn(&reply, &events)),
                    OutputFormat::Json => format.to_json(&serde_json::json!({
                        "reply": reply,
                        "events": events,
                    })),
                };
                write!(stdout, "{rendered}")?;
            }
        }
    }

    Ok(())
}

fn cmd_diagnose(
    cli: &Cli,
    intent: &str,
    merchant: &str,
    format: OutputFormat,
) -> Result<String> {
    let intent: DiagnosticIntent = intent
        .parse()
        .map_err(|e| CommandError::InvalidArgument(format!("{e}")))?;
    let client = query_client(cli)?;

    let rt = runtime()?;
    let result = rt.block_on(client.query(merchant, intent));

    match format {
        OutputFormat::Text => Ok(format_diagnostic(intent, merchant, &result)),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "intent": intent,
                "merchant_id": merchant,
                "result": result.to_json(),
            });
            Ok(format.to_json(&json))
        }
    }
}

fn cmd_summarize(cli: &Cli, file: &Path, format: OutputFormat) -> Result<String> {
    let raw = std::fs::read_to_string(file)?;
    let transcript: Vec<TranscriptEntry> = serde_json::from_str(&raw).map_err(|e| {
        CommandError::InvalidArgument(format!(
            "{} is not a transcript (expected [{{\"role\", \"text\"}}]): {e}",
            file.display()
        ))
    })?;
    if transcript.is_empty() {
        return Err(CommandError::InvalidArgument(format!(
            "{} contains no messages",
            file.display()
        ))
        .into());
    }

    let config = agent_config(cli)?;
    let prompts = PromptSet::load(config.prompt_dir.as_deref());
    let provider = provider(&config)?;
    let summarizer = SummaryGenerator::new(&config, &prompts.summary);

    let rt = runtime()?;
    let note = rt.block_on(summarizer.summarize(provider.as_ref(), &transcript))?;

    match format {
        OutputFormat::Text => Ok(format_note(&note)),
        OutputFormat::Json => Ok(format.to_json(&note)),
    }
}

fn cmd_tool_schema() -> String {
    OutputFormat::Json.to_json(&ToolSet::diagnostic_tools().definitions())
}

fn cmd_init_prompts(dir: Option<&Path>, format: OutputFormat) -> Result<String> {
    let target_dir = dir
        .map(std::path::PathBuf::from)
        .or_else(PromptSet::default_dir)
        .ok_or_else(|| {
            CommandError::ExecutionFailed(
                "Could not determine home directory for default prompt path".to_string(),
            )
        })?;

    let written = PromptSet::write_defaults(&target_dir).map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to write prompt templates: {e}"))
    })?;

    match format {
        OutputFormat::Text => {
            if written.is_empty() {
                Ok(format!(
                    "All prompt templates already exist in: {}\n",
                    target_dir.display()
                ))
            } else {
                let mut output = format!(
                    "Wrote {} prompt template(s) to: {}\n",
                    written.len(),
                    target_dir.display()
                );
                for path in &written {
                    output.push_str(&format!(
                        "  {}\n",
                        path.file_name()
                            .and_then(|n| n.to_str())
                            .unwrap_or("unknown")
                    ));
                }
                output.push_str("\nEdit these files to customize the assistant's prompts.\n");
                Ok(output)
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "directory": target_dir.to_string_lossy(),
                "written": written.iter().map(|p| p.to_string_lossy().into_owned()).collect::<Vec<_>>(),
                "count": written.len()
            });
            Ok(format.to_json(&json))
        }
    }
}
