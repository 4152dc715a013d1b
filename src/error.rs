//! Error types for first-aid-rs.
//!
//! Each layer has its own error enum. Diagnostics errors never leave the
//! query client (they are logged and replaced by synthetic data), agent
//! errors are recovered at the turn boundary except during summary
//! generation, and command errors surface to the CLI.

use thiserror::Error;

/// Result alias for CLI-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Reasoning engine or orchestration failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// CLI command failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// I/O failure (transcript files, prompt templates, stdin).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the reasoning engine and the session machinery.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was configured for the provider.
    #[error("API key missing: set FIRST_AID_API_KEY, GEMINI_API_KEY or OPENAI_API_KEY")]
    ApiKeyMissing,

    /// The provider rejected or failed a request.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Error description from the transport or SDK.
        message: String,
        /// HTTP status, when known.
        status: Option<u16>,
    },

    /// The engine answered with content we could not interpret.
    #[error("failed to parse response: {message}")]
    ResponseParse {
        /// What went wrong.
        message: String,
        /// The offending content.
        content: String,
    },

    /// A tool call could not be executed.
    #[error("tool '{name}' failed: {message}")]
    ToolExecution {
        /// Tool name as requested by the engine.
        name: String,
        /// Failure description.
        message: String,
    },

    /// The engine kept requesting tools past the iteration limit.
    #[error("tool loop exceeded {max_iterations} iterations")]
    ToolLoopExceeded {
        /// The configured limit.
        max_iterations: usize,
    },

    /// Unknown provider name in configuration.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// The configured provider name.
        name: String,
    },

    /// Invalid session usage (e.g. empty user message).
    #[error("orchestration error: {message}")]
    Orchestration {
        /// Failure description.
        message: String,
    },
}

/// Live-path failures of the diagnostics query client.
///
/// These are logged and replaced with synthetic results; callers of
/// [`crate::diagnostics::QueryClient::query`] never see them.
#[derive(Debug, Error)]
pub enum DiagnosticsError {
    /// Identity endpoint did not yield a bearer token.
    #[error("credential exchange failed: {0}")]
    CredentialExchange(String),

    /// Network-level failure (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Analytics endpoint answered with a non-2xx status.
    #[error("analytics query returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Response body was not a JSON object.
    #[error("could not decode analytics response: {0}")]
    Decode(String),
}

/// Errors specific to CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Invalid user-supplied argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A command could not complete.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// Output could not be rendered.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_display() {
        let err = AgentError::ToolLoopExceeded { max_iterations: 3 };
        assert_eq!(err.to_string(), "tool loop exceeded 3 iterations");
    }

    #[test]
    fn test_error_from_agent_is_transparent() {
        let err: Error = AgentError::ApiKeyMissing.into();
        assert!(err.to_string().starts_with("API key missing"));
    }

    #[test]
    fn test_status_error_display() {
        let err = DiagnosticsError::Status {
            status: 503,
            body: "unavailable".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "analytics query returned HTTP 503: unavailable"
        );
    }
}
