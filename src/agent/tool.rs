//! Tool registry for engine function-calling.
//!
//! Declares the single diagnostic tool, `checkMerchantLogs`, and the
//! provider-agnostic types for tool definitions, calls, and results. The
//! schema is handed to the engine verbatim at session start.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::diagnostics::DiagnosticIntent;

/// Name of the diagnostic tool.
pub const CHECK_MERCHANT_LOGS: &str = "checkMerchantLogs";

/// Merchant id used when the engine omits `merchantId`.
pub const CURRENT_MERCHANT: &str = "current_merchant";

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match dispatch table in executor).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: serde_json::Value,
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// The result of executing a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result corresponds to.
    pub tool_call_id: String,
    /// Result content (JSON string on success, error message on failure).
    pub content: String,
    /// Whether this result represents an error.
    pub is_error: bool,
}

/// The set of tools advertised to the engine.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    definitions: Vec<ToolDefinition>,
}

impl ToolSet {
    /// Returns the tool definitions in this set.
    #[must_use]
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Returns `true` if this set contains no tools.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the number of tools in this set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Tool set for a support session: the diagnostic log query.
    #[must_use]
    pub fn diagnostic_tools() -> Self {
        Self {
            definitions: vec![def_check_merchant_logs()],
        }
    }

    /// Empty tool set (used for summary generation).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

/// Defines the `checkMerchantLogs` tool.
fn def_check_merchant_logs() -> ToolDefinition {
    let intents: Vec<&str> = DiagnosticIntent::ALL.iter().map(|i| i.as_str()).collect();
    ToolDefinition {
        name: CHECK_MERCHANT_LOGS.to_string(),
        description: "Queries the merchant analytics logging system to check transaction logs, \
                      success rates (SR), fraud blocks and integration health."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "queryType": {
                    "type": "string",
                    "enum": intents,
                    "description": "The type of log analysis to perform based on the merchant complaint."
                },
                "merchantId": {
                    "type": "string",
                    "description": "The merchant identifier (if available, otherwise use \"current_merchant\")."
                }
            },
            "required": ["queryType"]
        }),
    }
}

/// Arguments of a `checkMerchantLogs` call, as sent by the engine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDiagnosticArgs {
    #[serde(default)]
    query_type: Option<serde_json::Value>,
    #[serde(default)]
    merchant_id: Option<serde_json::Value>,
}

/// Validated arguments of a `checkMerchantLogs` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticToolArgs {
    /// Requested analysis.
    pub intent: DiagnosticIntent,
    /// Merchant to query; [`CURRENT_MERCHANT`] when the engine omitted it.
    pub merchant_id: String,
}

impl DiagnosticToolArgs {
    /// Parses the JSON arguments of a tool call.
    ///
    /// A missing, unrecognized or non-string `queryType` resolves to
    /// `TRANSACTION_STATS`, the general-purpose analysis. A numeric
    /// `merchantId` is used as its decimal text; a missing, blank or
    /// otherwise typed one resolves to [`CURRENT_MERCHANT`]. Empty argument
    /// strings are treated as `{}`.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if `arguments` is not a JSON object.
    pub fn parse(arguments: &str) -> Result<Self, serde_json::Error> {
        let raw: RawDiagnosticArgs = if arguments.trim().is_empty() {
            RawDiagnosticArgs::default()
        } else {
            serde_json::from_str(arguments)?
        };

        let intent = raw
            .query_type
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .and_then(|q| q.parse().ok())
            .unwrap_or(DiagnosticIntent::TransactionStats);
        let merchant_id = match raw.merchant_id {
            Some(serde_json::Value::String(m)) => m.trim().to_string(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let merchant_id = if merchant_id.is_empty() {
            CURRENT_MERCHANT.to_string()
        } else {
            merchant_id
        };

        Ok(Self {
            intent,
            merchant_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolset_diagnostic() {
        let ts = ToolSet::diagnostic_tools();
        assert_eq!(ts.len(), 1);
        assert_eq!(ts.definitions()[0].name, CHECK_MERCHANT_LOGS);
    }

    #[test]
    fn test_toolset_none() {
        let ts = ToolSet::none();
        assert!(ts.is_empty());
    }

    #[test]
    fn test_schema_shape() {
        let def = def_check_merchant_logs();
        assert_eq!(def.parameters["type"], "object");
        assert_eq!(def.parameters["required"], json!(["queryType"]));
        assert_eq!(
            def.parameters["properties"]["queryType"]["enum"],
            json!(["TRANSACTION_STATS", "FRA_BLOCKS", "INTEGRATION_HEALTH"])
        );
        assert!(def.parameters["properties"]["merchantId"].is_object());
    }

    #[test]
    fn test_schema_is_stable() {
        assert_eq!(
            ToolSet::diagnostic_tools().definitions(),
            ToolSet::diagnostic_tools().definitions()
        );
    }

    #[test]
    fn test_parse_args_full() {
        let args = DiagnosticToolArgs::parse(r#"{"queryType":"FRA_BLOCKS","merchantId":"M-9"}"#)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(args.intent, DiagnosticIntent::FraBlocks);
        assert_eq!(args.merchant_id, "M-9");
    }

    #[test]
    fn test_parse_args_sentinel_merchant() {
        let args = DiagnosticToolArgs::parse(r#"{"queryType":"INTEGRATION_HEALTH"}"#)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(args.merchant_id, CURRENT_MERCHANT);

        let blank = DiagnosticToolArgs::parse(r#"{"queryType":"FRA_BLOCKS","merchantId":"  "}"#)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(blank.merchant_id, CURRENT_MERCHANT);
    }

    #[test]
    fn test_parse_args_unknown_intent_defaults() {
        let args = DiagnosticToolArgs::parse(r#"{"queryType":"REFUNDS"}"#)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(args.intent, DiagnosticIntent::TransactionStats);

        let empty = DiagnosticToolArgs::parse("").unwrap_or_else(|_| unreachable!());
        assert_eq!(empty.intent, DiagnosticIntent::TransactionStats);
    }

    #[test]
    fn test_parse_args_numeric_merchant_id() {
        let args = DiagnosticToolArgs::parse(r#"{"queryType":"FRA_BLOCKS","merchantId":12345}"#)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(args.intent, DiagnosticIntent::FraBlocks);
        assert_eq!(args.merchant_id, "12345");

        let odd = DiagnosticToolArgs::parse(r#"{"queryType":"FRA_BLOCKS","merchantId":{"id":1}}"#)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(odd.merchant_id, CURRENT_MERCHANT);
    }

    #[test]
    fn test_parse_args_non_string_intent_defaults() {
        let args = DiagnosticToolArgs::parse(r#"{"queryType":1,"merchantId":null}"#)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(args.intent, DiagnosticIntent::TransactionStats);
        assert_eq!(args.merchant_id, CURRENT_MERCHANT);
    }

    #[test]
    fn test_parse_args_malformed() {
        assert!(DiagnosticToolArgs::parse("not json").is_err());
    }

    #[test]
    fn test_tool_call_serialization() {
        let call = ToolCall {
            id: "call_123".to_string(),
            name: CHECK_MERCHANT_LOGS.to_string(),
            arguments: r#"{"queryType":"FRA_BLOCKS"}"#.to_string(),
        };
        let json = serde_json::to_string(&call).unwrap_or_default();
        assert!(json.contains("call_123"));
        assert!(json.contains(CHECK_MERCHANT_LOGS));
    }
}
