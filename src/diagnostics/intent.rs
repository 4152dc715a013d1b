//! Diagnostic query intents and the fixed result schema.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Class of analysis requested by the reasoning engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticIntent {
    /// Success rate and failure volume over recent transactions.
    TransactionStats,
    /// Fraud/risk-analytics blocks on the merchant.
    FraBlocks,
    /// API integration health (signatures, auth, malformed calls).
    IntegrationHealth,
}

impl DiagnosticIntent {
    /// All intents, in the order they are advertised to the engine.
    pub const ALL: [Self; 3] = [
        Self::TransactionStats,
        Self::FraBlocks,
        Self::IntegrationHealth,
    ];

    /// Wire name of the intent.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TransactionStats => "TRANSACTION_STATS",
            Self::FraBlocks => "FRA_BLOCKS",
            Self::IntegrationHealth => "INTEGRATION_HEALTH",
        }
    }
}

impl fmt::Display for DiagnosticIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known intent.
#[derive(Debug, Clone, Error)]
#[error("unknown diagnostic intent '{0}' (expected TRANSACTION_STATS, FRA_BLOCKS or INTEGRATION_HEALTH)")]
pub struct ParseIntentError(pub String);

impl FromStr for DiagnosticIntent {
    type Err = ParseIntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|intent| intent.as_str() == normalized)
            .ok_or_else(|| ParseIntentError(s.to_string()))
    }
}

/// Overall merchant health reported by a diagnostic query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    /// Nothing abnormal.
    Healthy,
    /// Degraded; merchant-side action likely needed.
    Warning,
    /// Payments are effectively blocked.
    Critical,
}

impl HealthStatus {
    /// Parses a backend status label, case-insensitively.
    ///
    /// Returns `None` for labels outside the three known states.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "HEALTHY" => Some(Self::Healthy),
            "WARNING" => Some(Self::Warning),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Fixed-shape outcome of one diagnostic query.
///
/// Field names on the wire follow the analytics schema (`sr`,
/// `fra_blocks`, ...). `last_error_code` serializes as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    /// Success rate, 0-100.
    #[serde(rename = "sr")]
    pub success_rate: u8,
    /// Transactions blocked by risk rules.
    pub fra_blocks: u64,
    /// Failed API calls.
    pub api_failures: u64,
    /// Most recent error code, if any.
    pub last_error_code: Option<String>,
    /// Overall status.
    pub status: HealthStatus,
}

impl DiagnosticResult {
    /// Serializes the result as the JSON handed back to the engine.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "sr": self.success_rate,
            "fra_blocks": self.fra_blocks,
            "api_failures": self.api_failures,
            "last_error_code": self.last_error_code,
            "status": self.status,
        })
    }
}
