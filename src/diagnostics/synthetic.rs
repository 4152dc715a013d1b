//! Canned diagnostic results used in synthetic mode and as the fallback
//! for every live-path failure.
//!
//! The table is fixed per intent. `TRANSACTION_STATS` flips an unweighted
//! coin between a healthy and a degraded merchant, drawn from the caller's
//! random source so runs can be seeded.

use rand::Rng;

use super::intent::{DiagnosticIntent, DiagnosticResult, HealthStatus};

/// Error code reported for the fraud-block scenario.
pub const RISK_BLOCK_VELOCITY: &str = "RISK_BLOCK_VELOCITY";
/// Error code reported for the broken-integration scenario.
pub const INVALID_SIGNATURE: &str = "INVALID_SIGNATURE";
/// Error code reported for the degraded transaction scenario.
pub const GATEWAY_TIMEOUT: &str = "GATEWAY_TIMEOUT";

/// Produces the synthetic result for `intent`.
pub fn synthetic_result<R: Rng + ?Sized>(intent: DiagnosticIntent, rng: &mut R) -> DiagnosticResult {
    match intent {
        DiagnosticIntent::FraBlocks => DiagnosticResult {
            success_rate: 0,
            fra_blocks: 42,
            api_failures: 0,
            last_error_code: Some(RISK_BLOCK_VELOCITY.to_string()),
            status: HealthStatus::Critical,
        },
        DiagnosticIntent::IntegrationHealth => DiagnosticResult {
            success_rate: 15,
            fra_blocks: 0,
            api_failures: 85,
            last_error_code: Some(INVALID_SIGNATURE.to_string()),
            status: HealthStatus::Warning,
        },
        DiagnosticIntent::TransactionStats => {
            if rng.gen_bool(0.5) {
                healthy_transactions()
            } else {
                degraded_transactions()
            }
        }
    }
}

/// Healthy branch of the `TRANSACTION_STATS` coin flip.
#[must_use]
pub const fn healthy_transactions() -> DiagnosticResult {
    DiagnosticResult {
        success_rate: 98,
        fra_blocks: 0,
        api_failures: 1,
        last_error_code: None,
        status: HealthStatus::Healthy,
    }
}

/// Degraded branch of the `TRANSACTION_STATS` coin flip.
#[must_use]
pub fn degraded_transactions() -> DiagnosticResult {
    DiagnosticResult {
        success_rate: 45,
        fra_blocks: 2,
        api_failures: 50,
        last_error_code: Some(GATEWAY_TIMEOUT.to_string()),
        status: HealthStatus::Warning,
    }
}
