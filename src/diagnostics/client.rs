//! Diagnostic query client.
//!
//! Authenticates against the identity service with a client-credentials
//! exchange, runs an intent-tagged analytics query and maps the response
//! into [`DiagnosticResult`]. Every failure on that path is logged and
//! answered with the synthetic result for the same intent, so callers
//! always get a result.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::config::DiagnosticsConfig;
use super::intent::{DiagnosticIntent, DiagnosticResult, HealthStatus};
use super::synthetic::synthetic_result;
use crate::error::DiagnosticsError;

/// Maximum response body length kept in error messages.
const MAX_ERROR_BODY_LEN: usize = 512;

/// Anything that can answer a diagnostic query.
///
/// The session orchestrator depends on this trait rather than on
/// [`QueryClient`] so tests can count and inspect invocations.
#[async_trait]
pub trait DiagnosticBackend: Send + Sync {
    /// Runs one diagnostic query. Never fails.
    async fn query(&self, merchant_id: &str, intent: DiagnosticIntent) -> DiagnosticResult;
}

/// Token payload returned by the identity service.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Intent-tagged FQL query sent to the analytics service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyticsQuery<'a> {
    query_type: DiagnosticIntent,
    merchant_id: &'a str,
    fql: FqlBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FqlBody<'a> {
    table: &'static str,
    filters: Vec<FqlFilter<'a>>,
    window_minutes: u32,
}

#[derive(Debug, Serialize)]
struct FqlFilter<'a> {
    field: &'static str,
    op: &'static str,
    value: &'a str,
}

impl<'a> AnalyticsQuery<'a> {
    fn new(merchant_id: &'a str, intent: DiagnosticIntent, window_minutes: u32) -> Self {
        let table = match intent {
            DiagnosticIntent::TransactionStats => "transactions",
            DiagnosticIntent::FraBlocks => "risk_events",
            DiagnosticIntent::IntegrationHealth => "api_calls",
        };
        Self {
            query_type: intent,
            merchant_id,
            fql: FqlBody {
                table,
                filters: vec![FqlFilter {
                    field: "merchantId",
                    op: "=",
                    value: merchant_id,
                }],
                window_minutes,
            },
        }
    }
}

/// Diagnostic query client for the analytics backend.
///
/// Built once from a [`DiagnosticsConfig`] and shared (behind an `Arc`)
/// by all sessions. The random source used for synthetic results is
/// injectable so runs can be reproduced.
pub struct QueryClient {
    config: DiagnosticsConfig,
    http: reqwest::Client,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("config", &self.config)
            .field("http", &"<reqwest::Client>")
            .finish_non_exhaustive()
    }
}

impl QueryClient {
    /// Creates a client from configuration, seeding the random source from
    /// OS entropy.
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosticsError::Transport`] if the HTTP client cannot be
    /// built (e.g. TLS backend initialization failure).
    pub fn new(config: DiagnosticsConfig) -> Result<Self, DiagnosticsError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            config,
            http,
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    /// Replaces the random source used for synthetic results.
    #[must_use]
    pub fn with_rng(self, rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            ..self
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    /// Runs a diagnostic query, falling back to synthetic data on any
    /// configuration gap or live-path failure.
    pub async fn query(&self, merchant_id: &str, intent: DiagnosticIntent) -> DiagnosticResult {
        if self.config.is_offline() {
            debug!(merchant_id, %intent, "offline mode; serving synthetic result");
            return self.synthetic(intent).await;
        }

        info!(merchant_id, %intent, "querying analytics backend");
        match self.query_live(merchant_id, intent).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    merchant_id,
                    %intent,
                    error = %e,
                    "live diagnostic query failed; serving synthetic result"
                );
                self.synthetic_now(intent)
            }
        }
    }

    /// Synthetic result after the configured artificial latency.
    async fn synthetic(&self, intent: DiagnosticIntent) -> DiagnosticResult {
        if !self.config.synthetic_latency.is_zero() {
            tokio::time::sleep(self.config.synthetic_latency).await;
        }
        self.synthetic_now(intent)
    }

    fn synthetic_now(&self, intent: DiagnosticIntent) -> DiagnosticResult {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        synthetic_result(intent, &mut *rng)
    }

    async fn query_live(
        &self,
        merchant_id: &str,
        intent: DiagnosticIntent,
    ) -> Result<DiagnosticResult, DiagnosticsError> {
        // Credentials are exchanged on every query; tokens are not cached.
        let token = self.fetch_token().await?;

        let host = self.config.analytics_host.as_deref().unwrap_or_default();
        let url = join_url(host, &self.config.query_path);
        let body = AnalyticsQuery::new(merchant_id, intent, self.config.window_minutes);

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("O-Bearer {token}"))
            .header(CONTENT_TYPE, "application/json")
            .header("X-APP-ID", &self.config.app_id)
            .header("X-Client-Id", &self.config.client_id)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiagnosticsError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY_LEN),
            });
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| DiagnosticsError::Decode(e.to_string()))?;
        let result = map_response(&value)?;
        debug!(%intent, status = ?result.status, "analytics query succeeded");
        Ok(result)
    }

    /// Exchanges the client credentials for a bearer token.
    async fn fetch_token(&self) -> Result<String, DiagnosticsError> {
        let host = self
            .config
            .identity_host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| {
                DiagnosticsError::CredentialExchange("no identity host configured".to_string())
            })?;
        let url = join_url(host, &self.config.token_path);

        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DiagnosticsError::CredentialExchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiagnosticsError::CredentialExchange(format!(
                "identity service returned HTTP {}: {}",
                status.as_u16(),
                truncate(&body, MAX_ERROR_BODY_LEN)
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DiagnosticsError::CredentialExchange(format!("invalid token response: {e}")))?;

        if token.access_token.is_empty() {
            return Err(DiagnosticsError::CredentialExchange(
                "identity service returned an empty access_token".to_string(),
            ));
        }

        debug!(
            expires_in = token.expires_in,
            token_type = token.token_type.as_deref().unwrap_or("unknown"),
            "obtained bearer token"
        );
        Ok(token.access_token)
    }
}

#[async_trait]
impl DiagnosticBackend for QueryClient {
    async fn query(&self, merchant_id: &str, intent: DiagnosticIntent) -> DiagnosticResult {
        Self::query(self, merchant_id, intent).await
    }
}

/// Maps an analytics response into the fixed result schema.
///
/// Accepts the record at the top level or wrapped in a `data` / `result`
/// envelope, snake_case or camelCase field names. Missing or malformed
/// fields fall back to: success rate 0, counts 0, no error code, status
/// `WARNING`.
///
/// # Errors
///
/// Returns [`DiagnosticsError::Decode`] if the body is not a JSON object.
pub fn map_response(value: &Value) -> Result<DiagnosticResult, DiagnosticsError> {
    let record = ["data", "result"]
        .iter()
        .find_map(|key| value.get(key).filter(|v| v.is_object()))
        .unwrap_or(value);

    let Some(fields) = record.as_object() else {
        return Err(DiagnosticsError::Decode(format!(
            "expected a JSON object, got {}",
            truncate(&record.to_string(), MAX_ERROR_BODY_LEN)
        )));
    };

    let lookup = |names: &[&str]| {
        names
            .iter()
            .find_map(|n| fields.get(*n).filter(|v| !v.is_null()))
    };

    let success_rate = lookup(&["sr", "successRate", "success_rate"])
        .and_then(as_number)
        .map_or(0, to_percentage);
    let fra_blocks = lookup(&["fra_blocks", "fraBlocks"])
        .and_then(as_number)
        .map_or(0, to_count);
    let api_failures = lookup(&["api_failures", "apiFailures"])
        .and_then(as_number)
        .map_or(0, to_count);
    let last_error_code = lookup(&["last_error_code", "lastErrorCode"])
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from);
    let status = lookup(&["status"])
        .and_then(Value::as_str)
        .and_then(HealthStatus::parse)
        .unwrap_or(HealthStatus::Warning);

    Ok(DiagnosticResult {
        success_rate,
        fra_blocks,
        api_failures,
        last_error_code,
        status,
    })
}

/// Reads a JSON number, or a string holding one.
fn as_number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .filter(|n| n.is_finite())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_percentage(n: f64) -> u8 {
    n.round().clamp(0.0, 100.0) as u8
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_count(n: f64) -> u64 {
    n.max(0.0) as u64
}

fn join_url(host: &str, path: &str) -> String {
    format!(
        "{}/{}",
        host.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
