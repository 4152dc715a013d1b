//! Diagnostics backend configuration with builder pattern and environment
//! variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//! It is read once at startup and never reloaded.

use std::time::Duration;

/// Default identity token path on the identity host.
pub const DEFAULT_TOKEN_PATH: &str = "/v1/auth/token";
/// Default analytics query path on the analytics host.
pub const DEFAULT_QUERY_PATH: &str = "/v1/fql/query";
/// Default `X-APP-ID` header value.
pub const DEFAULT_APP_ID: &str = "merchant-first-aid";
/// Default artificial latency of synthetic results.
const DEFAULT_SYNTHETIC_LATENCY_MS: u64 = 1500;
/// Default HTTP timeout for the identity and analytics calls.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
/// Default analytics lookback window.
const DEFAULT_WINDOW_MINUTES: u32 = 60;

/// Configuration for the diagnostic query client.
#[derive(Clone)]
pub struct DiagnosticsConfig {
    /// Analytics service base URL. `None` forces synthetic mode.
    pub analytics_host: Option<String>,
    /// Identity service base URL.
    pub identity_host: Option<String>,
    /// Path of the client-credentials token endpoint.
    pub token_path: String,
    /// Path of the analytics query endpoint.
    pub query_path: String,
    /// Client id for the credential exchange and `X-Client-Id`.
    pub client_id: String,
    /// Client secret for the credential exchange.
    pub client_secret: String,
    /// `X-APP-ID` header value.
    pub app_id: String,
    /// Serve canned results instead of querying the backend.
    pub use_synthetic: bool,
    /// Artificial delay applied to synthetic results.
    pub synthetic_latency: Duration,
    /// Timeout for each HTTP call on the live path.
    pub http_timeout: Duration,
    /// Lookback window sent with each analytics query.
    pub window_minutes: u32,
}

impl std::fmt::Debug for DiagnosticsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticsConfig")
            .field("analytics_host", &self.analytics_host)
            .field("identity_host", &self.identity_host)
            .field("token_path", &self.token_path)
            .field("query_path", &self.query_path)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("app_id", &self.app_id)
            .field("use_synthetic", &self.use_synthetic)
            .field("synthetic_latency", &self.synthetic_latency)
            .field("http_timeout", &self.http_timeout)
            .field("window_minutes", &self.window_minutes)
            .finish()
    }
}

impl DiagnosticsConfig {
    /// Creates a new builder for `DiagnosticsConfig`.
    #[must_use]
    pub fn builder() -> DiagnosticsConfigBuilder {
        DiagnosticsConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::builder().from_env().build()
    }

    /// Whether queries skip the network entirely.
    ///
    /// True in synthetic mode and whenever no analytics host is configured.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.use_synthetic
            || self
                .analytics_host
                .as_deref()
                .is_none_or(|h| h.trim().is_empty())
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`DiagnosticsConfig`].
#[derive(Clone, Default)]
pub struct DiagnosticsConfigBuilder {
    analytics_host: Option<String>,
    identity_host: Option<String>,
    token_path: Option<String>,
    query_path: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    app_id: Option<String>,
    use_synthetic: Option<bool>,
    synthetic_latency: Option<Duration>,
    http_timeout: Option<Duration>,
    window_minutes: Option<u32>,
}

impl std::fmt::Debug for DiagnosticsConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticsConfigBuilder")
            .field("analytics_host", &self.analytics_host)
            .field("identity_host", &self.identity_host)
            .field("token_path", &self.token_path)
            .field("query_path", &self.query_path)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("app_id", &self.app_id)
            .field("use_synthetic", &self.use_synthetic)
            .field("synthetic_latency", &self.synthetic_latency)
            .field("http_timeout", &self.http_timeout)
            .field("window_minutes", &self.window_minutes)
            .finish()
    }
}

/// Reads a non-empty environment variable.
fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parses a boolean flag the way shell users write them.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl DiagnosticsConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.analytics_host.is_none() {
            self.analytics_host = env_nonempty("FIRST_AID_ANALYTICS_HOST");
        }
        if self.identity_host.is_none() {
            self.identity_host = env_nonempty("FIRST_AID_IDENTITY_HOST");
        }
        if self.client_id.is_none() {
            self.client_id = env_nonempty("FIRST_AID_CLIENT_ID");
        }
        if self.client_secret.is_none() {
            self.client_secret = env_nonempty("FIRST_AID_CLIENT_SECRET");
        }
        if self.app_id.is_none() {
            self.app_id = env_nonempty("FIRST_AID_APP_ID");
        }
        if self.use_synthetic.is_none() {
            self.use_synthetic = env_nonempty("FIRST_AID_USE_MOCK_DATA").and_then(|v| parse_flag(&v));
        }
        if self.synthetic_latency.is_none() {
            self.synthetic_latency = env_nonempty("FIRST_AID_SYNTHETIC_LATENCY_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis);
        }
        self
    }

    /// Sets the analytics host.
    #[must_use]
    pub fn analytics_host(mut self, host: impl Into<String>) -> Self {
        self.analytics_host = Some(host.into());
        self
    }

    /// Sets the identity host.
    #[must_use]
    pub fn identity_host(mut self, host: impl Into<String>) -> Self {
        self.identity_host = Some(host.into());
        self
    }

    /// Sets the token endpoint path.
    #[must_use]
    pub fn token_path(mut self, path: impl Into<String>) -> Self {
        self.token_path = Some(path.into());
        self
    }

    /// Sets the analytics query path.
    #[must_use]
    pub fn query_path(mut self, path: impl Into<String>) -> Self {
        self.query_path = Some(path.into());
        self
    }

    /// Sets the client id and secret.
    #[must_use]
    pub fn credentials(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self.client_secret = Some(secret.into());
        self
    }

    /// Sets the `X-APP-ID` value.
    #[must_use]
    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Selects synthetic (`true`) or live (`false`) mode.
    #[must_use]
    pub const fn use_synthetic(mut self, enabled: bool) -> Self {
        self.use_synthetic = Some(enabled);
        self
    }

    /// Sets the artificial synthetic latency.
    #[must_use]
    pub const fn synthetic_latency(mut self, latency: Duration) -> Self {
        self.synthetic_latency = Some(latency);
        self
    }

    /// Sets the HTTP timeout for live calls.
    #[must_use]
    pub const fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Sets the analytics lookback window.
    #[must_use]
    pub const fn window_minutes(mut self, minutes: u32) -> Self {
        self.window_minutes = Some(minutes);
        self
    }

    /// Builds the [`DiagnosticsConfig`].
    ///
    /// Never fails: a missing host or credential just routes queries to
    /// synthetic data.
    #[must_use]
    pub fn build(self) -> DiagnosticsConfig {
        DiagnosticsConfig {
            analytics_host: self.analytics_host,
            identity_host: self.identity_host,
            token_path: self
                .token_path
                .unwrap_or_else(|| DEFAULT_TOKEN_PATH.to_string()),
            query_path: self
                .query_path
                .unwrap_or_else(|| DEFAULT_QUERY_PATH.to_string()),
            client_id: self.client_id.unwrap_or_default(),
            client_secret: self.client_secret.unwrap_or_default(),
            app_id: self.app_id.unwrap_or_else(|| DEFAULT_APP_ID.to_string()),
            use_synthetic: self.use_synthetic.unwrap_or(true),
            synthetic_latency: self
                .synthetic_latency
                .unwrap_or(Duration::from_millis(DEFAULT_SYNTHETIC_LATENCY_MS)),
            http_timeout: self
                .http_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)),
            window_minutes: self.window_minutes.unwrap_or(DEFAULT_WINDOW_MINUTES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = DiagnosticsConfig::builder().build();
        assert!(config.use_synthetic);
        assert!(config.is_offline());
        assert_eq!(config.app_id, DEFAULT_APP_ID);
        assert_eq!(config.synthetic_latency, Duration::from_millis(1500));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_live_mode_without_host_is_offline() {
        let config = DiagnosticsConfig::builder().use_synthetic(false).build();
        assert!(config.is_offline());

        let blank = DiagnosticsConfig::builder()
            .use_synthetic(false)
            .analytics_host("  ")
            .build();
        assert!(blank.is_offline());
    }

    #[test]
    fn test_live_mode_with_host_is_online() {
        let config = DiagnosticsConfig::builder()
            .use_synthetic(false)
            .analytics_host("https://analytics.example")
            .credentials("id", "secret")
            .build();
        assert!(!config.is_offline());
        assert_eq!(config.client_id, "id");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = DiagnosticsConfig::builder()
            .credentials("id", "hunter2")
            .build();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));

        let builder = DiagnosticsConfig::builder().credentials("id", "hunter2");
        assert!(!format!("{builder:?}").contains("hunter2"));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
