//! Diagnostic query client for the merchant analytics backend.
//!
//! # Architecture
//!
//! ```text
//! query(merchant_id, intent)
//!   ├── offline (synthetic mode or no host) → synthetic row after latency
//!   └── live
//!       ├── identity: client_credentials → access_token
//!       ├── analytics: POST FQL query (O-Bearer token)
//!       ├── map response → DiagnosticResult (field-by-field defaults)
//!       └── any failure → warn! + synthetic row
//! ```

pub mod client;
pub mod config;
pub mod intent;
pub mod synthetic;

pub use client::{DiagnosticBackend, QueryClient, map_response};
pub use config::DiagnosticsConfig;
pub use intent::{DiagnosticIntent, DiagnosticResult, HealthStatus, ParseIntentError};
pub use synthetic::synthetic_result;
