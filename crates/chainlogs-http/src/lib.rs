//! chainlogs-http: HTTP JSON-RPC channel for ChainLogs.
//!
//! [`HttpTransport`] performs exactly one POST per request. Wrap it in
//! [`chainlogs_core::RetryTransport`] for backoff and per-attempt timeouts:
//!
//! ```ignore
//! use chainlogs_core::{RetryConfig, RetryTransport};
//! use chainlogs_http::HttpTransport;
//!
//! let http = HttpTransport::default_for("https://cloudflare-eth.com")?;
//! let transport = RetryTransport::new(http, RetryConfig::default());
//! ```

pub mod client;

pub use client::{HttpTransport, HttpTransportConfig};
