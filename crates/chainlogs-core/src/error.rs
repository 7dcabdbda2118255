//! Transport-level error types.

use thiserror::Error;

use crate::request::JsonRpcError;

/// HTTP statuses a node or gateway uses for transient overload or outage.
const RETRYABLE_HTTP_STATUSES: [u16; 8] = [403, 408, 413, 429, 500, 502, 503, 504];

/// JSON-RPC error codes that signal a transient node-side condition.
///
/// - `-1`: unknown error (often a proxy hiccup)
/// - `-32005`: limit exceeded / rate limited
/// - `-32603`: internal error
const RETRYABLE_RPC_CODES: [i64; 3] = [-1, -32005, -32603];

/// Errors that can occur during an RPC transport operation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The channel failed before a response arrived (connection refused, reset, DNS).
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// An attempt did not complete within the configured deadline.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if this error is transient and the request may be re-sent.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout { .. } => true,
            Self::Http { status, .. } => RETRYABLE_HTTP_STATUSES.contains(status),
            Self::Rpc(err) => RETRYABLE_RPC_CODES.contains(&err.code),
            Self::Deserialization(_) | Self::Other(_) => false,
        }
    }

    /// Returns `true` if the node answered with a well-formed JSON-RPC error.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }

    /// The JSON-RPC error code, when the node supplied one.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Rpc(err) => Some(err.code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rpc(code: i64) -> TransportError {
        TransportError::Rpc(JsonRpcError {
            code,
            message: "boom".into(),
            data: None,
        })
    }

    #[test]
    fn network_and_timeout_are_retryable() {
        assert!(TransportError::Network("connection reset".into()).is_retryable());
        assert!(TransportError::Timeout { ms: 10 }.is_retryable());
    }

    #[test]
    fn http_status_classification() {
        let transient = TransportError::Http { status: 429, body: String::new() };
        let fatal = TransportError::Http { status: 404, body: String::new() };
        assert!(transient.is_retryable());
        assert!(!fatal.is_retryable());
    }

    #[test]
    fn rpc_code_classification() {
        assert!(rpc(-32005).is_retryable());
        assert!(rpc(-32603).is_retryable());
        assert!(!rpc(-32602).is_retryable());
        assert!(!rpc(3).is_retryable());
        assert!(rpc(-32602).is_protocol_error());
        assert_eq!(rpc(-32602).code(), Some(-32602));
    }

    #[test]
    fn other_is_fatal() {
        let err = TransportError::Other("unexpected".into());
        assert!(!err.is_retryable());
        assert_eq!(err.code(), None);
    }
}
