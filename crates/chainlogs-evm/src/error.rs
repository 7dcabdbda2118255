//! Error types for schema construction, filter validation and log queries.

use chainlogs_core::TransportError;
use thiserror::Error;

/// Errors raised while constructing an [`EventSchema`](crate::EventSchema).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Invalid ABI type '{ty}': {reason}")]
    InvalidType { ty: String, reason: String },

    #[error("Event '{event}' has {count} indexed parameters (max {max})")]
    TooManyIndexed {
        event: String,
        count: usize,
        max: usize,
    },

    #[error("Event '{event}' declares parameter '{name}' more than once")]
    DuplicateParam { event: String, name: String },

    #[error("Anonymous event '{event}' has no signature topic and cannot be queried")]
    Anonymous { event: String },

    #[error("Cannot parse event signature: {reason}")]
    Parse { reason: String },
}

/// Failures of the ABI value codec.
///
/// Decoding never surfaces these to callers; they select the drop/keep
/// policy for a single log instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Topic decode failed: {reason}")]
    Topic { reason: String },

    #[error("Data decode failed: {reason}")]
    Data { reason: String },
}

/// Usage errors detected while building a filter, before any network call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("blockHash cannot be combined with fromBlock/toBlock")]
    BlockHashWithRange,

    #[error("fromBlock {from} is after toBlock {to}")]
    InvertedRange { from: u64, to: u64 },

    #[error("Parameter '{name}' is not indexed and cannot be filtered on")]
    NotIndexed { name: String },

    #[error("Event has no parameter named '{name}'")]
    UnknownParameter { name: String },

    #[error("{given} positional arguments supplied but the event has {indexed} indexed parameters")]
    TooManyArguments { given: usize, indexed: usize },

    #[error("Empty value set for parameter '{param}'")]
    EmptyValueSet { param: String },

    #[error("Invalid value for parameter '{param}': {source}")]
    InvalidValue {
        param: String,
        #[source]
        source: CodecError,
    },

    #[error("Argument constraints require an event schema")]
    ArgsWithoutEvent,

    #[error("Filter has {count} topics (max {max})")]
    TooManyTopics { count: usize, max: usize },
}

/// The user-visible failure of a log query.
#[derive(Debug, Error)]
pub enum LogsError {
    /// Network, timeout or protocol failure after the retry policy gave up.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The query was rejected before any request was sent.
    #[error("Invalid log filter: {0}")]
    Validation(#[from] FilterError),

    /// The filter object could not be serialized.
    #[error("Failed to encode filter: {0}")]
    Encode(#[source] serde_json::Error),

    /// The node replied with something other than an array of logs.
    #[error("Malformed eth_getLogs response: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    /// The blocking task decoding a large batch panicked or was cancelled.
    #[error("Log decoding task failed: {0}")]
    DecodeTask(#[source] tokio::task::JoinError),
}

impl LogsError {
    /// Returns `true` if the query was rejected locally (no request sent).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns `true` if the last attempt timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(TransportError::Timeout { .. }))
    }
}
