//! chainlogs-core: transport foundation for ChainLogs.
//!
//! # Overview
//!
//! The core crate defines everything between a log query and the physical
//! channel to the node:
//!
//! - [`RpcTransport`]: the central async trait every channel implements
//! - [`RpcRequest`] / [`JsonRpcRequest`] / [`JsonRpcResponse`]: wire types
//! - [`TransportError`]: classified error type (retryable vs fatal)
//! - [`policy`] module: [`RetryTransport`] with exponential backoff and timeouts
//! - [`FnTransport`]: wraps an arbitrary async request function

pub mod custom;
pub mod error;
pub mod policy;
pub mod request;
pub mod transport;

pub use custom::FnTransport;
pub use error::TransportError;
pub use policy::{RetryConfig, RetryPolicy, RetryTransport};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId, RpcRequest};
pub use transport::{call, RpcTransport};
