//! Policy engine: reliability middleware layered over a transport.
//!
//! ```text
//! Request → [RetryTransport: timeout + backoff] → [Transport]
//! ```

pub mod retry;

pub use retry::{
    RetryConfig, RetryPolicy, RetryTransport, DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY_MS,
};
