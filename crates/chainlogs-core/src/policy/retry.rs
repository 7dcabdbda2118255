//! Bounded retry with exponential backoff and a per-attempt deadline.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::request::RpcRequest;
use crate::transport::RpcTransport;

/// Default number of retries after the first attempt.
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// Default base delay before the first retry.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 150;

/// Configuration for the retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not counting the first try).
    pub retry_count: u32,
    /// Delay before the first retry; doubles on every subsequent retry.
    pub retry_delay: Duration,
    /// Deadline applied to each attempt. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            timeout: None,
        }
    }
}

impl RetryConfig {
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Stateless retry policy: computes the next delay given the attempt number.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the delay before the `attempt`-th retry (1-based):
    /// `retry_delay * 2^(attempt - 1)`.
    /// Returns `None` if `attempt` exceeds `retry_count`.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.config.retry_count {
            return None;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        Some(self.config.retry_delay.saturating_mul(factor))
    }

    /// Total attempts a request may make, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.config.retry_count.saturating_add(1)
    }
}

/// Wraps any transport with [`RetryPolicy`] and the per-attempt timeout.
///
/// Retry counters and timers live on the stack of each `request` call, so
/// one `RetryTransport` can serve concurrent requests without locking.
#[derive(Debug, Clone)]
pub struct RetryTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: RpcTransport> RetryTransport<T> {
    pub fn new(inner: T, config: RetryConfig) -> Self {
        Self {
            inner,
            policy: RetryPolicy::new(config),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn config(&self) -> &RetryConfig {
        &self.policy.config
    }

    async fn attempt(&self, req: RpcRequest) -> Result<Value, TransportError> {
        match self.policy.config.timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.request(req))
                .await
                .unwrap_or_else(|_| {
                    Err(TransportError::Timeout {
                        ms: limit.as_millis() as u64,
                    })
                }),
            None => self.inner.request(req).await,
        }
    }
}

#[async_trait]
impl<T: RpcTransport> RpcTransport for RetryTransport<T> {
    async fn request(&self, req: RpcRequest) -> Result<Value, TransportError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.attempt(req.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => match self.policy.next_delay(attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            method = %req.method,
                            transport = %self.inner.name(),
                            "retrying request"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        tracing::error!(
                            attempt,
                            error = %e,
                            method = %req.method,
                            transport = %self.inner.name(),
                            "max retries exceeded"
                        );
                        return Err(e);
                    }
                },
                // Non-retryable (e.g. RPC execution error)
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
