//! `FnTransport`: adapts an arbitrary async request function into a transport.
//!
//! Useful for in-process providers and for mocking a node in tests:
//!
//! ```ignore
//! let transport = FnTransport::new(|req: RpcRequest| async move {
//!     match req.method.as_str() {
//!         "eth_getLogs" => Ok(serde_json::json!([])),
//!         _ => Err(TransportError::Other("unsupported".into())),
//!     }
//! });
//! ```

use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use crate::error::TransportError;
use crate::request::RpcRequest;
use crate::transport::RpcTransport;

type RequestFn =
    dyn Fn(RpcRequest) -> BoxFuture<'static, Result<Value, TransportError>> + Send + Sync;

/// A transport backed by a caller-supplied request function.
pub struct FnTransport {
    name: String,
    request: Box<RequestFn>,
}

impl FnTransport {
    pub fn new<F, Fut>(request: F) -> Self
    where
        F: Fn(RpcRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, TransportError>> + Send + 'static,
    {
        Self {
            name: "custom".into(),
            request: Box::new(move |req| request(req).boxed()),
        }
    }

    /// Override the identifier reported by [`RpcTransport::name`].
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl std::fmt::Debug for FnTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTransport").field("name", &self.name).finish()
    }
}

#[async_trait]
impl RpcTransport for FnTransport {
    async fn request(&self, req: RpcRequest) -> Result<Value, TransportError> {
        (self.request)(req).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn forwards_method_and_params() {
        let transport = FnTransport::new(|req: RpcRequest| async move {
            Ok(json!({"method": req.method, "params": req.params}))
        })
        .with_name("mock");

        let out = transport
            .request(RpcRequest::new("eth_getLogs", vec![json!({"fromBlock": "0x1"})]))
            .await
            .unwrap();
        assert_eq!(out["method"], "eth_getLogs");
        assert_eq!(out["params"][0]["fromBlock"], "0x1");
        assert_eq!(transport.name(), "mock");
    }

    #[tokio::test]
    async fn propagates_errors() {
        let transport =
            FnTransport::new(|_req| async { Err(TransportError::Network("refused".into())) });
        let err = transport.request(RpcRequest::new("eth_chainId", vec![])).await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }
}
