//! The `RpcTransport` trait: the core abstraction over a physical channel.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TransportError;
use crate::request::RpcRequest;

/// The central async trait every transport must implement.
///
/// A transport resolves one [`RpcRequest`] to the node's `result` value. A
/// JSON-RPC `error` member is reported as [`TransportError::Rpc`].
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn RpcTransport>`.
///
/// # Cancellation
/// Dropping the returned future aborts the request. Wrappers such as
/// [`RetryTransport`](crate::policy::RetryTransport) issue no further
/// attempts once dropped.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Send a single request and return the node's result value.
    async fn request(&self, req: RpcRequest) -> Result<Value, TransportError>;

    /// A short identifier for logs (URL or transport kind).
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: RpcTransport + ?Sized> RpcTransport for Arc<T> {
    async fn request(&self, req: RpcRequest) -> Result<Value, TransportError> {
        (**self).request(req).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<T: RpcTransport + ?Sized> RpcTransport for Box<T> {
    async fn request(&self, req: RpcRequest) -> Result<Value, TransportError> {
        (**self).request(req).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Convenience: call a method and deserialize the result.
pub async fn call<T, R>(transport: &R, method: &str, params: Vec<Value>) -> Result<T, TransportError>
where
    T: DeserializeOwned,
    R: RpcTransport + ?Sized,
{
    let result = transport.request(RpcRequest::new(method, params)).await?;
    serde_json::from_value(result).map_err(TransportError::Deserialization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom::FnTransport;
    use serde_json::json;

    #[tokio::test]
    async fn call_deserializes_result() {
        let transport = FnTransport::new(|_req| async { Ok(json!("0x10")) });
        let block: String = call(&transport, "eth_blockNumber", vec![]).await.unwrap();
        assert_eq!(block, "0x10");
    }

    #[tokio::test]
    async fn call_reports_shape_mismatch() {
        let transport = FnTransport::new(|_req| async { Ok(json!({"not": "a number"})) });
        let err = call::<u64, _>(&transport, "eth_chainId", vec![]).await.unwrap_err();
        assert!(matches!(err, TransportError::Deserialization(_)));
    }

    #[tokio::test]
    async fn arc_dyn_forwards() {
        let transport: Arc<dyn RpcTransport> =
            Arc::new(FnTransport::new(|req: RpcRequest| async move { Ok(json!(req.method)) }));
        let out = transport.request(RpcRequest::new("net_version", vec![])).await.unwrap();
        assert_eq!(out, json!("net_version"));
        assert_eq!(transport.name(), "custom");
    }
}
