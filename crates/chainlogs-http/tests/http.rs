//! End-to-end tests against a one-shot local HTTP server.

use chainlogs_core::{RpcRequest, RpcTransport, TransportError};
use chainlogs_http::HttpTransport;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Serve exactly one request with the given status and body, returning the
/// JSON body the client posted.
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        request
    });

    (url, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Value {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending a full request");
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(split) = text.find("\r\n\r\n") {
            let head = text[..split].to_ascii_lowercase();
            let len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .map(|v| v.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            let body_start = split + 4;
            if buf.len() >= body_start + len {
                return serde_json::from_slice(&buf[body_start..body_start + len]).unwrap();
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn returns_result_and_posts_envelope() {
    let (url, server) =
        serve_once("200 OK", json!({"jsonrpc": "2.0", "id": 1, "result": []}).to_string()).await;
    let transport = HttpTransport::default_for(url).unwrap();

    let out = transport
        .request(RpcRequest::new("eth_getLogs", vec![json!({"fromBlock": "0x1"})]))
        .await
        .unwrap();
    assert_eq!(out, json!([]));

    let posted = server.await.unwrap();
    assert_eq!(posted["jsonrpc"], "2.0");
    assert_eq!(posted["method"], "eth_getLogs");
    assert_eq!(posted["params"][0]["fromBlock"], "0x1");
    assert_eq!(posted["id"], 1);
}

#[tokio::test]
async fn node_error_is_protocol_error() {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": {"code": -32602, "message": "invalid block range"}
    });
    let (url, server) = serve_once("200 OK", body.to_string()).await;
    let transport = HttpTransport::default_for(url).unwrap();

    let err = transport
        .request(RpcRequest::new("eth_getLogs", vec![json!({})]))
        .await
        .unwrap_err();
    assert!(err.is_protocol_error());
    assert_eq!(err.code(), Some(-32602));
    assert!(!err.is_retryable());
    server.await.unwrap();
}

#[tokio::test]
async fn rate_limit_status_is_retryable() {
    let (url, server) = serve_once("429 Too Many Requests", "{}".to_string()).await;
    let transport = HttpTransport::default_for(url).unwrap();

    let err = transport
        .request(RpcRequest::new("eth_getLogs", vec![json!({})]))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Http { status: 429, .. }));
    assert!(err.is_retryable());
    server.await.unwrap();
}
