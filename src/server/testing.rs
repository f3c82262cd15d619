//! Shared test fixtures
//!
//! A capture-sink writer whose output can be decoded after the fact,
//! framed-stream helpers, and canned client messages.

use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::io::{AsyncWrite, BufReader};

use crate::config::ServerConfig;
use crate::message_log::MessageLog;
use crate::protocol::{self, MessageWriter};
use crate::server::Server;

/// `AsyncWrite` sink appending to a shared buffer.
pub struct CaptureSink(Arc<Mutex<Vec<u8>>>);

impl AsyncWrite for CaptureSink {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Writer whose output can be inspected after the fact.
pub fn capture_writer() -> (MessageWriter, Arc<Mutex<Vec<u8>>>) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer = MessageWriter::new(Box::new(CaptureSink(buffer.clone())));
    (writer, buffer)
}

/// Frame a JSON body the way a client would.
pub fn frame(body: &str) -> Vec<u8> {
    format!("Content-Length: {}\r\n\r\n{}", body.len(), body).into_bytes()
}

/// Concatenate bodies into one framed input stream.
pub fn script(bodies: &[String]) -> Vec<u8> {
    bodies.iter().flat_map(|body| frame(body)).collect()
}

/// Decode every framed message in `bytes` into raw JSON values.
pub async fn decode_all(bytes: &[u8]) -> Vec<Value> {
    let mut reader = BufReader::new(bytes);
    let mut messages = Vec::new();
    while let Ok(Some(message)) = protocol::read_message(&mut reader).await {
        messages.push(message.to_value());
    }
    messages
}

/// Decode everything the writer has emitted so far.
pub async fn captured_messages(buffer: &Arc<Mutex<Vec<u8>>>) -> Vec<Value> {
    let bytes = buffer
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    decode_all(&bytes).await
}

/// Run a server over the given framed input and return its decoded
/// output. Detached hover workers may still be pending when this
/// returns; use [`run_script_settled`] when their output matters.
pub async fn run_script(config: ServerConfig, input: &[u8]) -> Vec<Value> {
    run_script_settled(config, input, Duration::ZERO).await
}

/// Like [`run_script`], but waits `settle` after the read loop finishes
/// so detached workers can complete.
pub async fn run_script_settled(
    config: ServerConfig,
    input: &[u8],
    settle: Duration,
) -> Vec<Value> {
    let (writer, buffer) = capture_writer();
    let server = Server::new(config, writer, Arc::new(MessageLog::disabled()));
    let mut reader = BufReader::new(input);
    server.run(&mut reader).await.expect("server run failed");
    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }
    captured_messages(&buffer).await
}

pub fn initialize_request(id: i64) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "initialize",
        "params": {
            "processId": null,
            "capabilities": {},
            "rootUri": null
        }
    })
    .to_string()
}

pub fn shutdown_request(id: i64) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "shutdown",
        "params": null
    })
    .to_string()
}

pub fn hover_request(id: i64) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "textDocument/hover",
        "params": {
            "textDocument": { "uri": "file:///tmp/example.rs" },
            "position": { "line": 0, "character": 1 }
        }
    })
    .to_string()
}

pub fn cancel_notification(id: i64) -> String {
    json!({
        "jsonrpc": "2.0",
        "method": "$/cancelRequest",
        "params": { "id": id }
    })
    .to_string()
}

pub fn initialized_notification() -> String {
    json!({
        "jsonrpc": "2.0",
        "method": "initialized",
        "params": {}
    })
    .to_string()
}

pub fn exit_notification() -> String {
    json!({
        "jsonrpc": "2.0",
        "method": "exit"
    })
    .to_string()
}
