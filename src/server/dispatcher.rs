//! Message dispatch
//!
//! The single read loop plus the per-method request and notification
//! handlers. Inbound messages are processed strictly sequentially; the
//! only concurrency is the detached hover workers spawned from here.

use std::sync::Arc;

use lsp_types::{
    CodeActionProviderCapability, CompletionOptions, HoverProviderCapability, InitializeResult,
    OneOf, SaveOptions, ServerCapabilities, ServerInfo, SignatureHelpOptions,
    TextDocumentSyncCapability, TextDocumentSyncKind, TextDocumentSyncOptions,
    TextDocumentSyncSaveOptions,
};
use serde_json::{Value, json};
use tokio::io::AsyncBufRead;
use tracing::{debug, info};

use crate::config::{ServerConfig, ServerMode};
use crate::message_log::{Direction, MessageLog};
use crate::protocol::{self, Message, MessageWriter, Notification, ProtocolError, Request, RequestId};
use crate::server::hover;
use crate::server::outbound::Outbound;
use crate::server::progress;
use crate::server::state::ServerState;

/// Exit status used to simulate a server crash during startup; distinct
/// from the generic fault status 1.
pub const CRASH_EXIT_CODE: i32 = 2;

/// Definition target used when the request names no document.
const FALLBACK_DEFINITION_URI: &str = "file:///tmp/mock.rs";

/// The mock server: read loop plus handlers over shared state.
pub struct Server {
    config: ServerConfig,
    state: Arc<ServerState>,
    outbound: Outbound,
}

impl Server {
    pub fn new(config: ServerConfig, writer: MessageWriter, log: Arc<MessageLog>) -> Self {
        let state = Arc::new(ServerState::new(config.mode));
        Self {
            config,
            state,
            outbound: Outbound::new(writer, log),
        }
    }

    /// Read and dispatch messages until `exit` is observed or the input
    /// closes.
    ///
    /// The exit flag is checked after each message, so input buffered
    /// behind an `exit` notification is never processed. In-flight hover
    /// workers are not awaited.
    pub async fn run<R>(&self, reader: &mut R) -> Result<(), ProtocolError>
    where
        R: AsyncBufRead + Unpin,
    {
        while !self.state.exit_requested() {
            let Some(message) = protocol::read_message(reader).await? else {
                break;
            };
            self.outbound
                .log()
                .record(Direction::In, &message.to_value(), None);

            match message {
                Message::Request(request) => self.handle_request(request).await?,
                Message::Notification(notification) => {
                    self.handle_notification(notification).await?
                }
                response @ Message::Response(_) => {
                    // Replies to server-initiated requests are recorded,
                    // never dispatched.
                    self.outbound
                        .log()
                        .record(Direction::InResponse, &response.to_value(), None);
                }
            }
        }
        Ok(())
    }

    async fn handle_request(&self, request: Request) -> Result<(), ProtocolError> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request).await,
            "shutdown" => self.respond(request.id, Value::Null).await,
            "textDocument/definition" => {
                let uri = request
                    .params
                    .as_ref()
                    .and_then(|p| p.get("textDocument"))
                    .and_then(|td| td.get("uri"))
                    .and_then(Value::as_str)
                    .unwrap_or(FALLBACK_DEFINITION_URI)
                    .to_string();
                self.respond(request.id, definition_result(&uri)).await
            }
            "textDocument/references" | "textDocument/documentSymbol" | "workspace/symbol" => {
                self.respond(request.id, json!([])).await
            }
            "textDocument/hover" => {
                hover::schedule_hover(
                    self.outbound.clone(),
                    Arc::clone(&self.state),
                    request.id,
                    self.config.effective_hover_delay(),
                )
                .await
            }
            other => {
                debug!(method = other, "acknowledging unrecognized request");
                self.respond(request.id, Value::Null).await
            }
        }
    }

    async fn handle_initialize(&self, request: Request) -> Result<(), ProtocolError> {
        match self.state.mode() {
            ServerMode::CrashInit => {
                self.outbound.log().record(
                    Direction::Meta,
                    &json!({ "mode": "crash-init" }),
                    Some("exiting on initialize"),
                );
                info!("crash-init mode: terminating without a response");
                std::process::exit(CRASH_EXIT_CODE);
            }
            ServerMode::IgnoreInit => {
                self.outbound.log().record(
                    Direction::Meta,
                    &json!({ "mode": "ignore-init" }),
                    Some("ignoring initialize"),
                );
                Ok(())
            }
            ServerMode::Normal | ServerMode::Timeout => {
                let result = serde_json::to_value(initialize_result())?;
                self.respond(request.id, result).await
            }
        }
    }

    async fn handle_notification(&self, notification: Notification) -> Result<(), ProtocolError> {
        match notification.method.as_str() {
            "$/cancelRequest" => {
                // Non-conforming payloads are ignored without error.
                let target = notification
                    .params
                    .as_ref()
                    .and_then(|p| p.get("id"))
                    .and_then(Value::as_i64);
                if let Some(id) = target {
                    self.state.mark_cancelled(id);
                    self.outbound.log().record(
                        Direction::Meta,
                        &json!({ "id": id }),
                        Some("received cancel request"),
                    );
                }
                Ok(())
            }
            "initialized" => {
                if self.config.startup_progress && self.state.claim_startup_progress() {
                    progress::emit_startup_sequence(&self.outbound, &self.state).await?;
                }
                Ok(())
            }
            "exit" => {
                info!("exit notification received; stopping the read loop");
                self.state.request_exit();
                Ok(())
            }
            other => {
                debug!(method = other, "ignoring notification");
                Ok(())
            }
        }
    }

    async fn respond(&self, id: RequestId, result: Value) -> Result<(), ProtocolError> {
        self.outbound.send(&Message::success(id, result)).await?;
        Ok(())
    }
}

/// Fixed capability set advertised to every client.
fn initialize_result() -> InitializeResult {
    InitializeResult {
        capabilities: ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                        include_text: Some(true),
                    })),
                    ..Default::default()
                },
            )),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            definition_provider: Some(OneOf::Left(true)),
            references_provider: Some(OneOf::Left(true)),
            document_symbol_provider: Some(OneOf::Left(true)),
            workspace_symbol_provider: Some(OneOf::Left(true)),
            completion_provider: Some(CompletionOptions::default()),
            signature_help_provider: Some(SignatureHelpOptions::default()),
            code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
            rename_provider: Some(OneOf::Left(true)),
            document_formatting_provider: Some(OneOf::Left(true)),
            ..Default::default()
        },
        server_info: Some(ServerInfo {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
        ..Default::default()
    }
}

/// Single fixed location; the uri echoes the request's document when the
/// client named one.
fn definition_result(uri: &str) -> Value {
    json!([{
        "uri": uri,
        "range": {
            "start": { "line": 0, "character": 0 },
            "end": { "line": 0, "character": 5 }
        }
    }])
}
