//! Work-done progress sequences
//!
//! `$/progress` payload builders plus the once-only startup sequence.
//! Server-chosen tokens are registered with the peer via
//! `window/workDoneProgress/create` before first use; per-hover tokens
//! are caller-derived and need no registration.

use lsp_types::{
    NumberOrString, ProgressParams, ProgressParamsValue, WorkDoneProgress, WorkDoneProgressBegin,
    WorkDoneProgressCreateParams, WorkDoneProgressEnd,
};

use crate::protocol::{Message, ProtocolError};
use crate::server::outbound::Outbound;
use crate::server::state::ServerState;

/// Token for the startup sequence.
pub const STARTUP_PROGRESS_TOKEN: &str = "startup-index";

/// `$/progress` begin notification.
pub fn begin_notification(
    token: &str,
    title: &str,
    message: &str,
    percentage: u32,
) -> Result<Message, ProtocolError> {
    let params = ProgressParams {
        token: NumberOrString::String(token.to_string()),
        value: ProgressParamsValue::WorkDone(WorkDoneProgress::Begin(WorkDoneProgressBegin {
            title: title.to_string(),
            cancellable: None,
            message: Some(message.to_string()),
            percentage: Some(percentage),
        })),
    };
    Ok(Message::notification(
        "$/progress",
        serde_json::to_value(params)?,
    ))
}

/// `$/progress` end notification.
pub fn end_notification(token: &str, message: &str) -> Result<Message, ProtocolError> {
    let params = ProgressParams {
        token: NumberOrString::String(token.to_string()),
        value: ProgressParamsValue::WorkDone(WorkDoneProgress::End(WorkDoneProgressEnd {
            message: Some(message.to_string()),
        })),
    };
    Ok(Message::notification(
        "$/progress",
        serde_json::to_value(params)?,
    ))
}

/// Emit the startup sequence: register the token, then begin and end
/// back-to-back so clients can assert the full sequence
/// deterministically.
pub async fn emit_startup_sequence(
    outbound: &Outbound,
    state: &ServerState,
) -> Result<(), ProtocolError> {
    let create = Message::server_request(
        state.next_server_request_id(),
        "window/workDoneProgress/create",
        serde_json::to_value(WorkDoneProgressCreateParams {
            token: NumberOrString::String(STARTUP_PROGRESS_TOKEN.to_string()),
        })?,
    );
    outbound.send(&create).await?;

    outbound
        .send(&begin_notification(
            STARTUP_PROGRESS_TOKEN,
            "startup",
            "mock indexing started",
            5,
        )?)
        .await?;
    outbound
        .send(&end_notification(
            STARTUP_PROGRESS_TOKEN,
            "mock indexing complete",
        )?)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerMode;
    use crate::message_log::MessageLog;
    use crate::server::state::SERVER_REQUEST_ID_BASE;
    use crate::server::testing::{capture_writer, captured_messages};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn begin_notification_shape() {
        let message = begin_notification("hover-2", "hover", "mock hover started", 0).unwrap();
        let value = message.to_value();
        assert_eq!(value["method"], "$/progress");
        assert_eq!(value["params"]["token"], "hover-2");
        assert_eq!(value["params"]["value"]["kind"], "begin");
        assert_eq!(value["params"]["value"]["title"], "hover");
        assert_eq!(value["params"]["value"]["percentage"], 0);
        assert!(value.get("id").is_none());
    }

    #[test]
    fn end_notification_shape() {
        let message = end_notification("hover-2", "mock hover completed").unwrap();
        let value = message.to_value();
        assert_eq!(value["params"]["value"]["kind"], "end");
        assert_eq!(value["params"]["value"]["message"], "mock hover completed");
    }

    #[tokio::test]
    async fn startup_sequence_is_create_then_begin_then_end() {
        let (writer, buffer) = capture_writer();
        let outbound = Outbound::new(writer, Arc::new(MessageLog::disabled()));
        let state = ServerState::new(ServerMode::Normal);

        emit_startup_sequence(&outbound, &state).await.unwrap();

        let messages = captured_messages(&buffer).await;
        assert_eq!(messages.len(), 3);

        assert_eq!(messages[0]["method"], "window/workDoneProgress/create");
        assert_eq!(messages[0]["id"], json!(SERVER_REQUEST_ID_BASE));
        assert_eq!(messages[0]["params"]["token"], STARTUP_PROGRESS_TOKEN);

        assert_eq!(messages[1]["method"], "$/progress");
        assert_eq!(messages[1]["params"]["value"]["kind"], "begin");
        assert_eq!(messages[1]["params"]["value"]["title"], "startup");
        assert_eq!(messages[1]["params"]["value"]["percentage"], 5);

        assert_eq!(messages[2]["params"]["value"]["kind"], "end");
        assert_eq!(
            messages[2]["params"]["value"]["message"],
            "mock indexing complete"
        );
    }
}
