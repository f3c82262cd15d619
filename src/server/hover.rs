//! Delayed hover responses
//!
//! Each hover request gets one detached timer task. The progress-begin
//! goes out before any delay so the client can observe that work has
//! started; the worker sleeps for the configured delay, consults the
//! cancellation set, and then either completes the request or withholds
//! the response permanently.

use std::sync::Arc;
use std::time::Duration;

use lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind};
use serde_json::json;
use tracing::debug;

use crate::message_log::Direction;
use crate::protocol::{Message, ProtocolError, RequestId};
use crate::server::outbound::Outbound;
use crate::server::progress;
use crate::server::state::ServerState;

/// Prefix for per-hover progress tokens; the token is derived from the
/// request id so each hover request gets its own sequence.
pub const HOVER_TOKEN_PREFIX: &str = "hover-";

/// Canned hover content.
const HOVER_MARKDOWN: &str = "Mock hover documentation from `mock-lsp-server`.";

/// Emit the progress-begin, then spawn the timer task.
///
/// The worker is fire-and-forget: the dispatch loop never awaits it, and
/// distinct hover requests complete in no guaranteed order. Cancellation
/// is advisory only; the sleep always fully elapses.
pub async fn schedule_hover(
    outbound: Outbound,
    state: Arc<ServerState>,
    id: RequestId,
    delay: Duration,
) -> Result<(), ProtocolError> {
    let token = format!("{HOVER_TOKEN_PREFIX}{id}");

    outbound
        .send(&progress::begin_notification(
            &token,
            "hover",
            "mock hover started",
            0,
        )?)
        .await?;

    let response = Message::success(id.clone(), serde_json::to_value(hover_payload())?);
    let cancelled_end = progress::end_notification(&token, "mock hover canceled")?;
    let completed_end = progress::end_notification(&token, "mock hover completed")?;

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let cancelled = id.as_number().is_some_and(|n| state.is_cancelled(n));
        if cancelled {
            debug!(%id, "withholding hover response after cancellation");
            outbound
                .log()
                .record(Direction::Meta, &json!({ "id": id }), Some("hover canceled"));
            outbound.send_detached(&cancelled_end).await;
            return;
        }

        outbound.send_detached(&response).await;
        outbound.send_detached(&completed_end).await;
    });

    Ok(())
}

fn hover_payload() -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: HOVER_MARKDOWN.to_string(),
        }),
        range: None,
    }
}
