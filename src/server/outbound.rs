//! Outbound channel
//!
//! Every message this server emits goes through the framed writer and
//! into the message log, in that order.

use std::io;
use std::sync::Arc;

use tracing::debug;

use crate::message_log::{Direction, MessageLog};
use crate::protocol::{Message, MessageWriter};

/// Framed writer paired with the message log. Cheap to clone into
/// spawned workers.
#[derive(Clone)]
pub struct Outbound {
    writer: MessageWriter,
    log: Arc<MessageLog>,
}

impl Outbound {
    pub fn new(writer: MessageWriter, log: Arc<MessageLog>) -> Self {
        Self { writer, log }
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    /// Send one message, recording it in the log.
    pub async fn send(&self, message: &Message) -> io::Result<()> {
        self.writer.write_message(message).await?;
        self.log.record(Direction::Out, &message.to_value(), None);
        Ok(())
    }

    /// Send from a detached worker. Delivery is best-effort: a worker may
    /// outlive the stream it writes to, so failures are swallowed.
    pub async fn send_detached(&self, message: &Message) {
        if let Err(err) = self.send(message).await {
            debug!(error = %err, "dropped late write on closed stream");
        }
    }
}
