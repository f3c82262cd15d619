//! Content-Length framing over byte streams
//!
//! Each frame is `Content-Length: <n>\r\n\r\n` followed by exactly `<n>`
//! bytes of UTF-8 JSON. The reader accepts arbitrary headers (keys
//! compared case-insensitively, the last `Content-Length` wins); the
//! writer holds one exclusive lock across the header+body pair so
//! concurrent senders never interleave a frame.

use std::io;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::trace;

use crate::protocol::error::ProtocolError;
use crate::protocol::message::Message;

/// Read one framed message.
///
/// Returns `Ok(None)` on clean end-of-stream: the peer closed before the
/// header block completed, or the body was truncated by closure. A header
/// block that ends without a `Content-Length` is a `ProtocolError`.
pub async fn read_message<R>(reader: &mut R) -> Result<Option<Message>, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<usize> = None;
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        if line == "\r\n" || line == "\n" {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().eq_ignore_ascii_case("content-length") {
                let value = value.trim();
                content_length = Some(
                    value
                        .parse()
                        .map_err(|_| ProtocolError::InvalidContentLength(value.to_string()))?,
                );
            }
        }
    }

    let length = content_length.ok_or(ProtocolError::MissingContentLength)?;

    let mut body = vec![0u8; length];
    match reader.read_exact(&mut body).await {
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err.into()),
    }

    trace!(bytes = length, "decoded frame body");
    let text = String::from_utf8(body)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    Message::from_value(value).map(Some)
}

/// Serializing writer for framed messages.
///
/// Cheap to clone; all clones share one write lock over the underlying
/// sink, keeping each header+body pair atomic with respect to concurrent
/// senders.
#[derive(Clone)]
pub struct MessageWriter {
    sink: Arc<Mutex<Box<dyn AsyncWrite + Send + Unpin>>>,
}

impl MessageWriter {
    /// Writer over an arbitrary sink.
    pub fn new(sink: Box<dyn AsyncWrite + Send + Unpin>) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    /// Writer over the process stdout.
    pub fn stdout() -> Self {
        Self::new(Box::new(tokio::io::stdout()))
    }

    /// Write one message as a single frame and flush.
    pub async fn write_message(&self, message: &Message) -> io::Result<()> {
        let body = serde_json::to_vec(&message.to_value()).map_err(io::Error::other)?;
        let header = format!("Content-Length: {}\r\n\r\n", body.len());

        let mut sink = self.sink.lock().await;
        sink.write_all(header.as_bytes()).await?;
        sink.write_all(&body).await?;
        sink.flush().await
    }
}
