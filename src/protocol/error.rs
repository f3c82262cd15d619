use thiserror::Error;

/// Errors raised while decoding framed messages from the peer.
///
/// Any of these means the byte stream is no longer trustworthy, so they
/// are fatal to the read loop rather than per-message recoverable.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("missing Content-Length header")]
    MissingContentLength,

    #[error("invalid Content-Length value: {0}")]
    InvalidContentLength(String),

    #[error("message body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("malformed JSON-RPC payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message is neither request, notification, nor response")]
    UnclassifiableMessage,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
