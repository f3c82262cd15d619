//! JSON-RPC protocol engine
//!
//! The message model (request/notification/response sum type) and the
//! Content-Length framing used to exchange messages over byte streams.

pub mod error;
pub mod framing;
pub mod message;

pub use error::ProtocolError;
pub use framing::{MessageWriter, read_message};
pub use message::{Message, Notification, Request, RequestId, Response};
