//! JSON-RPC 2.0 message model
//!
//! Inbound payloads are decoded into a sum type with exactly one of the
//! three JSON-RPC shapes: a request carries both `method` and `id`, a
//! notification carries `method` without `id`, and a response carries
//! `id` without `method`. Payloads matching none of the shapes are
//! rejected at decode time.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::protocol::error::ProtocolError;

/// JSON-RPC 2.0 version identifier
pub const JSONRPC_VERSION: &str = "2.0";

/// Request identifier: an integer or a string, compared for equality to
/// correlate cancellations and responses with their request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl RequestId {
    /// Integer value, if this is a numeric id.
    pub fn as_number(&self) -> Option<i64> {
        match self {
            RequestId::Number(n) => Some(*n),
            RequestId::String(_) => None,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{n}"),
            RequestId::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

/// A request: carries an id and expects a correlated response.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub id: RequestId,
    pub method: String,
    pub params: Option<Value>,
}

/// A notification: no response expected.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub method: String,
    pub params: Option<Value>,
}

/// A response to an earlier request.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub id: RequestId,
    pub result: Option<Value>,
    pub error: Option<Value>,
}

/// One decoded JSON-RPC message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Request(Request),
    Notification(Notification),
    Response(Response),
}

/// Loose wire shape used to classify inbound payloads.
#[derive(Deserialize)]
struct RawMessage {
    #[serde(default)]
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    #[serde(default)]
    id: Option<RequestId>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl Message {
    /// Classify a decoded JSON value into one of the three shapes.
    pub fn from_value(value: Value) -> Result<Self, ProtocolError> {
        let raw: RawMessage = serde_json::from_value(value)?;
        match (raw.method, raw.id) {
            (Some(method), Some(id)) => Ok(Message::Request(Request {
                id,
                method,
                params: raw.params,
            })),
            (Some(method), None) => Ok(Message::Notification(Notification {
                method,
                params: raw.params,
            })),
            (None, Some(id)) => Ok(Message::Response(Response {
                id,
                result: raw.result,
                error: raw.error,
            })),
            (None, None) => Err(ProtocolError::UnclassifiableMessage),
        }
    }

    /// Wire representation of this message.
    ///
    /// A response without an error always carries a `result` member, even
    /// when the result is null.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("jsonrpc".into(), json!(JSONRPC_VERSION));
        match self {
            Message::Request(request) => {
                map.insert("id".into(), json!(request.id));
                map.insert("method".into(), json!(request.method));
                if let Some(params) = &request.params {
                    map.insert("params".into(), params.clone());
                }
            }
            Message::Notification(notification) => {
                map.insert("method".into(), json!(notification.method));
                if let Some(params) = &notification.params {
                    map.insert("params".into(), params.clone());
                }
            }
            Message::Response(response) => {
                map.insert("id".into(), json!(response.id));
                match &response.error {
                    Some(error) => {
                        map.insert("error".into(), error.clone());
                    }
                    None => {
                        map.insert(
                            "result".into(),
                            response.result.clone().unwrap_or(Value::Null),
                        );
                    }
                }
            }
        }
        Value::Object(map)
    }

    /// Successful response carrying `result`.
    pub fn success(id: RequestId, result: Value) -> Self {
        Message::Response(Response {
            id,
            result: Some(result),
            error: None,
        })
    }

    /// Notification carrying `params`.
    pub fn notification(method: impl Into<String>, params: Value) -> Self {
        Message::Notification(Notification {
            method: method.into(),
            params: Some(params),
        })
    }

    /// Server-initiated request.
    pub fn server_request(id: RequestId, method: impl Into<String>, params: Value) -> Self {
        Message::Request(Request {
            id,
            method: method.into(),
            params: Some(params),
        })
    }
}
