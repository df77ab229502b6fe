use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::JsonRpcError;
use crate::types::{JsonRpcVersion, RequestId};

/// A successful JSON-RPC response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub result: Value,
    pub id: RequestId,
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            result,
            id,
        }
    }
}

impl<T> From<(RequestId, T)> for JsonRpcResponse
where
    T: Into<Value>,
{
    fn from((id, result): (RequestId, T)) -> Self {
        Self::success(id, result.into())
    }
}

/// Union type that represents either a successful response or an error response
/// This ensures JSON-RPC 2.0 compliance by keeping success and error responses separate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JsonRpcMessage {
    /// Error response with error field
    Error(JsonRpcError),
    /// Successful response with result field
    Response(JsonRpcResponse),
}

impl JsonRpcMessage {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self::Response(JsonRpcResponse::success(id, result))
    }

    pub fn error(error: JsonRpcError) -> Self {
        Self::Error(error)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, JsonRpcMessage::Error(_))
    }

    /// Get the request ID from either response or error
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            JsonRpcMessage::Response(resp) => Some(&resp.id),
            JsonRpcMessage::Error(err) => err.id.as_ref(),
        }
    }

    pub fn result(&self) -> Option<&Value> {
        match self {
            JsonRpcMessage::Response(resp) => Some(&resp.result),
            JsonRpcMessage::Error(_) => None,
        }
    }

    pub fn error_code(&self) -> Option<i64> {
        match self {
            JsonRpcMessage::Error(err) => Some(err.error.code),
            JsonRpcMessage::Response(_) => None,
        }
    }
}

/// Decoded through [`Value`] and told apart by the `error` member, so numbers
/// keep their exact digits.
impl<'de> Deserialize<'de> for JsonRpcMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let message = if value.get("error").is_some() {
            serde_json::from_value(value).map(JsonRpcMessage::Error)
        } else {
            serde_json::from_value(value).map(JsonRpcMessage::Response)
        };
        message.map_err(serde::de::Error::custom)
    }
}

impl From<JsonRpcResponse> for JsonRpcMessage {
    fn from(response: JsonRpcResponse) -> Self {
        Self::Response(response)
    }
}

impl From<JsonRpcError> for JsonRpcMessage {
    fn from(error: JsonRpcError) -> Self {
        Self::Error(error)
    }
}

/// What a single call turns into before serialization
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing goes on the wire
    Notification,
    Response(JsonRpcMessage),
}

impl Outcome {
    pub fn into_message(self) -> Option<JsonRpcMessage> {
        match self {
            Outcome::Notification => None,
            Outcome::Response(message) => Some(message),
        }
    }
}

impl From<JsonRpcError> for Outcome {
    fn from(error: JsonRpcError) -> Self {
        Outcome::Response(error.into())
    }
}

/// Final shape of a response body.
///
/// A batch that leaves a single response is sent as a bare object, never as a
/// one-element array.
#[derive(Debug, Clone, PartialEq)]
pub enum WireResult {
    Empty,
    Single(JsonRpcMessage),
    Batch(Vec<JsonRpcMessage>),
}

impl WireResult {
    /// Collapse outcomes, dropping notifications and keeping input order
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        let mut messages: Vec<JsonRpcMessage> =
            outcomes.into_iter().filter_map(Outcome::into_message).collect();

        match messages.len() {
            0 => WireResult::Empty,
            1 => WireResult::Single(messages.remove(0)),
            _ => WireResult::Batch(messages),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, WireResult::Empty)
    }

    pub fn messages(&self) -> &[JsonRpcMessage] {
        match self {
            WireResult::Empty => &[],
            WireResult::Single(message) => std::slice::from_ref(message),
            WireResult::Batch(messages) => messages,
        }
    }

    /// Serialize to the response body; `Empty` is the zero-length string
    pub fn to_body(&self) -> Result<String, serde_json::Error> {
        match self {
            WireResult::Empty => Ok(String::new()),
            WireResult::Single(message) => serde_json::to_string(message),
            WireResult::Batch(messages) => serde_json::to_string(messages),
        }
    }
}
