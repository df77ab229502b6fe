//! Turns raw request text into classified batch entries.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::JsonRpcError;
use crate::request::{JsonRpcRequest, RequestParams};
use crate::types::{JsonRpcVersion, RequestId};

/// One element of an incoming payload after validation
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// Well-formed call, ready for dispatch
    Call(JsonRpcRequest),
    /// Rejected before dispatch; the error is sent as-is
    Invalid(JsonRpcError),
    /// Malformed notification, dropped without a response
    Silent,
}

#[derive(Debug, Clone, Default)]
pub struct RequestValidator {
    strict_version: bool,
}

impl RequestValidator {
    pub fn new(strict_version: bool) -> Self {
        Self { strict_version }
    }

    /// Decode `raw` and classify every element it contains.
    ///
    /// Never returns an empty list: undecodable text yields a single parse
    /// error, and an empty batch or scalar yields a single invalid request.
    /// Text nested deeper than serde_json's recursion limit (128 levels) is
    /// undecodable.
    pub fn parse(&self, raw: &str) -> Vec<Entry> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(err) => {
                debug!("JSON-RPC payload is not valid JSON: {}", err);
                return vec![Entry::Invalid(JsonRpcError::parse_error())];
            }
        };

        match value {
            Value::Object(object) => vec![self.classify_object(object)],
            Value::Array(elements) if !elements.is_empty() => {
                debug!("Received JSON-RPC batch of {} elements", elements.len());
                elements.into_iter().map(|e| self.classify(e)).collect()
            }
            other => {
                debug!("JSON-RPC payload is neither an object nor a non-empty array: {}", other);
                vec![Entry::Invalid(JsonRpcError::invalid_request(None))]
            }
        }
    }

    /// Classify a single batch element
    pub fn classify(&self, element: Value) -> Entry {
        match element {
            Value::Object(object) => self.classify_object(object),
            _ => Entry::Invalid(JsonRpcError::invalid_request(None)),
        }
    }

    fn classify_object(&self, mut object: Map<String, Value>) -> Entry {
        if object.is_empty() {
            return Entry::Invalid(JsonRpcError::invalid_request(None));
        }

        let id = RequestId::from_value(object.get("id"));

        if !JsonRpcVersion::accepts(object.get("jsonrpc"), self.strict_version) {
            return reject(id, JsonRpcError::invalid_request);
        }

        let method = match object.remove("method") {
            Some(Value::String(method)) => method,
            _ => return reject(id, JsonRpcError::invalid_request),
        };

        let params = match object.remove("params") {
            None => None,
            Some(raw) => match RequestParams::from_value(raw) {
                Some(params) => Some(params),
                None => return reject(id, JsonRpcError::invalid_params),
            },
        };

        Entry::Call(JsonRpcRequest {
            version: JsonRpcVersion::V2_0.to_string(),
            method,
            params,
            id,
        })
    }
}

/// Requests with an id get the error echoed back; notifications go silent.
fn reject(id: Option<RequestId>, error: fn(Option<RequestId>) -> JsonRpcError) -> Entry {
    match id {
        Some(id) => {
            debug!("Rejecting malformed JSON-RPC request id={}", id);
            Entry::Invalid(error(Some(id)))
        }
        None => {
            debug!("Dropping malformed JSON-RPC notification");
            Entry::Silent
        }
    }
}
