use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::types::{JsonRpcVersion, RequestId};

/// Application server error number `n`, reported on the wire as `-32000 - n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ServerErrorCode(u8);

impl ServerErrorCode {
    /// Catch-all code for failures the invoker did not classify
    pub const GENERIC: ServerErrorCode = ServerErrorCode(0);
    pub const MAX: u8 = 99;

    pub fn new(n: u8) -> Result<Self, PipeError> {
        if n > Self::MAX {
            return Err(PipeError::ServerCodeOutOfRange(n));
        }
        Ok(Self(n))
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// The code as it appears in the `error.code` member
    pub fn wire_code(&self) -> i64 {
        crate::error_codes::SERVER_ERROR_END - i64::from(self.0)
    }
}

impl TryFrom<u8> for ServerErrorCode {
    type Error = PipeError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerError(ServerErrorCode), // -32099 to -32000
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i64 {
        use crate::error_codes::*;
        match self {
            JsonRpcErrorCode::ParseError => PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => METHOD_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => INVALID_PARAMS,
            JsonRpcErrorCode::InternalError => INTERNAL_ERROR,
            JsonRpcErrorCode::ServerError(code) => code.wire_code(),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid Request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
            JsonRpcErrorCode::InternalError => "Internal error",
            JsonRpcErrorCode::ServerError(_) => "Server error",
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// JSON-RPC Error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorObject {
    /// Build the catalog entry for `code`. Messages are fixed so clients can
    /// match on them.
    pub fn new(code: JsonRpcErrorCode) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_string(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Option<Value>) -> Self {
        self.data = data;
        self
    }

    pub fn parse_error() -> Self {
        Self::new(JsonRpcErrorCode::ParseError)
    }

    pub fn invalid_request() -> Self {
        Self::new(JsonRpcErrorCode::InvalidRequest)
    }

    pub fn method_not_found() -> Self {
        Self::new(JsonRpcErrorCode::MethodNotFound)
    }

    pub fn invalid_params() -> Self {
        Self::new(JsonRpcErrorCode::InvalidParams)
    }

    pub fn internal_error() -> Self {
        Self::new(JsonRpcErrorCode::InternalError)
    }

    pub fn server_error(code: ServerErrorCode) -> Self {
        Self::new(JsonRpcErrorCode::ServerError(code))
    }
}

/// JSON-RPC Error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    #[serde(rename = "jsonrpc")]
    pub version: JsonRpcVersion,
    pub error: JsonRpcErrorObject,
    pub id: Option<RequestId>,
}

impl JsonRpcError {
    pub fn new(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            error,
            id,
        }
    }

    /// Parse failures never have a recoverable id
    pub fn parse_error() -> Self {
        Self::new(None, JsonRpcErrorObject::parse_error())
    }

    pub fn invalid_request(id: Option<RequestId>) -> Self {
        Self::new(id, JsonRpcErrorObject::invalid_request())
    }

    pub fn method_not_found(id: RequestId) -> Self {
        Self::new(Some(id), JsonRpcErrorObject::method_not_found())
    }

    pub fn invalid_params(id: Option<RequestId>) -> Self {
        Self::new(id, JsonRpcErrorObject::invalid_params())
    }

    pub fn internal_error(id: Option<RequestId>) -> Self {
        Self::new(id, JsonRpcErrorObject::internal_error())
    }

    pub fn server_error(id: RequestId, code: ServerErrorCode) -> Self {
        Self::new(Some(id), JsonRpcErrorObject::server_error(code))
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JSON-RPC Error {}: {}",
            self.error.code, self.error.message
        )
    }
}

impl std::error::Error for JsonRpcError {}

/// Errors raised while configuring the pipe (never shown to JSON-RPC clients)
#[derive(Debug, Error)]
pub enum PipeError {
    #[error("server error number {0} is outside 0..=99")]
    ServerCodeOutOfRange(u8),

    #[error("no action invoker configured")]
    MissingInvoker,
}
