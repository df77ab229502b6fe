//! # JSON-RPC 2.0 Request Pipe
//!
//! Takes raw request text, validates it against the JSON-RPC 2.0
//! specification, dispatches each call to an application-defined
//! [`ActionInvoker`], and serializes results and errors back into
//! protocol-compliant JSON. Transport agnostic: the front end hands over the text
//! (or a URL-encoded query string) and writes back the body and content type
//! of the returned [`PipeResponse`].
//!
//! ## Features
//! - Batch requests, fanned out concurrently with input order preserved
//! - Notification silence: calls without an `id` never get a response
//! - Fixed error taxonomy (`-32700`, `-32600`..`-32603`, `-32000`..`-32099`)
//! - Name-based [`MethodRegistry`] with typed argument access via [`CallContext`]
//!
//! ```rust
//! use jsonrpc_pipe::prelude::*;
//! use serde_json::json;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let registry = MethodRegistry::new().with_fn("subtract", |ctx: CallContext| async move {
//!     let a: i64 = ctx.arg(0)?;
//!     let b: i64 = ctx.arg(1)?;
//!     Ok::<_, InvokeError>(json!(a - b))
//! });
//!
//! let pipe = JsonRpcPipe::new(registry);
//! let response = pipe
//!     .process(r#"{"jsonrpc":"2.0","method":"subtract","params":[42,23],"id":1}"#)
//!     .await;
//! assert_eq!(response.as_str(), r#"{"jsonrpc":"2.0","result":19,"id":1}"#);
//! # });
//! ```

pub mod batch;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod invoker;
pub mod pipe;
pub mod query;
pub mod registry;
pub mod request;
pub mod response;
pub mod types;
pub mod validate;

pub mod prelude;

#[cfg(test)]
mod tests;

// Re-export main types
pub use batch::BatchCoordinator;
pub use config::{PipeConfig, ResultConverter};
pub use context::CallContext;
pub use dispatch::SingleCallDispatcher;
pub use error::{JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject, PipeError, ServerErrorCode};
pub use invoker::{ActionInvoker, InvokeError, ToJsonRpcError};
pub use pipe::{JsonRpcPipe, JsonRpcPipeBuilder, PipeResponse};
pub use registry::{FunctionHandler, MethodHandler, MethodRegistry};
pub use request::{JsonRpcRequest, RequestParams};
pub use response::{JsonRpcMessage, JsonRpcResponse, Outcome, WireResult};
pub use types::{JsonRpcVersion, RequestId};
pub use validate::{Entry, RequestValidator};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Media type of every response body
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Server error range: -32099 to -32000
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;
}
