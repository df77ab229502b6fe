//! # JSON-RPC Pipe Prelude
//!
//! This module provides convenient re-exports of the most commonly used types
//! from the pipe library.
//!
//! ```rust
//! use jsonrpc_pipe::prelude::*;
//! ```

// Entry point and configuration
pub use crate::config::PipeConfig;
pub use crate::pipe::{JsonRpcPipe, JsonRpcPipeBuilder, PipeResponse};

// Invoker side
pub use crate::context::CallContext;
pub use crate::invoker::{ActionInvoker, InvokeError};
pub use crate::registry::{MethodHandler, MethodRegistry};

// Core JSON-RPC types
pub use crate::error::{JsonRpcError, JsonRpcErrorCode, ServerErrorCode};
pub use crate::request::{JsonRpcRequest, RequestParams};
pub use crate::response::JsonRpcMessage;
pub use crate::types::RequestId;

// Standard error codes
pub use crate::error_codes::*;
