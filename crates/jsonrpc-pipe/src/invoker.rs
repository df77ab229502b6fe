use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::context::CallContext;
use crate::error::{JsonRpcErrorObject, ServerErrorCode};

/// Failure signals an invoker can raise.
///
/// The dispatcher maps each variant onto the standard error taxonomy; the
/// message text stays server-side and only shows up in logs.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("required argument '{0}' is missing")]
    MissingArgument(String),

    #[error("argument '{name}' can't be converted to {expected}")]
    ArgumentType { name: String, expected: String },

    #[error("method '{0}' is not implemented")]
    UnknownMethod(String),

    #[error("application server error {}", .code.number())]
    Server {
        code: ServerErrorCode,
        data: Option<Value>,
    },

    #[error("internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(String),
}

impl InvokeError {
    /// Application error `n`; numbers outside `0..=99` fall back to the
    /// generic server error.
    pub fn server(n: u8) -> Self {
        let code = ServerErrorCode::new(n).unwrap_or_else(|err| {
            tracing::warn!("{}, reporting generic server error", err);
            ServerErrorCode::GENERIC
        });
        InvokeError::Server { code, data: None }
    }

    pub fn server_with_data(n: u8, data: Value) -> Self {
        match Self::server(n) {
            InvokeError::Server { code, .. } => InvokeError::Server {
                code,
                data: Some(data),
            },
            other => other,
        }
    }

    pub fn other(err: impl std::fmt::Display) -> Self {
        InvokeError::Other(err.to_string())
    }

    /// Whether the caller got the arguments wrong
    pub fn is_params_error(&self) -> bool {
        matches!(
            self,
            InvokeError::MissingArgument(_) | InvokeError::ArgumentType { .. }
        )
    }
}

/// Trait for errors that can be converted to JSON-RPC error objects
pub trait ToJsonRpcError: std::error::Error + Send + Sync + 'static {
    fn to_error_object(&self) -> JsonRpcErrorObject;
}

impl ToJsonRpcError for InvokeError {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        match self {
            InvokeError::MissingArgument(_) | InvokeError::ArgumentType { .. } => {
                JsonRpcErrorObject::invalid_params()
            }
            InvokeError::UnknownMethod(_) => JsonRpcErrorObject::method_not_found(),
            InvokeError::Server { code, data } => {
                JsonRpcErrorObject::server_error(*code).with_data(data.clone())
            }
            InvokeError::Internal(_) => JsonRpcErrorObject::internal_error(),
            InvokeError::Other(_) => JsonRpcErrorObject::server_error(ServerErrorCode::GENERIC),
        }
    }
}

/// Executes a named method on behalf of the pipe.
///
/// Implementations may block for as long as the method needs; the pipe adds no
/// timeout of its own.
#[async_trait]
pub trait ActionInvoker: Send + Sync {
    async fn invoke(&self, method: &str, context: CallContext) -> Result<Value, InvokeError>;
}

#[async_trait]
impl<T> ActionInvoker for std::sync::Arc<T>
where
    T: ActionInvoker + ?Sized,
{
    async fn invoke(&self, method: &str, context: CallContext) -> Result<Value, InvokeError> {
        (**self).invoke(method, context).await
    }
}
