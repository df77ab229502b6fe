use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::config::ResultConverter;
use crate::context::CallContext;
use crate::error::JsonRpcError;
use crate::invoker::{ActionInvoker, InvokeError, ToJsonRpcError};
use crate::request::JsonRpcRequest;
use crate::response::{JsonRpcMessage, Outcome};

/// Runs one validated call through the invoker and shapes the outcome.
#[derive(Clone)]
pub struct SingleCallDispatcher {
    invoker: Arc<dyn ActionInvoker>,
    result_converter: Option<ResultConverter>,
}

impl SingleCallDispatcher {
    pub fn new(invoker: Arc<dyn ActionInvoker>) -> Self {
        Self {
            invoker,
            result_converter: None,
        }
    }

    pub fn with_result_converter(mut self, converter: Option<ResultConverter>) -> Self {
        self.result_converter = converter;
        self
    }

    /// Invoke `request` and map the result.
    ///
    /// Notifications always yield [`Outcome::Notification`], whatever the
    /// invoker did. A panicking invoker or result converter counts as an
    /// unclassified failure.
    #[instrument(skip(self, request, ambient), fields(method = %request.method))]
    pub async fn dispatch(&self, request: JsonRpcRequest, ambient: &Map<String, Value>) -> Outcome {
        let JsonRpcRequest {
            id, method, params, ..
        } = request;

        let context = CallContext::new(method.as_str(), params, ambient);
        let converter = self.result_converter.as_ref().filter(|_| id.is_some());
        let invocation = self.invoker.invoke(&method, context).map(|result| match converter {
            Some(convert) => result.map(|value| convert(value)),
            None => result,
        });
        let result = AssertUnwindSafe(invocation)
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(InvokeError::Other(panic_message(panic.as_ref()))));

        let Some(id) = id else {
            if let Err(err) = result {
                debug!("Notification failed, no response sent: method={} error={}", method, err);
            }
            return Outcome::Notification;
        };

        match result {
            Ok(value) => Outcome::Response(JsonRpcMessage::success(id, value)),
            Err(err) => {
                if err.is_params_error() {
                    debug!("Invalid params for method={} id={}: {}", method, id, err);
                } else {
                    warn!("Method failed: method={} id={} error={}", method, id, err);
                }
                JsonRpcError::new(Some(id), err.to_error_object()).into()
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("handler panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("handler panicked: {}", s)
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_codes::*;
    use crate::registry::MethodRegistry;
    use crate::types::RequestId;
    use serde_json::json;
    use tracing_test::traced_test;

    fn dispatcher() -> SingleCallDispatcher {
        let registry = MethodRegistry::new()
            .with_fn("subtract", |ctx: CallContext| async move {
                let a: i64 = ctx.arg(0)?;
                let b: i64 = ctx.arg(1)?;
                Ok::<_, InvokeError>(json!(a - b))
            })
            .with_fn("fail", |_ctx: CallContext| async move {
                Err::<Value, _>(InvokeError::server(3))
            })
            .with_fn("boom", |_ctx: CallContext| async move {
                if true {
                    panic!("exploded");
                }
                Ok::<_, InvokeError>(Value::Null)
            });
        SingleCallDispatcher::new(Arc::new(registry))
    }

    fn request(id: Option<i64>, method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest::new(
            id.map(RequestId::from),
            method,
            crate::RequestParams::from_value(params),
        )
    }

    async fn error_code(id: i64, method: &str, params: Value) -> Option<i64> {
        match dispatcher().dispatch(request(Some(id), method, params), &Map::new()).await {
            Outcome::Response(message) => message.error_code(),
            Outcome::Notification => panic!("request with id produced no response"),
        }
    }

    #[tokio::test]
    async fn test_success() {
        let outcome = dispatcher()
            .dispatch(request(Some(1), "subtract", json!([42, 23])), &Map::new())
            .await;
        let message = outcome.into_message().unwrap();
        assert_eq!(message.result(), Some(&json!(19)));
        assert_eq!(message.id(), Some(&RequestId::from(1)));
    }

    #[tokio::test]
    async fn test_failure_mapping() {
        assert_eq!(error_code(1, "subtract", json!([])).await, Some(INVALID_PARAMS));
        assert_eq!(error_code(1, "subtract", json!(["a", 1])).await, Some(INVALID_PARAMS));
        assert_eq!(error_code(2, "qwerty", json!([])).await, Some(METHOD_NOT_FOUND));
        assert_eq!(error_code(3, "fail", json!([])).await, Some(-32003));
        assert_eq!(error_code(4, "boom", json!([])).await, Some(SERVER_ERROR_END));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_notification_swallows_failures() {
        for method in ["subtract", "qwerty", "fail", "boom"] {
            let outcome = dispatcher()
                .dispatch(request(None, method, json!([])), &Map::new())
                .await;
            assert_eq!(outcome, Outcome::Notification);
        }
        assert!(logs_contain("Notification failed, no response sent"));
    }

    #[tokio::test]
    async fn test_result_converter_applies_to_success_only() {
        let converter: ResultConverter = Arc::new(|value: Value| json!({ "wrapped": value }));
        let dispatcher = dispatcher().with_result_converter(Some(converter));

        let ok = dispatcher
            .dispatch(request(Some(1), "subtract", json!([3, 1])), &Map::new())
            .await
            .into_message()
            .unwrap();
        assert_eq!(ok.result(), Some(&json!({"wrapped": 2})));

        let err = dispatcher
            .dispatch(request(Some(2), "fail", json!([])), &Map::new())
            .await
            .into_message()
            .unwrap();
        assert!(err.is_error());
    }

    #[tokio::test]
    async fn test_panicking_converter_is_server_error() {
        let converter: ResultConverter = Arc::new(|_value: Value| -> Value { panic!("converter failed") });
        let dispatcher = dispatcher().with_result_converter(Some(converter));

        let message = dispatcher
            .dispatch(request(Some(1), "subtract", json!([3, 1])), &Map::new())
            .await
            .into_message()
            .unwrap();
        assert_eq!(message.error_code(), Some(SERVER_ERROR_END));
        assert_eq!(message.id(), Some(&RequestId::from(1)));

        let outcome = dispatcher
            .dispatch(request(None, "subtract", json!([3, 1])), &Map::new())
            .await;
        assert_eq!(outcome, Outcome::Notification);
    }
}
