//! Invoker Integration Tests
//!
//! Plugs different invokers into the pipe: a hand-written [`ActionInvoker`],
//! registry handler objects, a default handler, and request-scoped ambient
//! values.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jsonrpc_pipe::prelude::*;
use serde_json::{Map, Value, json};

/// Key-value store that dispatches on the action name itself
#[derive(Default)]
struct KvInvoker {
    store: Mutex<HashMap<String, Value>>,
}

#[async_trait]
impl ActionInvoker for KvInvoker {
    async fn invoke(&self, method: &str, ctx: CallContext) -> Result<Value, InvokeError> {
        match method {
            "kv.set" => {
                let key: String = ctx.get("key")?;
                let value: Value = ctx.get("value")?;
                let mut store = self.store.lock().map_err(InvokeError::other)?;
                Ok(store.insert(key, value).unwrap_or(Value::Null))
            }
            "kv.get" => {
                let key: String = ctx.get("key")?;
                let store = self.store.lock().map_err(InvokeError::other)?;
                store
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| InvokeError::server_with_data(4, json!({ "key": key })))
            }
            other => Err(InvokeError::UnknownMethod(other.to_string())),
        }
    }
}

struct Scale {
    factor: i64,
}

#[async_trait]
impl MethodHandler for Scale {
    async fn handle(&self, ctx: CallContext) -> Result<Value, InvokeError> {
        let values: Vec<i64> = ctx.args()?;
        Ok(json!(values.iter().map(|v| v * self.factor).collect::<Vec<_>>()))
    }
}

/// Answers every unregistered action with its own name
struct Fallback;

#[async_trait]
impl MethodHandler for Fallback {
    async fn handle(&self, ctx: CallContext) -> Result<Value, InvokeError> {
        Ok(json!({ "unhandled": ctx.action() }))
    }
}

#[cfg(test)]
mod custom_invoker {
    use super::*;

    #[tokio::test]
    async fn test_stateful_invoker_round_trip() {
        let _ = tracing_subscriber::fmt::try_init();
        let pipe = JsonRpcPipe::new(KvInvoker::default());

        let body = pipe
            .process(
                r#"[
                    {"jsonrpc": "2.0", "method": "kv.set", "params": {"key": "a", "value": [1, 2]}},
                    {"jsonrpc": "2.0", "method": "kv.set", "params": {"key": "b", "value": "x"}, "id": 1}
                ]"#,
            )
            .await
            .into_body();
        assert_eq!(body, r#"{"jsonrpc":"2.0","result":null,"id":1}"#);

        let body = pipe
            .process(r#"{"jsonrpc": "2.0", "method": "kv.get", "params": {"key": "a"}, "id": 2}"#)
            .await
            .into_body();
        assert_eq!(body, r#"{"jsonrpc":"2.0","result":[1,2],"id":2}"#);
    }

    #[tokio::test]
    async fn test_invoker_error_classes() {
        let pipe = JsonRpcPipe::new(KvInvoker::default());

        let body = pipe
            .process(r#"{"jsonrpc": "2.0", "method": "kv.get", "params": {"key": "zz"}, "id": 1}"#)
            .await
            .into_body();
        assert_eq!(
            body,
            r#"{"jsonrpc":"2.0","error":{"code":-32004,"message":"Server error","data":{"key":"zz"}},"id":1}"#
        );

        let body = pipe
            .process(r#"{"jsonrpc": "2.0", "method": "kv.get", "params": {}, "id": 2}"#)
            .await
            .into_body();
        assert_eq!(
            body,
            r#"{"jsonrpc":"2.0","error":{"code":-32602,"message":"Invalid params"},"id":2}"#
        );

        let body = pipe
            .process(r#"{"jsonrpc": "2.0", "method": "kv.drop", "id": 3}"#)
            .await
            .into_body();
        assert_eq!(
            body,
            r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":3}"#
        );
    }

    #[tokio::test]
    async fn test_shared_invoker_across_pipes() {
        let invoker: Arc<dyn ActionInvoker> = Arc::new(KvInvoker::default());
        let writer = JsonRpcPipe::builder()
            .shared_invoker(invoker.clone())
            .build()
            .unwrap();
        let reader = JsonRpcPipe::builder()
            .shared_invoker(invoker)
            .result_converter(|value: Value| json!({ "value": value }))
            .build()
            .unwrap();

        writer
            .process(r#"{"jsonrpc": "2.0", "method": "kv.set", "params": {"key": "k", "value": 7}}"#)
            .await;
        let body = reader
            .process(r#"{"jsonrpc": "2.0", "method": "kv.get", "params": {"key": "k"}, "id": "r"}"#)
            .await
            .into_body();
        assert_eq!(body, r#"{"jsonrpc":"2.0","result":{"value":7},"id":"r"}"#);
    }
}

#[cfg(test)]
mod registry_handlers {
    use super::*;

    fn registry() -> MethodRegistry {
        let mut registry = MethodRegistry::new();
        registry.register_method("double", Scale { factor: 2 });
        registry.register_methods(
            vec!["negate".to_string(), "flip".to_string()],
            Scale { factor: -1 },
        );
        registry
    }

    #[tokio::test]
    async fn test_handler_objects() {
        let pipe = JsonRpcPipe::new(registry());
        let body = pipe
            .process(
                r#"[
                    {"jsonrpc": "2.0", "method": "double", "params": [1, 2, 3], "id": 1},
                    {"jsonrpc": "2.0", "method": "flip", "params": [4], "id": 2}
                ]"#,
            )
            .await
            .into_body();
        assert_eq!(
            body,
            r#"[{"jsonrpc":"2.0","result":[2,4,6],"id":1},{"jsonrpc":"2.0","result":[-4],"id":2}]"#
        );
    }

    #[tokio::test]
    async fn test_default_handler_catches_unknown_actions() {
        let mut registry = registry();
        registry.set_default_handler(Fallback);
        assert_eq!(registry.registered_methods(), ["double", "flip", "negate"]);

        let pipe = JsonRpcPipe::new(registry);
        let body = pipe
            .process(r#"{"jsonrpc": "2.0", "method": "whatever", "id": 1}"#)
            .await
            .into_body();
        assert_eq!(body, r#"{"jsonrpc":"2.0","result":{"unhandled":"whatever"},"id":1}"#);
    }
}

#[cfg(test)]
mod ambient_values {
    use super::*;

    #[tokio::test]
    async fn test_keyed_params_override_ambient_values() {
        let registry = MethodRegistry::new().with_fn("whoami", |ctx: CallContext| async move {
            let user: String = ctx.get("user")?;
            let tenant: String = ctx.get("tenant")?;
            Ok::<_, InvokeError>(json!(format!("{}@{}", user, tenant)))
        });
        let pipe = JsonRpcPipe::new(registry);

        let mut ambient = Map::new();
        ambient.insert("user".to_string(), json!("session-user"));
        ambient.insert("tenant".to_string(), json!("acme"));

        let body = pipe
            .process_with_context(r#"{"jsonrpc": "2.0", "method": "whoami", "id": 1}"#, &ambient)
            .await
            .into_body();
        assert_eq!(body, r#"{"jsonrpc":"2.0","result":"session-user@acme","id":1}"#);

        let body = pipe
            .process_with_context(
                r#"{"jsonrpc": "2.0", "method": "whoami", "params": {"user": "ann"}, "id": 2}"#,
                &ambient,
            )
            .await
            .into_body();
        assert_eq!(body, r#"{"jsonrpc":"2.0","result":"ann@acme","id":2}"#);
    }
}
