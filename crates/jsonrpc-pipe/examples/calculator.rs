//! Calculator JSON-RPC Example
//!
//! Registers a few arithmetic methods and pushes single, batch, notification
//! and malformed payloads through the pipe, printing each response body.
//!
//! Run with `RUST_LOG=jsonrpc_pipe=debug` to see the pipe's own logging.

use async_trait::async_trait;
use jsonrpc_pipe::prelude::*;
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Handler object for operations that share validation
struct DivideHandler;

#[async_trait]
impl MethodHandler for DivideHandler {
    async fn handle(&self, ctx: CallContext) -> Result<Value, InvokeError> {
        let dividend: f64 = ctx.get("dividend")?;
        let divisor: f64 = ctx.get("divisor")?;
        if divisor == 0.0 {
            // Application-defined error 1 => -32001
            return Err(InvokeError::server_with_data(1, json!({"reason": "division by zero"})));
        }
        Ok(json!(dividend / divisor))
    }
}

fn calculator() -> MethodRegistry {
    let mut registry = MethodRegistry::new()
        .with_fn("add", |ctx: CallContext| async move {
            let values: Vec<f64> = ctx.args()?;
            Ok::<_, InvokeError>(json!(values.iter().sum::<f64>()))
        })
        .with_fn("subtract", |ctx: CallContext| async move {
            let a: f64 = ctx.arg(0)?;
            let b: f64 = ctx.arg(1)?;
            Ok::<_, InvokeError>(json!(a - b))
        })
        .with_fn("log", |ctx: CallContext| async move {
            let message: String = ctx.get_or("message", String::new())?;
            info!("client says: {}", message);
            Ok::<_, InvokeError>(Value::Null)
        });
    registry.register_method("divide", DivideHandler);
    registry
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let pipe = JsonRpcPipe::builder()
        .invoker(calculator())
        .max_concurrency(4)
        .build()?;

    let payloads = [
        r#"{"jsonrpc": "2.0", "method": "subtract", "params": [42, 23], "id": 1}"#,
        r#"{"jsonrpc": "2.0", "method": "divide", "params": {"dividend": 1, "divisor": 4}, "id": 2}"#,
        r#"{"jsonrpc": "2.0", "method": "divide", "params": {"dividend": 1, "divisor": 0}, "id": 3}"#,
        r#"{"jsonrpc": "2.0", "method": "multiply", "params": [2, 3], "id": 4}"#,
        r#"{"jsonrpc": "2.0", "method": "log", "params": {"message": "hello"}}"#,
        r#"[
            {"jsonrpc": "2.0", "method": "add", "params": [1, 2, 3], "id": "a"},
            {"jsonrpc": "2.0", "method": "log", "params": {"message": "batched"}},
            {"jsonrpc": "2.0", "method": "subtract", "params": ["x"], "id": "b"},
            7
        ]"#,
        r#"{"jsonrpc": "2.0", "method": "add", "params": [1, 2"#,
    ];

    for payload in payloads {
        let response = pipe.process(payload).await;
        println!("--> {}", payload.split_whitespace().collect::<Vec<_>>().join(" "));
        if response.is_empty() {
            println!("<-- (no content)");
        } else {
            println!("<-- [{}] {}", response.content_type, response.body);
        }
    }

    info!(methods = ?calculator().registered_methods(), "done");
    Ok(())
}
