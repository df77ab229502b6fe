use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::context::CallContext;
use crate::invoker::{ActionInvoker, InvokeError};

/// Trait for handling a single JSON-RPC method
#[async_trait]
pub trait MethodHandler: Send + Sync {
    async fn handle(&self, context: CallContext) -> Result<Value, InvokeError>;
}

/// A handler backed by an async closure
pub struct FunctionHandler<F> {
    handler_fn: F,
}

impl<F> FunctionHandler<F> {
    pub fn new(handler_fn: F) -> Self {
        Self { handler_fn }
    }
}

#[async_trait]
impl<F, Fut> MethodHandler for FunctionHandler<F>
where
    F: Fn(CallContext) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, InvokeError>> + Send + 'static,
{
    async fn handle(&self, context: CallContext) -> Result<Value, InvokeError> {
        (self.handler_fn)(context).await
    }
}

/// Name → handler table used as the pipe's action invoker.
///
/// Unregistered names go to the default handler when one is set, otherwise
/// they fail with [`InvokeError::UnknownMethod`].
#[derive(Default, Clone)]
pub struct MethodRegistry {
    handlers: HashMap<String, Arc<dyn MethodHandler>>,
    default_handler: Option<Arc<dyn MethodHandler>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a specific method
    pub fn register_method<H>(&mut self, method: impl Into<String>, handler: H)
    where
        H: MethodHandler + 'static,
    {
        self.handlers.insert(method.into(), Arc::new(handler));
    }

    /// Register one handler under several names
    pub fn register_methods<H>(&mut self, methods: Vec<String>, handler: H)
    where
        H: MethodHandler + 'static,
    {
        let handler_arc: Arc<dyn MethodHandler> = Arc::new(handler);
        for method in methods {
            self.handlers.insert(method, handler_arc.clone());
        }
    }

    /// Register an async closure
    pub fn register_fn<F, Fut>(&mut self, method: impl Into<String>, handler_fn: F)
    where
        F: Fn(CallContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, InvokeError>> + Send + 'static,
    {
        self.register_method(method, FunctionHandler::new(handler_fn));
    }

    /// Builder-style [`register_fn`](Self::register_fn)
    pub fn with_fn<F, Fut>(mut self, method: impl Into<String>, handler_fn: F) -> Self
    where
        F: Fn(CallContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, InvokeError>> + Send + 'static,
    {
        self.register_fn(method, handler_fn);
        self
    }

    /// Set a default handler for unregistered methods
    pub fn set_default_handler<H>(&mut self, handler: H)
    where
        H: MethodHandler + 'static,
    {
        self.default_handler = Some(Arc::new(handler));
    }

    pub fn has_method(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Registered method names, sorted
    pub fn registered_methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self.handlers.keys().cloned().collect();
        methods.sort();
        methods
    }
}

#[async_trait]
impl ActionInvoker for MethodRegistry {
    async fn invoke(&self, method: &str, context: CallContext) -> Result<Value, InvokeError> {
        let handler = self
            .handlers
            .get(method)
            .or(self.default_handler.as_ref())
            .ok_or_else(|| InvokeError::UnknownMethod(method.to_string()))?;

        debug!("Invoking method: {}", method);
        handler.handle(context).await
    }
}
