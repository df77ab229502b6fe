use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::batch::BatchCoordinator;
use crate::config::{PipeConfig, ResultConverter};
use crate::dispatch::SingleCallDispatcher;
use crate::error::{JsonRpcError, PipeError};
use crate::invoker::ActionInvoker;
use crate::query;
use crate::validate::{Entry, RequestValidator};

/// Body sent when a response can't be serialized
const SERIALIZATION_FALLBACK: &str =
    r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error"},"id":null}"#;

/// What the front end writes back: a body and its content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeResponse {
    pub content_type: String,
    pub body: String,
}

impl PipeResponse {
    /// True when every call was a notification
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

/// The JSON-RPC 2.0 request pipe.
///
/// Holds no per-call state, so one instance can serve any number of
/// concurrent calls.
#[derive(Clone)]
pub struct JsonRpcPipe {
    validator: RequestValidator,
    coordinator: BatchCoordinator,
    config: Arc<PipeConfig>,
}

impl JsonRpcPipe {
    /// Pipe with the default configuration
    pub fn new<I>(invoker: I) -> Self
    where
        I: ActionInvoker + 'static,
    {
        Self::with_config(Arc::new(invoker), PipeConfig::default())
    }

    pub fn builder() -> JsonRpcPipeBuilder {
        JsonRpcPipeBuilder::new()
    }

    fn with_config(invoker: Arc<dyn ActionInvoker>, config: PipeConfig) -> Self {
        let dispatcher =
            SingleCallDispatcher::new(invoker).with_result_converter(config.result_converter.clone());
        Self {
            validator: RequestValidator::new(config.strict_version),
            coordinator: BatchCoordinator::new(dispatcher, config.effective_concurrency()),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &PipeConfig {
        &self.config
    }

    /// Process raw request text
    pub async fn process(&self, raw: &str) -> PipeResponse {
        self.process_with_context(raw, &Map::new()).await
    }

    /// Process raw request text with request-scoped values that keyed params
    /// are merged over
    pub async fn process_with_context(&self, raw: &str, ambient: &Map<String, Value>) -> PipeResponse {
        debug!("Received JSON-RPC payload: {}", raw);
        let entries = self.validator.parse(raw);
        self.run(entries, ambient).await
    }

    /// Process a URL-encoded query string carrying the payload under
    /// [`PipeConfig::query_key`]. The remaining parameters become ambient
    /// values; a missing payload is a parse error.
    pub async fn process_query(&self, query: &str) -> PipeResponse {
        let key = self.config.query_key.as_str();
        let ambient = query::ambient_from_query(query, key);

        match query::extract_query_payload(query, key) {
            Some(raw) => self.process_with_context(&raw, &ambient).await,
            None => {
                debug!("Query string has no '{}' parameter", key);
                self.run(vec![Entry::Invalid(JsonRpcError::parse_error())], &ambient)
                    .await
            }
        }
    }

    async fn run(&self, entries: Vec<Entry>, ambient: &Map<String, Value>) -> PipeResponse {
        let wire = self.coordinator.coordinate(entries, ambient).await;

        let body = wire.to_body().unwrap_or_else(|err| {
            error!("Failed to serialize JSON-RPC response: {}", err);
            SERIALIZATION_FALLBACK.to_string()
        });

        PipeResponse {
            content_type: self.config.content_type.clone(),
            body,
        }
    }
}

/// Builder for [`JsonRpcPipe`]
#[derive(Default)]
pub struct JsonRpcPipeBuilder {
    config: PipeConfig,
    invoker: Option<Arc<dyn ActionInvoker>>,
}

impl JsonRpcPipeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invoker<I>(mut self, invoker: I) -> Self
    where
        I: ActionInvoker + 'static,
    {
        self.invoker = Some(Arc::new(invoker));
        self
    }

    pub fn shared_invoker(mut self, invoker: Arc<dyn ActionInvoker>) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: PipeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.config.content_type = content_type.into();
        self
    }

    pub fn strict_version(mut self, strict: bool) -> Self {
        self.config.strict_version = strict;
        self
    }

    pub fn query_key(mut self, key: impl Into<String>) -> Self {
        self.config.query_key = key.into();
        self
    }

    pub fn result_converter<F>(mut self, converter: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        let converter: ResultConverter = Arc::new(converter);
        self.config.result_converter = Some(converter);
        self
    }

    pub fn build(self) -> Result<JsonRpcPipe, PipeError> {
        let invoker = self.invoker.ok_or(PipeError::MissingInvoker)?;
        Ok(JsonRpcPipe::with_config(invoker, self.config))
    }
}
