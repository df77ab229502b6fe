use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Hook applied to every successful result before it is serialized
pub type ResultConverter = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Pipe configuration, fixed at construction time
#[derive(Clone)]
pub struct PipeConfig {
    /// Upper bound on batch elements dispatched at once (minimum 1)
    pub max_concurrency: usize,
    /// Content type reported alongside every body
    pub content_type: String,
    /// Only accept `"jsonrpc": "2.0"` instead of any truthy version
    pub strict_version: bool,
    /// Query-string parameter carrying the payload
    pub query_key: String,
    pub result_converter: Option<ResultConverter>,
}

impl PipeConfig {
    /// Concurrency limit actually used when fanning out a batch
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 16,
            content_type: crate::JSON_CONTENT_TYPE.to_string(),
            strict_version: false,
            query_key: "q".to_string(),
            result_converter: None,
        }
    }
}

impl fmt::Debug for PipeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeConfig")
            .field("max_concurrency", &self.max_concurrency)
            .field("content_type", &self.content_type)
            .field("strict_version", &self.strict_version)
            .field("query_key", &self.query_key)
            .field("result_converter", &self.result_converter.is_some())
            .finish()
    }
}
