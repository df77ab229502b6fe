use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::invoker::InvokeError;
use crate::request::RequestParams;

/// Arguments of one call as seen by a method handler.
///
/// Keyed params are merged over the ambient values supplied by the front end,
/// so a handler reads `a` the same way whether it came from `params` or from
/// the surrounding request. Positional params stay available by index.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    action: String,
    params: Option<RequestParams>,
    named: Map<String, Value>,
}

impl CallContext {
    pub fn new(
        action: impl Into<String>,
        params: Option<RequestParams>,
        ambient: &Map<String, Value>,
    ) -> Self {
        let mut named = ambient.clone();
        if let Some(RequestParams::Object(map)) = &params {
            named.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        Self {
            action: action.into(),
            params,
            named,
        }
    }

    /// Name of the method being called
    pub fn action(&self) -> &str {
        &self.action
    }

    /// The raw `params` member, if the call had one
    pub fn params(&self) -> Option<&RequestParams> {
        self.params.as_ref()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.named.contains_key(name)
    }

    /// Required named argument
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, InvokeError> {
        let value = self
            .named
            .get(name)
            .ok_or_else(|| InvokeError::MissingArgument(name.to_string()))?;
        convert(name, value)
    }

    /// Optional named argument; a present but mistyped value is still an error
    pub fn get_or<T: DeserializeOwned>(&self, name: &str, default: T) -> Result<T, InvokeError> {
        match self.named.get(name) {
            Some(value) => convert(name, value),
            None => Ok(default),
        }
    }

    /// Positional arguments (empty for keyed or absent params)
    pub fn positional(&self) -> &[Value] {
        match &self.params {
            Some(RequestParams::Array(values)) => values,
            _ => &[],
        }
    }

    /// Required positional argument
    pub fn arg<T: DeserializeOwned>(&self, index: usize) -> Result<T, InvokeError> {
        let name = index.to_string();
        let value = self
            .positional()
            .get(index)
            .ok_or_else(|| InvokeError::MissingArgument(name.clone()))?;
        convert(&name, value)
    }

    /// Every positional argument converted to `T`
    pub fn args<T: DeserializeOwned>(&self) -> Result<Vec<T>, InvokeError> {
        self.positional()
            .iter()
            .enumerate()
            .map(|(index, value)| convert(&index.to_string(), value))
            .collect()
    }
}

fn convert<T: DeserializeOwned>(name: &str, value: &Value) -> Result<T, InvokeError> {
    serde_json::from_value(value.clone()).map_err(|_| InvokeError::ArgumentType {
        name: name.to_string(),
        expected: std::any::type_name::<T>().to_string(),
    })
}
