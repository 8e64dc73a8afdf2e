//! The uniform request/response wrapper exchanged with every agent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of a `POST /call` request to an agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallRequest {
    /// Operation input. Agents dispatch on `input.query`.
    #[serde(default)]
    pub input: Map<String, Value>,
}

impl CallRequest {
    pub fn new(input: Map<String, Value>) -> Self {
        Self { input }
    }

    /// Builds a `{input: {query, ...extra}}` request.
    ///
    /// Keys in `extra` are merged after `query`, so an explicit `query` inside
    /// `extra` wins. Non-object `extra` values are ignored.
    pub fn query(query: &str, extra: Option<&Value>) -> Self {
        let mut input = Map::new();
        input.insert("query".to_string(), Value::String(query.to_string()));
        if let Some(Value::Object(fields)) = extra {
            for (key, value) in fields {
                input.insert(key.clone(), value.clone());
            }
        }
        Self::new(input)
    }

    /// Builds a `{input: {text}}` request.
    pub fn text(text: impl Into<String>) -> Self {
        let mut input = Map::new();
        input.insert("text".to_string(), Value::String(text.into()));
        Self::new(input)
    }

    /// Serialize into the JSON body sent to the agent.
    pub fn to_value(&self) -> Value {
        // A struct of maps always serializes.
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

/// Payload of an agent's `GET /health` endpoint.
///
/// Agents append arbitrary metrics (`cpu`, `memory`, `count`, ...), which are
/// kept in `metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub ts: Option<f64>,
    #[serde(flatten)]
    pub metrics: Map<String, Value>,
}

impl HealthReport {
    /// Whether the agent describes itself as live.
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy")
    }
}
