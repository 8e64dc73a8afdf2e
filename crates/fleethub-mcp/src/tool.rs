use async_trait::async_trait;
use fleethub_core::{FleetError, FleetResult, ToolCall};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name, purpose and argument schema of a hub tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// An operation exposed to hub callers.
///
/// `execute` returns the tool's JSON output or a [`FleetError`]; the
/// [`ToolRegistry`](crate::ToolRegistry) turns errors into structured results.
#[async_trait]
pub trait Tool: Send + Sync {
    fn descriptor(&self) -> &ToolDescriptor;

    async fn execute(&self, call: ToolCall) -> FleetResult<Value>;
}

/// Schema for tools that take no arguments.
pub(crate) fn empty_schema() -> Value {
    serde_json::json!({"type": "object", "properties": {}})
}

/// Read a required, non-empty string argument.
pub(crate) fn required_str<'a>(args: &'a Value, key: &str) -> FleetResult<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| FleetError::Validation(format!("'{key}' is required")))
}

/// Read an optional string argument; empty strings count as absent.
pub(crate) fn optional_str(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_str() {
        let args = json!({"name": "data-agent", "blank": "  ", "n": 3});
        assert_eq!(required_str(&args, "name").unwrap(), "data-agent");
        for key in ["blank", "n", "missing"] {
            let err = required_str(&args, key).unwrap_err();
            assert_eq!(err.code(), "validation_error");
        }
        assert!(required_str(&Value::Null, "name").is_err());
    }

    #[test]
    fn test_optional_str() {
        let args = json!({"base_url": "http://127.0.0.1:8002", "run_command": ""});
        assert_eq!(
            optional_str(&args, "base_url").as_deref(),
            Some("http://127.0.0.1:8002")
        );
        assert!(optional_str(&args, "run_command").is_none());
    }
}
