use crate::error::FleetError;
use serde::{Deserialize, Serialize};

/// A request to invoke one of the hub's tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// The JSON-shaped outcome of a [`ToolCall`].
///
/// Failures are data: `content` then holds the `{error, message}` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: String,
    pub content: serde_json::Value,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(call_id: impl Into<String>, content: serde_json::Value) -> Self {
        Self {
            call_id: call_id.into(),
            content,
            is_error: false,
        }
    }

    pub fn error(call_id: impl Into<String>, err: &FleetError) -> Self {
        Self {
            call_id: call_id.into(),
            content: err.to_value(),
            is_error: true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("call_1", serde_json::json!({"status": "ok"}));
        assert!(!result.is_error);
        assert_eq!(result.content["status"], "ok");
    }

    #[test]
    fn test_tool_result_error() {
        let err = FleetError::Validation("agent required".into());
        let result = ToolResult::error("call_1", &err);
        assert!(result.is_error);
        assert_eq!(result.content["error"], "validation_error");
    }

    #[test]
    fn test_tool_call_arguments_default() {
        let call: ToolCall = serde_json::from_str(r#"{"id":"c1","name":"list_agents"}"#).unwrap();
        assert!(call.arguments.is_null());
    }
}
