use thiserror::Error;

/// A convenience `Result` alias using [`FleetError`].
pub type FleetResult<T> = Result<T, FleetError>;

/// Top-level error type for the hub.
///
/// Tool handlers return these; the tool surface turns every variant into a
/// structured JSON result instead of letting it escape to the caller.
#[derive(Error, Debug)]
pub enum FleetError {
    /// A required tool field was missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The named agent was never registered.
    #[error("Agent '{0}' not found")]
    AgentNotFound(String),

    /// No tool with this name is registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A restart was requested for an agent without a launch command.
    #[error("Agent '{0}' has no run command configured")]
    NoRunCommand(String),

    /// A downstream agent could not be reached or answered badly.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The replacement process for an agent failed to launch.
    #[error("Failed to spawn agent '{agent}': {message}")]
    Spawn {
        /// Agent whose restart failed.
        agent: String,
        /// Launch failure reported by the OS.
        message: String,
    },

    /// Invalid or unreadable configuration.
    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FleetError {
    /// Stable machine-readable code used in structured error results.
    pub fn code(&self) -> &'static str {
        match self {
            FleetError::Validation(_) => "validation_error",
            FleetError::AgentNotFound(_) => "agent_not_found",
            FleetError::UnknownTool(_) => "unknown_tool",
            FleetError::NoRunCommand(_) => "no_run_command",
            FleetError::Transport(_) => "transport_error",
            FleetError::Spawn { .. } => "spawn_error",
            FleetError::Config(_) => "config_error",
            FleetError::Serialization(_) => "serialization_error",
            FleetError::Io(_) => "io_error",
        }
    }

    /// Render as the `{error, message}` object returned to tool callers.
    pub fn to_value(&self) -> serde_json::Value {
        let mut value = serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        if let Some(agent) = self.agent() {
            value["agent"] = serde_json::Value::String(agent.to_string());
        }
        value
    }

    /// The agent this error concerns, when there is one.
    pub fn agent(&self) -> Option<&str> {
        match self {
            FleetError::AgentNotFound(name) | FleetError::NoRunCommand(name) => Some(name),
            FleetError::Spawn { agent, .. } => Some(agent),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_value() {
        let err = FleetError::AgentNotFound("ghost".to_string());
        let value = err.to_value();
        assert_eq!(value["error"], "agent_not_found");
        assert_eq!(value["agent"], "ghost");
        assert!(value["message"].as_str().unwrap().contains("ghost"));
    }

    #[test]
    fn test_validation_has_no_agent() {
        let err = FleetError::Validation("agent and query are required".into());
        assert_eq!(err.code(), "validation_error");
        assert!(err.agent().is_none());
        assert!(err.to_value().get("agent").is_none());
    }

    #[test]
    fn test_unknown_tool_code() {
        let err = FleetError::UnknownTool("reboot_everything".into());
        assert_eq!(err.code(), "unknown_tool");
        assert_eq!(err.to_string(), "Unknown tool: reboot_everything");
    }

    #[test]
    fn test_spawn_display() {
        let err = FleetError::Spawn {
            agent: "math-agent".into(),
            message: "No such file or directory".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to spawn agent 'math-agent': No such file or directory"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: FleetError = parse.unwrap_err().into();
        assert_eq!(err.code(), "serialization_error");
    }
}
