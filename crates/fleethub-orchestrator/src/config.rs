use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Static registration for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Launch command, `program arg arg ...`, used by the repair controller.
    #[serde(default)]
    pub run_command: Option<String>,
}

impl AgentConfig {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: Some(base_url.into()),
            run_command: None,
        }
    }

    pub fn with_run_command(mut self, command: impl Into<String>) -> Self {
        self.run_command = Some(command.into());
        self
    }
}

/// The fleet registered when no agents are configured.
pub fn default_agents() -> Vec<AgentConfig> {
    vec![
        AgentConfig::new("finance-agent", "http://127.0.0.1:8001"),
        AgentConfig::new("data-agent", "http://127.0.0.1:8002"),
        AgentConfig::new("math-agent", "http://127.0.0.1:8003"),
        AgentConfig::new("health-agent", "http://127.0.0.1:8004"),
        AgentConfig::new("summarizer-gemini", "http://127.0.0.1:8005"),
    ]
}

/// Timing and policy knobs for the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubSettings {
    /// Silence after which a healthy agent is marked unhealthy.
    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_secs: u64,
    /// Period of the health monitor loop.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Timeout for each outbound call to an agent.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
    /// Failed recoveries tolerated before an agent is pinned to `failed`.
    #[serde(default = "default_max_repair_attempts")]
    pub max_repair_attempts: u32,
    /// Upper bound for the recovery grace window.
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
    /// Probe `GET /health` on every scan instead of waiting for pushed heartbeats.
    #[serde(default)]
    pub active_probe: bool,
    /// Agent that backs the `summarize_with_gemini` tool.
    #[serde(default = "default_summarizer_agent")]
    pub summarizer_agent: String,
}

fn default_heartbeat_timeout() -> u64 {
    8
}
fn default_poll_interval() -> u64 {
    3
}
fn default_call_timeout() -> u64 {
    15
}
fn default_max_repair_attempts() -> u32 {
    3
}
fn default_max_backoff() -> u64 {
    60
}
fn default_summarizer_agent() -> String {
    "summarizer-gemini".to_string()
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            heartbeat_timeout_secs: default_heartbeat_timeout(),
            poll_interval_secs: default_poll_interval(),
            call_timeout_secs: default_call_timeout(),
            max_repair_attempts: default_max_repair_attempts(),
            max_backoff_secs: default_max_backoff(),
            active_probe: false,
            summarizer_agent: default_summarizer_agent(),
        }
    }
}

impl HubSettings {
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_secs(self.heartbeat_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic.
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// How long a `recovering` agent may stay silent after its `attempt`-th
    /// failed recovery (0-based): the heartbeat timeout doubled per attempt,
    /// capped at `max_backoff_secs`.
    pub fn recovery_grace(&self, attempt: u32) -> Duration {
        let secs = self
            .heartbeat_timeout_secs
            .saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_secs(secs.min(self.max_backoff_secs.max(self.heartbeat_timeout_secs)))
    }
}
