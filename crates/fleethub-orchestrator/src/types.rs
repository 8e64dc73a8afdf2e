use chrono::{DateTime, Utc};
use fleethub_core::{epoch_secs, FleetError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

/// Liveness state of a registered agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Registered but never reported.
    Unknown,
    /// Reported healthy within the heartbeat timeout.
    Healthy,
    /// Missed its heartbeat; a repair is due.
    Unhealthy,
    /// A replacement process was spawned; waiting for its first heartbeat.
    Recovering,
    /// Spawn failed or the repair budget ran out.
    Failed,
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStatus::Unknown => write!(f, "unknown"),
            AgentStatus::Healthy => write!(f, "healthy"),
            AgentStatus::Unhealthy => write!(f, "unhealthy"),
            AgentStatus::Recovering => write!(f, "recovering"),
            AgentStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for AgentStatus {
    type Err = FleetError;

    /// Parses the status strings agents send in reports. `ok` is accepted as
    /// an alias for `healthy`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unknown" => Ok(AgentStatus::Unknown),
            "healthy" | "ok" => Ok(AgentStatus::Healthy),
            "unhealthy" => Ok(AgentStatus::Unhealthy),
            "recovering" => Ok(AgentStatus::Recovering),
            "failed" => Ok(AgentStatus::Failed),
            other => Err(FleetError::Validation(format!("unknown agent status '{other}'"))),
        }
    }
}

/// One registered agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEntry {
    pub name: String,
    pub status: AgentStatus,
    /// Time of the last heartbeat or restart. `None` until the agent first reports.
    pub last_seen: Option<DateTime<Utc>>,
    /// Launch command used to respawn the agent.
    pub run_command: Option<String>,
    /// Base URL of the agent's HTTP contract.
    pub base_url: Option<String>,
    /// Failed recoveries since the last healthy report.
    #[serde(default)]
    pub repair_attempts: u32,
}

impl AgentEntry {
    pub fn new(
        name: impl Into<String>,
        run_command: Option<String>,
        base_url: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status: AgentStatus::Unknown,
            last_seen: None,
            run_command,
            base_url,
            repair_attempts: 0,
        }
    }

    /// `last_seen` as epoch seconds, `0` when the agent never reported.
    pub fn last_seen_secs(&self) -> f64 {
        self.last_seen.map(epoch_secs).unwrap_or(0.0)
    }

    /// True when `last_seen` is set and lies more than `window` before `now`.
    ///
    /// Never-reported entries are never stale.
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        match self.last_seen {
            Some(seen) => (now - seen).to_std().map(|age| age > window).unwrap_or(false),
            None => false,
        }
    }

    /// Point-in-time view for snapshots.
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            status: self.status,
            last_seen: self.last_seen_secs(),
            base_url: self.base_url.clone(),
        }
    }
}

/// Per-agent view inside a [`FleetSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSnapshot {
    pub status: AgentStatus,
    pub last_seen: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Registry snapshot keyed by agent name. Computed on demand, never stored.
pub type FleetSnapshot = BTreeMap<String, AgentSnapshot>;
