//! Agent fleet supervision for the fleethub hub.
//!
//! Keeps the authoritative table of registered agents, watches their
//! heartbeats, relaunches the ones that go silent and records every state
//! change in a bounded event log.
//!
//! # Main types
//!
//! - [`AgentRegistry`]: name-keyed table of agents and their liveness state.
//! - [`HealthMonitor`]: periodic scan that marks silent agents unhealthy.
//! - [`RepairController`]: spawns an agent's run command, at most once per grace window.
//! - [`EventLog`]: the last 200 hub events, readable as text.
//! - [`HubSettings`]: timeouts and repair policy.

/// Agent registration and hub timing settings.
pub mod config;
/// Bounded log of hub activity.
pub mod event_log;
/// Heartbeat timeout detection and the background monitor loop.
pub mod monitor;
/// Shared agent table.
pub mod registry;
/// Agent relaunch from configured run commands.
pub mod repair;
/// Agent status and registry entry types.
pub mod types;

pub use config::{default_agents, AgentConfig, HubSettings};
pub use event_log::{EventLog, EventLogEntry, DEFAULT_EVENT_CAPACITY};
pub use monitor::{HealthMonitor, HealthProbe, MonitorHandle, ScanReport, Transition};
pub use registry::AgentRegistry;
pub use repair::{RepairController, RepairOutcome};
pub use types::{AgentEntry, AgentSnapshot, AgentStatus, FleetSnapshot};
