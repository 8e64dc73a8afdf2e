use crate::config::HubSettings;
use crate::event_log::EventLog;
use crate::registry::AgentRegistry;
use crate::types::AgentStatus;
use chrono::Utc;
use fleethub_core::{FleetError, FleetResult};
use serde::Serialize;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{error, info, warn};

/// Result of a restart request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RepairOutcome {
    /// A replacement process was launched; the agent is now `recovering`.
    Spawned { pid: Option<u32>, command: String },
    /// A previous restart is still inside its recovery grace window.
    AlreadyInProgress,
    /// The agent left the state the repair was requested for (typically a
    /// heartbeat arrived first); nothing was spawned.
    Superseded { status: AgentStatus },
}

/// What the guarded precheck decided while holding the registry lock.
enum RepairStep {
    Spawned { pid: Option<u32>, command: String },
    SpawnFailed { command: String, reason: String },
    InProgress,
    Superseded(AgentStatus),
    NoCommand,
}

/// Relaunches agents from their configured run command.
///
/// The precheck, the spawn and the transition to `recovering` happen inside one
/// registry write-lock acquisition, so two concurrent requests for the same
/// agent yield at most one spawn: the second sees `recovering` and backs off
/// until the grace window for the current attempt has passed.
pub struct RepairController {
    registry: Arc<AgentRegistry>,
    events: Arc<EventLog>,
    settings: HubSettings,
}

impl RepairController {
    pub fn new(registry: Arc<AgentRegistry>, events: Arc<EventLog>, settings: HubSettings) -> Self {
        Self {
            registry,
            events,
            settings,
        }
    }

    /// Spawn a replacement process for `name`.
    ///
    /// Fails with [`FleetError::AgentNotFound`], [`FleetError::NoRunCommand`]
    /// or [`FleetError::Spawn`]; every failure is also written to the event log.
    /// The hub does not wait for the child: recovery is confirmed only by a
    /// later heartbeat.
    pub async fn attempt_restart(&self, name: &str) -> FleetResult<RepairOutcome> {
        self.restart(name, None).await
    }

    /// Like [`attempt_restart`](Self::attempt_restart), but only while the
    /// agent is still in `expected`. The check and the spawn share one lock
    /// acquisition, so a heartbeat that lands first wins and the outcome is
    /// [`RepairOutcome::Superseded`].
    pub async fn attempt_restart_if(
        &self,
        name: &str,
        expected: AgentStatus,
    ) -> FleetResult<RepairOutcome> {
        self.restart(name, Some(expected)).await
    }

    async fn restart(&self, name: &str, expected: Option<AgentStatus>) -> FleetResult<RepairOutcome> {
        let now = Utc::now();
        let settings = &self.settings;

        let mut was_healthy = false;
        let step = self
            .registry
            .update(name, |entry| {
                if let Some(expected) = expected {
                    if entry.status != expected {
                        return RepairStep::Superseded(entry.status);
                    }
                }
                was_healthy = entry.status == AgentStatus::Healthy;
                if entry.status == AgentStatus::Recovering
                    && !entry.is_stale(now, settings.recovery_grace(entry.repair_attempts))
                {
                    return RepairStep::InProgress;
                }
                let Some(command) = entry.run_command.clone() else {
                    return RepairStep::NoCommand;
                };
                match spawn_detached(&command) {
                    Ok(pid) => {
                        entry.status = AgentStatus::Recovering;
                        entry.last_seen = Some(now);
                        RepairStep::Spawned { pid, command }
                    }
                    Err(e) => {
                        entry.status = AgentStatus::Failed;
                        RepairStep::SpawnFailed {
                            command,
                            reason: e.to_string(),
                        }
                    }
                }
            })
            .await
            .inspect_err(|_| {
                self.events
                    .record_warning(format!("Repair requested for unknown agent {name}"));
            })?;

        if was_healthy && !matches!(step, RepairStep::NoCommand) {
            warn!(agent = %name, "Repair requested for a healthy agent");
            self.events
                .record_warning(format!("Repair requested for {name} while it is healthy"));
        }

        match step {
            RepairStep::Spawned { pid, command } => {
                info!(agent = %name, pid = ?pid, command = %command, "Spawned replacement agent");
                self.events.record(format!(
                    "Restart attempted for {name}: spawned `{command}` (pid {})",
                    pid.map(|p| p.to_string()).unwrap_or_else(|| "?".into())
                ));
                Ok(RepairOutcome::Spawned { pid, command })
            }
            RepairStep::InProgress => {
                info!(agent = %name, "Restart already in progress");
                self.events
                    .record(format!("Restart for {name} skipped: already in progress"));
                Ok(RepairOutcome::AlreadyInProgress)
            }
            RepairStep::Superseded(status) => {
                info!(agent = %name, status = %status, "Repair no longer needed");
                self.events
                    .record(format!("Restart for {name} skipped: agent is now {status}"));
                Ok(RepairOutcome::Superseded { status })
            }
            RepairStep::NoCommand => {
                warn!(agent = %name, "Cannot restart agent without run command");
                self.events
                    .record_warning(format!("No run command for {name}; restart skipped"));
                Err(FleetError::NoRunCommand(name.to_string()))
            }
            RepairStep::SpawnFailed { command, reason } => {
                error!(agent = %name, command = %command, error = %reason, "Agent spawn failed");
                self.events.record_warning(format!(
                    "Restart of {name} failed: could not spawn `{command}`: {reason}"
                ));
                Err(FleetError::Spawn {
                    agent: name.to_string(),
                    message: reason,
                })
            }
        }
    }
}

/// Launch `command` (`program arg arg ...`) in its own process group with
/// stdio discarded. The child is not supervised after this returns.
fn spawn_detached(command: &str) -> std::io::Result<Option<u32>> {
    let mut parts = command.split_whitespace();
    let program = parts.next().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty run command")
    })?;

    let mut cmd = Command::new(program);
    cmd.args(parts)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false);
    #[cfg(unix)]
    cmd.process_group(0);

    let child = cmd.spawn()?;
    Ok(child.id())
}
