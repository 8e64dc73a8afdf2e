use crate::config::HubSettings;
use crate::event_log::EventLog;
use crate::registry::AgentRegistry;
use crate::repair::{RepairController, RepairOutcome};
use crate::types::{AgentEntry, AgentStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleethub_core::FleetError;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Pull-based liveness check for one agent.
///
/// Implemented by the dispatch proxy; only consulted when active probing is
/// enabled.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// True if the agent answered its health endpoint and reports itself live.
    async fn probe(&self, agent: &AgentEntry) -> bool;
}

/// A state change decided during one scan.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Healthy agent went silent past the heartbeat timeout.
    TimedOut { name: String, silent_for: Duration },
    /// A restarted agent never reported; another repair is due.
    RecoveryExpired { name: String, attempts: u32 },
    /// The repair budget is exhausted; the agent is pinned to `failed`.
    GaveUp { name: String, attempts: u32 },
}

impl Transition {
    pub fn name(&self) -> &str {
        match self {
            Transition::TimedOut { name, .. }
            | Transition::RecoveryExpired { name, .. }
            | Transition::GaveUp { name, .. } => name,
        }
    }

    fn needs_repair(&self) -> bool {
        !matches!(self, Transition::GaveUp { .. })
    }
}

/// Summary of one monitor pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    /// Agents whose health probe succeeded this pass.
    pub probed_healthy: Vec<String>,
    pub transitions: Vec<Transition>,
}

impl ScanReport {
    /// Names of agents handed to the repair controller.
    pub fn repairs_triggered(&self) -> Vec<&str> {
        self.transitions
            .iter()
            .filter(|t| t.needs_repair())
            .map(Transition::name)
            .collect()
    }
}

/// Decide the transition for one entry at `now`, applying it in place.
///
/// Never-reported entries (`last_seen == None`) are exempt from every check.
fn check_entry(entry: &mut AgentEntry, now: DateTime<Utc>, settings: &HubSettings) -> Option<Transition> {
    let seen = entry.last_seen?;
    match entry.status {
        AgentStatus::Healthy if entry.is_stale(now, settings.heartbeat_timeout()) => {
            entry.status = AgentStatus::Unhealthy;
            Some(Transition::TimedOut {
                name: entry.name.clone(),
                silent_for: (now - seen).to_std().unwrap_or_default(),
            })
        }
        AgentStatus::Recovering
            if entry.is_stale(now, settings.recovery_grace(entry.repair_attempts)) =>
        {
            entry.repair_attempts += 1;
            if entry.repair_attempts >= settings.max_repair_attempts {
                entry.status = AgentStatus::Failed;
                Some(Transition::GaveUp {
                    name: entry.name.clone(),
                    attempts: entry.repair_attempts,
                })
            } else {
                entry.status = AgentStatus::Unhealthy;
                Some(Transition::RecoveryExpired {
                    name: entry.name.clone(),
                    attempts: entry.repair_attempts,
                })
            }
        }
        _ => None,
    }
}

/// Background heartbeat monitor.
///
/// Every `poll_interval` it scans the registry, marks silent healthy agents
/// `unhealthy` and hands them to the [`RepairController`] without waiting for
/// the outcome.
pub struct HealthMonitor {
    registry: Arc<AgentRegistry>,
    repair: Arc<RepairController>,
    events: Arc<EventLog>,
    settings: HubSettings,
    probe: Option<Arc<dyn HealthProbe>>,
}

impl HealthMonitor {
    pub fn new(
        registry: Arc<AgentRegistry>,
        repair: Arc<RepairController>,
        events: Arc<EventLog>,
        settings: HubSettings,
    ) -> Self {
        Self {
            registry,
            repair,
            events,
            settings,
            probe: None,
        }
    }

    /// Enable active probing through `probe` on every scan.
    pub fn with_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Run one pass against the wall clock.
    pub async fn scan(&self) -> ScanReport {
        self.scan_at(Utc::now()).await
    }

    /// Run one pass as if the current time were `now`.
    pub async fn scan_at(&self, now: DateTime<Utc>) -> ScanReport {
        let probed_healthy = match &self.probe {
            Some(probe) => self.probe_all(probe.as_ref(), now).await,
            None => Vec::new(),
        };

        let settings = &self.settings;
        let transitions = self
            .registry
            .scan(|entry| check_entry(entry, now, settings))
            .await;

        for transition in &transitions {
            match transition {
                Transition::TimedOut { name, silent_for } => {
                    self.events.record_warning(format!(
                        "{name} missed its heartbeat ({}s silent), marked unhealthy",
                        silent_for.as_secs()
                    ));
                }
                Transition::RecoveryExpired { name, attempts } => {
                    self.events.record_warning(format!(
                        "{name} did not recover after restart (attempt {attempts}/{}), retrying",
                        settings.max_repair_attempts
                    ));
                }
                Transition::GaveUp { name, attempts } => {
                    self.events.record_warning(format!(
                        "{name} failed to recover after {attempts} attempts, marked failed"
                    ));
                }
            }
            if transition.needs_repair() {
                self.trigger_repair(transition.name().to_string());
            }
        }

        ScanReport {
            probed_healthy,
            transitions,
        }
    }

    /// Probe every addressable agent concurrently and record heartbeats for
    /// the ones that answer.
    async fn probe_all(&self, probe: &dyn HealthProbe, now: DateTime<Utc>) -> Vec<String> {
        let agents: Vec<AgentEntry> = self
            .registry
            .entries()
            .await
            .into_iter()
            .filter(|e| e.base_url.is_some())
            .collect();

        let results = join_all(agents.iter().map(|agent| probe.probe(agent))).await;

        let mut healthy = Vec::new();
        for (agent, ok) in agents.iter().zip(results) {
            if !ok {
                debug!(agent = %agent.name, "Health probe failed");
                continue;
            }
            match self.registry.record_heartbeat(&agent.name, now).await {
                Ok(previous) => {
                    if previous != AgentStatus::Healthy {
                        self.events
                            .record(format!("{} reported healthy (was {previous})", agent.name));
                    }
                    healthy.push(agent.name.clone());
                }
                // Entry vanished between listing and recording; nothing to do.
                Err(e) => debug!(agent = %agent.name, error = %e, "Probe result dropped"),
            }
        }
        healthy
    }

    /// Fire-and-forget repair, conditional on the agent still being
    /// `unhealthy` when the task runs. A failing repair is logged and never
    /// reaches the scan loop.
    fn trigger_repair(&self, name: String) {
        let repair = self.repair.clone();
        tokio::spawn(async move {
            match repair.attempt_restart_if(&name, AgentStatus::Unhealthy).await {
                Ok(RepairOutcome::Spawned { pid, .. }) => {
                    info!(agent = %name, pid = ?pid, "Automatic repair launched");
                }
                Ok(RepairOutcome::AlreadyInProgress | RepairOutcome::Superseded { .. }) => {}
                Err(FleetError::NoRunCommand(_)) => {
                    debug!(agent = %name, "Automatic repair skipped, no run command");
                }
                Err(e) => warn!(agent = %name, error = %e, "Automatic repair failed"),
            }
        });
    }

    /// Start the periodic loop. The loop runs until the returned handle is
    /// shut down (or dropped) or the runtime stops.
    pub fn start(self: Arc<Self>) -> MonitorHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let period = self.settings.poll_interval();

        let task = tokio::spawn(async move {
            info!(
                interval_secs = period.as_secs(),
                timeout_secs = self.settings.heartbeat_timeout_secs,
                "Health monitor started"
            );
            let mut timer = tokio::time::interval(period);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        let report = self.scan().await;
                        if !report.transitions.is_empty() {
                            debug!(transitions = report.transitions.len(), "Monitor pass changed state");
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("Health monitor stopped");
        });

        MonitorHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Owner of a running [`HealthMonitor`] loop.
pub struct MonitorHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Signal the loop to stop and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Health monitor task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
