use crate::config::AgentConfig;
use crate::types::{AgentEntry, AgentStatus, FleetSnapshot};
use chrono::{DateTime, Utc};
use fleethub_core::{FleetError, FleetResult};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Authoritative table of registered agents.
///
/// Every compound transition (check-then-set) runs inside a single write-lock
/// acquisition through [`AgentRegistry::update`] or [`AgentRegistry::scan`],
/// so the monitor, the repair controller and heartbeat intake never interleave
/// on one entry.
pub struct AgentRegistry {
    entries: RwLock<BTreeMap<String, AgentEntry>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create or overwrite an entry. The new entry starts `unknown`, never seen.
    pub async fn register(
        &self,
        name: impl Into<String>,
        run_command: Option<String>,
        base_url: Option<String>,
    ) -> AgentEntry {
        let entry = AgentEntry::new(name, run_command, base_url);
        let mut entries = self.entries.write().await;
        if entries.contains_key(&entry.name) {
            warn!(agent = %entry.name, "Re-registering agent, previous entry discarded");
        } else {
            info!(agent = %entry.name, base_url = ?entry.base_url, "Registered agent");
        }
        entries.insert(entry.name.clone(), entry.clone());
        entry
    }

    /// Register every configured agent.
    pub async fn register_all(&self, agents: &[AgentConfig]) {
        for agent in agents {
            self.register(
                agent.name.clone(),
                agent.run_command.clone(),
                agent.base_url.clone(),
            )
            .await;
        }
    }

    pub async fn get(&self, name: &str) -> FleetResult<AgentEntry> {
        let entries = self.entries.read().await;
        entries
            .get(name)
            .cloned()
            .ok_or_else(|| FleetError::AgentNotFound(name.to_string()))
    }

    /// Snapshot of every agent's status, last heartbeat and address.
    pub async fn list(&self) -> FleetSnapshot {
        let entries = self.entries.read().await;
        entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.snapshot()))
            .collect()
    }

    /// Clones of all entries, ordered by name.
    pub async fn entries(&self) -> Vec<AgentEntry> {
        self.entries.read().await.values().cloned().collect()
    }

    pub async fn names(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn set_status(&self, name: &str, status: AgentStatus) -> FleetResult<()> {
        self.update(name, |entry| entry.status = status).await
    }

    pub async fn touch(&self, name: &str, at: DateTime<Utc>) -> FleetResult<()> {
        self.update(name, |entry| entry.last_seen = Some(at)).await
    }

    /// Apply a healthy report: refresh `last_seen`, mark `healthy` and clear the
    /// repair budget. Returns the status the agent had before the report.
    pub async fn record_heartbeat(&self, name: &str, at: DateTime<Utc>) -> FleetResult<AgentStatus> {
        self.update(name, |entry| {
            let previous = entry.status;
            entry.last_seen = Some(at);
            entry.status = AgentStatus::Healthy;
            entry.repair_attempts = 0;
            previous
        })
        .await
    }

    /// Run `f` on one entry under the write lock.
    pub async fn update<F, T>(&self, name: &str, f: F) -> FleetResult<T>
    where
        F: FnOnce(&mut AgentEntry) -> T,
    {
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(name)
            .ok_or_else(|| FleetError::AgentNotFound(name.to_string()))?;
        Ok(f(entry))
    }

    /// Run `f` on every entry under one write-lock acquisition, collecting the
    /// `Some` results in name order.
    pub async fn scan<F, T>(&self, mut f: F) -> Vec<T>
    where
        F: FnMut(&mut AgentEntry) -> Option<T>,
    {
        let mut entries = self.entries.write().await;
        entries.values_mut().filter_map(&mut f).collect()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_get() {
        let registry = AgentRegistry::new();
        registry
            .register("data-agent", None, Some("http://127.0.0.1:8002".into()))
            .await;

        let entry = registry.get("data-agent").await.unwrap();
        assert_eq!(entry.status, AgentStatus::Unknown);
        assert!(entry.last_seen.is_none());
        assert_eq!(entry.base_url.as_deref(), Some("http://127.0.0.1:8002"));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing_agent() {
        let registry = AgentRegistry::new();
        let err = registry.get("ghost").await.unwrap_err();
        assert!(matches!(err, FleetError::AgentNotFound(ref name) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_register_overwrites_entry() {
        let registry = AgentRegistry::new();
        registry.register("math-agent", None, None).await;
        registry.record_heartbeat("math-agent", Utc::now()).await.unwrap();
        assert_eq!(
            registry.get("math-agent").await.unwrap().status,
            AgentStatus::Healthy
        );

        registry
            .register("math-agent", Some("math-agent --port 8003".into()), None)
            .await;
        let entry = registry.get("math-agent").await.unwrap();
        assert_eq!(entry.status, AgentStatus::Unknown);
        assert!(entry.last_seen.is_none());
        assert_eq!(entry.run_command.as_deref(), Some("math-agent --port 8003"));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_mutations_on_missing_agent_fail_cleanly() {
        let registry = AgentRegistry::new();
        assert!(registry.set_status("ghost", AgentStatus::Failed).await.is_err());
        assert!(registry.touch("ghost", Utc::now()).await.is_err());
        assert!(registry.record_heartbeat("ghost", Utc::now()).await.is_err());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_record_heartbeat_resets_repair_budget() {
        let registry = AgentRegistry::new();
        registry.register("health-agent", None, None).await;
        registry
            .update("health-agent", |e| {
                e.status = AgentStatus::Failed;
                e.repair_attempts = 3;
            })
            .await
            .unwrap();

        let now = Utc::now();
        let previous = registry.record_heartbeat("health-agent", now).await.unwrap();
        assert_eq!(previous, AgentStatus::Failed);

        let entry = registry.get("health-agent").await.unwrap();
        assert_eq!(entry.status, AgentStatus::Healthy);
        assert_eq!(entry.last_seen, Some(now));
        assert_eq!(entry.repair_attempts, 0);
    }

    #[tokio::test]
    async fn test_list_snapshot_is_sorted() {
        let registry = AgentRegistry::new();
        registry.register_all(&crate::config::default_agents()).await;
        let snapshot = registry.list().await;
        let names: Vec<&String> = snapshot.keys().collect();
        assert_eq!(
            names,
            vec![
                "data-agent",
                "finance-agent",
                "health-agent",
                "math-agent",
                "summarizer-gemini"
            ]
        );
        assert!(snapshot.values().all(|s| s.status == AgentStatus::Unknown));
        assert_eq!(registry.names().await.len(), 5);
    }

    #[tokio::test]
    async fn test_scan_collects_matches() {
        let registry = AgentRegistry::new();
        registry.register("a", None, None).await;
        registry.register("b", None, None).await;
        registry.set_status("b", AgentStatus::Healthy).await.unwrap();

        let healthy = registry
            .scan(|e| (e.status == AgentStatus::Healthy).then(|| e.name.clone()))
            .await;
        assert_eq!(healthy, vec!["b".to_string()]);
    }
}
