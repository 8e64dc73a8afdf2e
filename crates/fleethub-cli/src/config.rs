use anyhow::{bail, Context};
use fleethub_orchestrator::{default_agents, AgentConfig, HubSettings};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

/// Contents of `fleethub.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct FleetConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub hub: HubSettings,
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8000
}

impl FleetConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let config: FleetConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read the config file. A missing file yields the defaults; an
    /// unreadable or invalid one is an error.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    /// Agents to register at startup: the configured ones, or the default
    /// fleet when none are configured.
    pub fn agents(&self) -> Vec<AgentConfig> {
        if self.agents.is_empty() {
            default_agents()
        } else {
            self.agents.clone()
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for agent in &self.agents {
            if agent.name.trim().is_empty() {
                bail!("agent names must not be empty");
            }
            if !seen.insert(agent.name.as_str()) {
                bail!("agent '{}' is configured twice", agent.name);
            }
        }
        if self.hub.summarizer_agent.trim().is_empty() {
            bail!("hub.summarizer_agent must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = FleetConfig::from_toml("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.hub, HubSettings::default());
        assert_eq!(config.agents().len(), 5);
    }

    #[test]
    fn test_full_config() {
        let config = FleetConfig::from_toml(
            r#"
            [server]
            port = 9100

            [hub]
            heartbeat_timeout_secs = 12
            active_probe = true

            [[agents]]
            name = "data-agent"
            base_url = "http://127.0.0.1:8002"
            run_command = "python agents/agent3/data_agent.py"

            [[agents]]
            name = "math-agent"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.hub.heartbeat_timeout_secs, 12);
        assert_eq!(config.hub.poll_interval_secs, 3);
        assert!(config.hub.active_probe);

        let agents = config.agents();
        assert_eq!(agents.len(), 2);
        assert_eq!(
            agents[0].run_command.as_deref(),
            Some("python agents/agent3/data_agent.py")
        );
        assert!(agents[1].base_url.is_none());
    }

    #[test]
    fn test_duplicate_agent_rejected() {
        let err = FleetConfig::from_toml(
            r#"
            [[agents]]
            name = "data-agent"
            [[agents]]
            name = "data-agent"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("configured twice"));
    }

    #[test]
    fn test_bad_types_rejected() {
        assert!(FleetConfig::from_toml("[server]\nport = \"eighty\"").is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleethub.toml");
        tokio::fs::write(&path, "[hub]\npoll_interval_secs = 1\n")
            .await
            .unwrap();
        let config = FleetConfig::load(&path).await.unwrap();
        assert_eq!(config.hub.poll_interval_secs, 1);

        let missing = FleetConfig::load(&dir.path().join("absent.toml"))
            .await
            .unwrap();
        assert!(missing.agents.is_empty());

        tokio::fs::write(&path, "[hub\n").await.unwrap();
        let err = FleetConfig::load(&path).await.unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }
}
