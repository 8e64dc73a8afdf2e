use crate::tool::{empty_schema, required_str, Tool, ToolDescriptor};
use async_trait::async_trait;
use chrono::Utc;
use fleethub_core::{epoch_secs, FleetResult, ToolCall};
use fleethub_orchestrator::AgentRegistry;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// `list_agents`: registered agents with their address and status.
pub struct ListAgentsTool {
    descriptor: ToolDescriptor,
    registry: Arc<AgentRegistry>,
}

impl ListAgentsTool {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "list_agents",
                "List registered agents with their base URL and status.",
                empty_schema(),
            ),
            registry,
        }
    }
}

#[async_trait]
impl Tool for ListAgentsTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, _call: ToolCall) -> FleetResult<Value> {
        let agents: Map<String, Value> = self
            .registry
            .entries()
            .await
            .into_iter()
            .map(|entry| {
                (
                    entry.name,
                    json!({"url": entry.base_url, "status": entry.status}),
                )
            })
            .collect();
        Ok(json!({
            "status": "ok",
            "agents": agents,
            "ts": epoch_secs(Utc::now()),
        }))
    }
}

/// `get_agent_status`: one agent's status and last heartbeat.
pub struct GetAgentStatusTool {
    descriptor: ToolDescriptor,
    registry: Arc<AgentRegistry>,
}

impl GetAgentStatusTool {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "get_agent_status",
                "Get the status and last heartbeat time of one agent.",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Agent name"}
                    },
                    "required": ["name"]
                }),
            ),
            registry,
        }
    }
}

#[async_trait]
impl Tool for GetAgentStatusTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> FleetResult<Value> {
        let name = required_str(&call.arguments, "name")?;
        let entry = self.registry.get(name).await?;
        Ok(json!({
            "name": entry.name,
            "status": entry.status,
            "last_seen": entry.last_seen_secs(),
        }))
    }
}

/// `fleet_status`: name to status for the whole fleet.
pub struct FleetStatusTool {
    descriptor: ToolDescriptor,
    registry: Arc<AgentRegistry>,
}

impl FleetStatusTool {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "fleet_status",
                "Map every agent name to its current status.",
                empty_schema(),
            ),
            registry,
        }
    }
}

#[async_trait]
impl Tool for FleetStatusTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, _call: ToolCall) -> FleetResult<Value> {
        let statuses: Map<String, Value> = self
            .registry
            .list()
            .await
            .into_iter()
            .map(|(name, snapshot)| (name, json!(snapshot.status)))
            .collect();
        Ok(Value::Object(statuses))
    }
}
