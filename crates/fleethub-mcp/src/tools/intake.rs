use crate::tool::{optional_str, required_str, Tool, ToolDescriptor};
use async_trait::async_trait;
use chrono::Utc;
use fleethub_core::{FleetResult, ToolCall};
use fleethub_orchestrator::{AgentRegistry, AgentStatus, EventLog};
use serde_json::{json, Value};
use std::sync::Arc;

fn name_schema(extra: Value) -> Value {
    let mut properties = json!({
        "name": {"type": "string", "description": "Agent name"}
    });
    if let (Some(props), Value::Object(extra)) = (properties.as_object_mut(), extra) {
        props.extend(extra);
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": ["name"]
    })
}

/// Apply a healthy report and log recoveries.
async fn accept_heartbeat(registry: &AgentRegistry, events: &EventLog, name: &str) -> FleetResult<()> {
    let previous = registry.record_heartbeat(name, Utc::now()).await?;
    if previous != AgentStatus::Healthy {
        events.record(format!("{name} reported healthy (was {previous})"));
    }
    Ok(())
}

/// `register_agent`: add or replace an agent at runtime.
pub struct RegisterAgentTool {
    descriptor: ToolDescriptor,
    registry: Arc<AgentRegistry>,
    events: Arc<EventLog>,
}

impl RegisterAgentTool {
    pub fn new(registry: Arc<AgentRegistry>, events: Arc<EventLog>) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "register_agent",
                "Register an agent, replacing any entry with the same name.",
                name_schema(json!({
                    "base_url": {"type": "string", "description": "Agent HTTP address"},
                    "run_command": {"type": "string", "description": "Command used to relaunch the agent"}
                })),
            ),
            registry,
            events,
        }
    }
}

#[async_trait]
impl Tool for RegisterAgentTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> FleetResult<Value> {
        let name = required_str(&call.arguments, "name")?;
        let entry = self
            .registry
            .register(
                name,
                optional_str(&call.arguments, "run_command"),
                optional_str(&call.arguments, "base_url"),
            )
            .await;
        self.events.record(format!("Registered agent {name}"));
        Ok(json!({
            "status": "ok",
            "agent": entry,
        }))
    }
}

/// `report_heartbeat`: an agent announces it is alive.
pub struct ReportHeartbeatTool {
    descriptor: ToolDescriptor,
    registry: Arc<AgentRegistry>,
    events: Arc<EventLog>,
}

impl ReportHeartbeatTool {
    pub fn new(registry: Arc<AgentRegistry>, events: Arc<EventLog>) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "report_heartbeat",
                "Record a heartbeat for an agent and mark it healthy.",
                name_schema(json!({})),
            ),
            registry,
            events,
        }
    }
}

#[async_trait]
impl Tool for ReportHeartbeatTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> FleetResult<Value> {
        let name = required_str(&call.arguments, "name")?;
        accept_heartbeat(&self.registry, &self.events, name).await?;
        Ok(json!({
            "status": "ok",
            "message": "Heartbeat OK",
        }))
    }
}

/// `report_status`: an agent (or operator) sets an explicit status.
///
/// A `healthy`/`ok` report counts as a heartbeat.
pub struct ReportStatusTool {
    descriptor: ToolDescriptor,
    registry: Arc<AgentRegistry>,
    events: Arc<EventLog>,
}

impl ReportStatusTool {
    pub fn new(registry: Arc<AgentRegistry>, events: Arc<EventLog>) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "report_status",
                "Set an agent's status explicitly.",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Agent name"},
                        "status": {
                            "type": "string",
                            "enum": ["unknown", "healthy", "unhealthy", "recovering", "failed"]
                        }
                    },
                    "required": ["name", "status"]
                }),
            ),
            registry,
            events,
        }
    }
}

#[async_trait]
impl Tool for ReportStatusTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> FleetResult<Value> {
        let name = required_str(&call.arguments, "name")?;
        let status: AgentStatus = required_str(&call.arguments, "status")?.parse()?;

        if status == AgentStatus::Healthy {
            accept_heartbeat(&self.registry, &self.events, name).await?;
        } else {
            self.registry.set_status(name, status).await?;
            self.events
                .record_warning(format!("{name} reported status {status}"));
        }
        Ok(json!({
            "status": "ok",
            "message": "Report received",
        }))
    }
}
