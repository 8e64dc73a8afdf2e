use crate::tool::{required_str, Tool, ToolDescriptor};
use async_trait::async_trait;
use fleethub_core::{FleetError, FleetResult, ToolCall};
use fleethub_orchestrator::{RepairController, RepairOutcome};
use serde_json::{json, Value};
use std::sync::Arc;

/// `repair_agent`: relaunch an agent from its run command.
///
/// Unknown agents are an error; every other outcome, including a failed
/// spawn, is reported as `{ok, agent, message}`.
pub struct RepairAgentTool {
    descriptor: ToolDescriptor,
    repair: Arc<RepairController>,
}

impl RepairAgentTool {
    pub fn new(repair: Arc<RepairController>) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "repair_agent",
                "Restart an agent using its configured run command.",
                json!({
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Agent name"}
                    },
                    "required": ["name"]
                }),
            ),
            repair,
        }
    }
}

#[async_trait]
impl Tool for RepairAgentTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> FleetResult<Value> {
        let name = required_str(&call.arguments, "name")?;
        let (ok, message) = match self.repair.attempt_restart(name).await {
            Ok(RepairOutcome::Spawned { pid, command }) => (
                true,
                match pid {
                    Some(pid) => format!("Restart attempted: spawned `{command}` (pid {pid})"),
                    None => format!("Restart attempted: spawned `{command}`"),
                },
            ),
            Ok(RepairOutcome::AlreadyInProgress) => {
                (false, "Restart already in progress".to_string())
            }
            Ok(RepairOutcome::Superseded { status }) => {
                (false, format!("Restart skipped: agent is {status}"))
            }
            Err(e @ (FleetError::NoRunCommand(_) | FleetError::Spawn { .. })) => {
                (false, e.to_string())
            }
            Err(e) => return Err(e),
        };
        Ok(json!({
            "ok": ok,
            "agent": name,
            "message": message,
        }))
    }
}
