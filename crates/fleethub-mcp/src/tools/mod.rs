//! The hub's tool surface.

mod dispatch;
mod fleet;
mod intake;
mod repair;

pub use dispatch::{CallAgentTool, HealthAllTool, SummarizeTool};
pub use fleet::{FleetStatusTool, GetAgentStatusTool, ListAgentsTool};
pub use intake::{RegisterAgentTool, ReportHeartbeatTool, ReportStatusTool};
pub use repair::RepairAgentTool;

use crate::dispatch::AgentDispatcher;
use crate::registry::ToolRegistry;
use fleethub_orchestrator::{AgentRegistry, EventLog, RepairController};
use std::sync::Arc;

/// Shared services the hub tools operate on.
#[derive(Clone)]
pub struct ToolContext {
    pub registry: Arc<AgentRegistry>,
    pub events: Arc<EventLog>,
    pub dispatcher: Arc<AgentDispatcher>,
    pub repair: Arc<RepairController>,
    /// Agent that backs `summarize_with_gemini`.
    pub summarizer_agent: String,
}

/// Register every hub tool, in the order they are listed to callers.
pub fn register_hub_tools(tools: &mut ToolRegistry, ctx: &ToolContext) {
    tools.register(Arc::new(ListAgentsTool::new(ctx.registry.clone())));
    tools.register(Arc::new(HealthAllTool::new(
        ctx.registry.clone(),
        ctx.dispatcher.clone(),
    )));
    tools.register(Arc::new(CallAgentTool::new(ctx.dispatcher.clone())));
    tools.register(Arc::new(SummarizeTool::new(
        ctx.dispatcher.clone(),
        ctx.summarizer_agent.clone(),
    )));
    tools.register(Arc::new(GetAgentStatusTool::new(ctx.registry.clone())));
    tools.register(Arc::new(RepairAgentTool::new(ctx.repair.clone())));
    tools.register(Arc::new(RegisterAgentTool::new(
        ctx.registry.clone(),
        ctx.events.clone(),
    )));
    tools.register(Arc::new(ReportHeartbeatTool::new(
        ctx.registry.clone(),
        ctx.events.clone(),
    )));
    tools.register(Arc::new(ReportStatusTool::new(
        ctx.registry.clone(),
        ctx.events.clone(),
    )));
    tools.register(Arc::new(FleetStatusTool::new(ctx.registry.clone())));
}
