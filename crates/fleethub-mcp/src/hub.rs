use crate::dispatch::AgentDispatcher;
use crate::registry::ToolRegistry;
use crate::tools::{register_hub_tools, ToolContext};
use fleethub_core::{FleetResult, ToolCall, ToolResult};
use fleethub_orchestrator::{
    AgentConfig, AgentRegistry, EventLog, HealthMonitor, HubSettings, MonitorHandle,
    RepairController,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// URI of the event log resource.
pub const HEALTH_LOG_URI: &str = "fleethub://health-log";

/// The orchestration hub: shared agent table, dispatch proxy, repair
/// controller, event log and the tool surface built on top of them.
pub struct Hub {
    settings: HubSettings,
    registry: Arc<AgentRegistry>,
    events: Arc<EventLog>,
    dispatcher: Arc<AgentDispatcher>,
    repair: Arc<RepairController>,
    tools: ToolRegistry,
}

impl Hub {
    pub fn new(settings: HubSettings) -> FleetResult<Self> {
        let registry = Arc::new(AgentRegistry::new());
        let events = Arc::new(EventLog::new());
        let dispatcher = Arc::new(AgentDispatcher::new(
            registry.clone(),
            settings.call_timeout(),
        )?);
        let repair = Arc::new(RepairController::new(
            registry.clone(),
            events.clone(),
            settings.clone(),
        ));

        let mut tools = ToolRegistry::new();
        register_hub_tools(
            &mut tools,
            &ToolContext {
                registry: registry.clone(),
                events: events.clone(),
                dispatcher: dispatcher.clone(),
                repair: repair.clone(),
                summarizer_agent: settings.summarizer_agent.clone(),
            },
        );

        Ok(Self {
            settings,
            registry,
            events,
            dispatcher,
            repair,
            tools,
        })
    }

    /// Register the configured agents.
    pub async fn register_agents(&self, agents: &[AgentConfig]) {
        self.registry.register_all(agents).await;
        self.events
            .record(format!("Hub started with {} agents", self.registry.len().await));
    }

    /// Start the background health monitor. Active probing goes through the
    /// dispatch proxy when enabled in the settings.
    pub fn start_monitor(&self) -> MonitorHandle {
        let mut monitor = HealthMonitor::new(
            self.registry.clone(),
            self.repair.clone(),
            self.events.clone(),
            self.settings.clone(),
        );
        if self.settings.active_probe {
            info!("Active health probing enabled");
            monitor = monitor.with_probe(self.dispatcher.clone());
        }
        Arc::new(monitor).start()
    }

    /// Run a tool by name with a fresh call id.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult {
        let id = uuid::Uuid::new_v4().to_string();
        self.tools.invoke(ToolCall::new(id, name, arguments)).await
    }

    /// The event log as newline-separated text, oldest first.
    pub fn health_log(&self) -> String {
        self.events.render()
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    pub fn events(&self) -> &Arc<EventLog> {
        &self.events
    }
}
