use crate::dispatch::AgentDispatcher;
use crate::tool::{empty_schema, required_str, Tool, ToolDescriptor};
use async_trait::async_trait;
use chrono::Utc;
use fleethub_core::{epoch_secs, CallRequest, FleetError, FleetResult, ToolCall};
use fleethub_orchestrator::AgentRegistry;
use futures_util::future::join_all;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// `health_all`: `GET /health` on every agent, concurrently.
///
/// Always returns one entry per registered agent; unreachable agents get an
/// `{error, agent}` object in place of their payload.
pub struct HealthAllTool {
    descriptor: ToolDescriptor,
    registry: Arc<AgentRegistry>,
    dispatcher: Arc<AgentDispatcher>,
}

impl HealthAllTool {
    pub fn new(registry: Arc<AgentRegistry>, dispatcher: Arc<AgentDispatcher>) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "health_all",
                "Query /health on every agent and aggregate the results.",
                empty_schema(),
            ),
            registry,
            dispatcher,
        }
    }
}

#[async_trait]
impl Tool for HealthAllTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, _call: ToolCall) -> FleetResult<Value> {
        let names = self.registry.names().await;
        let payloads = join_all(names.iter().map(|name| self.dispatcher.health(name))).await;
        let results: Map<String, Value> = names.into_iter().zip(payloads).collect();
        Ok(json!({
            "status": "ok",
            "timestamp": epoch_secs(Utc::now()),
            "results": results,
        }))
    }
}

/// `call_agent_tool`: forward `{input: {query, ...input}}` to an agent's
/// `/call` endpoint.
pub struct CallAgentTool {
    descriptor: ToolDescriptor,
    dispatcher: Arc<AgentDispatcher>,
}

impl CallAgentTool {
    pub fn new(dispatcher: Arc<AgentDispatcher>) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "call_agent_tool",
                "Proxy a call to a specific agent's /call endpoint.",
                json!({
                    "type": "object",
                    "properties": {
                        "agent": {"type": "string", "description": "Target agent name"},
                        "query": {"type": "string", "description": "Operation the agent should run"},
                        "input": {"type": "object", "description": "Extra input fields merged next to query"}
                    },
                    "required": ["agent", "query"]
                }),
            ),
            dispatcher,
        }
    }
}

#[async_trait]
impl Tool for CallAgentTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> FleetResult<Value> {
        if !call.arguments.is_object() {
            return Err(FleetError::Validation(
                "payload must be an object with agent and query keys".into(),
            ));
        }
        let agent = required_str(&call.arguments, "agent")?;
        let query = required_str(&call.arguments, "query")?;

        let request = CallRequest::query(query, call.arguments.get("input"));
        let result = self.dispatcher.invoke(agent, &request).await;
        Ok(json!({
            "status": "ok",
            "agent": agent,
            "result": result,
        }))
    }
}

/// `summarize_with_gemini`: send text to the summarizer agent.
pub struct SummarizeTool {
    descriptor: ToolDescriptor,
    dispatcher: Arc<AgentDispatcher>,
    agent: String,
}

impl SummarizeTool {
    pub fn new(dispatcher: Arc<AgentDispatcher>, agent: impl Into<String>) -> Self {
        Self {
            descriptor: ToolDescriptor::new(
                "summarize_with_gemini",
                "Summarize text via the Gemini summarizer agent.",
                json!({
                    "type": "object",
                    "properties": {
                        "text": {"type": "string", "description": "Text to summarize"},
                        "body": {"type": "string", "description": "Alias for text"},
                        "input": {
                            "type": "object",
                            "properties": {
                                "text": {"type": "string"},
                                "body": {"type": "string"}
                            }
                        }
                    }
                }),
            ),
            dispatcher,
            agent: agent.into(),
        }
    }
}

/// Find the text to summarize: `input.text`/`input.body` when `input` is an
/// object, else top-level `text`/`body`.
fn summary_text(args: &Value) -> Option<&str> {
    let source = match args.get("input") {
        Some(input) if input.is_object() => input,
        _ => args,
    };
    ["text", "body"]
        .iter()
        .filter_map(|key| source.get(key).and_then(Value::as_str))
        .find(|text| !text.trim().is_empty())
}

#[async_trait]
impl Tool for SummarizeTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> FleetResult<Value> {
        let text = summary_text(&call.arguments).ok_or_else(|| {
            FleetError::Validation("text required (payload.text or payload.input.text)".into())
        })?;
        let summary = self
            .dispatcher
            .invoke(&self.agent, &CallRequest::text(text))
            .await;
        Ok(json!({
            "status": "ok",
            "summary": summary,
        }))
    }
}
