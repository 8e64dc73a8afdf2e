use crate::tool::{Tool, ToolDescriptor};
use fleethub_core::{FleetError, ToolCall, ToolResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Ordered set of tools, addressable by name.
///
/// Descriptors are listed in registration order. Re-registering a name
/// replaces the tool in place.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.descriptor().name.clone();
        match self.index.get(&name) {
            Some(&slot) => {
                warn!(tool = %name, "Replacing registered tool");
                self.tools[slot] = tool;
            }
            None => {
                info!(tool = %name, "Registered tool");
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&slot| &self.tools[slot])
    }

    pub fn descriptors(&self) -> Vec<&ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools
            .iter()
            .map(|t| t.descriptor().name.as_str())
            .collect()
    }

    /// Run a tool call. Never fails: unknown tools and tool errors come back
    /// as an error [`ToolResult`] carrying the `{error, message}` object.
    pub async fn invoke(&self, call: ToolCall) -> ToolResult {
        let Some(tool) = self.get(&call.name).cloned() else {
            warn!(tool = %call.name, "Call to unknown tool");
            return ToolResult::error(&call.id, &FleetError::UnknownTool(call.name.clone()));
        };

        let call_id = call.id.clone();
        let name = call.name.clone();
        match tool.execute(call).await {
            Ok(content) => ToolResult::success(call_id, content),
            Err(e) => {
                warn!(tool = %name, code = e.code(), error = %e, "Tool call failed");
                ToolResult::error(call_id, &e)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
