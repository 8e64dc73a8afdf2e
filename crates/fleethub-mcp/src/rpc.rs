//! Server-side handling of MCP JSON-RPC requests against a [`Hub`].

use crate::hub::{Hub, HEALTH_LOG_URI};
use crate::protocol::{
    InitializeResult, JsonRpcRequest, JsonRpcResponse, McpResource, McpToolDef, McpToolResult,
    ResourceContents, ServerCapabilities, ServerInfo, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, PROTOCOL_VERSION,
};
use serde_json::{json, Value};
use tracing::debug;

/// Answer one JSON-RPC request. Notifications get no response.
pub async fn handle_request(hub: &Hub, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
    debug!(method = %request.method, "MCP request");
    let id = request.id.clone()?;

    if request.jsonrpc != "2.0" {
        return Some(JsonRpcResponse::failure(
            id,
            INVALID_REQUEST,
            "jsonrpc must be \"2.0\"",
        ));
    }

    let params = request.params.unwrap_or(Value::Null);
    let response = match request.method.as_str() {
        "initialize" => JsonRpcResponse::success(id, initialize_result()),
        "ping" => JsonRpcResponse::success(id, json!({})),
        "tools/list" => {
            let tools: Vec<McpToolDef> = hub
                .tools()
                .descriptors()
                .into_iter()
                .map(McpToolDef::from)
                .collect();
            JsonRpcResponse::success(id, json!({ "tools": tools }))
        }
        "tools/call" => {
            let Some(name) = params.get("name").and_then(Value::as_str) else {
                return Some(JsonRpcResponse::failure(
                    id,
                    INVALID_PARAMS,
                    "tools/call requires a tool name",
                ));
            };
            let arguments = params.get("arguments").cloned().unwrap_or(json!({}));
            let result = McpToolResult::from(&hub.call_tool(name, arguments).await);
            JsonRpcResponse::success(id, json!(result))
        }
        "resources/list" => {
            let health_log = McpResource {
                uri: HEALTH_LOG_URI.to_string(),
                name: "health-log".to_string(),
                description: "Most recent hub events, oldest first".to_string(),
                mime_type: "text/plain".to_string(),
            };
            JsonRpcResponse::success(id, json!({ "resources": [health_log] }))
        }
        "resources/read" => match params.get("uri").and_then(Value::as_str) {
            Some(HEALTH_LOG_URI) => {
                let contents = ResourceContents {
                    uri: HEALTH_LOG_URI.to_string(),
                    mime_type: "text/plain".to_string(),
                    text: hub.health_log(),
                };
                JsonRpcResponse::success(id, json!({ "contents": [contents] }))
            }
            Some(other) => {
                JsonRpcResponse::failure(id, INVALID_PARAMS, format!("Unknown resource: {other}"))
            }
            None => JsonRpcResponse::failure(id, INVALID_PARAMS, "resources/read requires a uri"),
        },
        other => JsonRpcResponse::failure(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
    };
    Some(response)
}

fn initialize_result() -> Value {
    let result = InitializeResult {
        protocol_version: PROTOCOL_VERSION.to_string(),
        capabilities: ServerCapabilities {
            tools: Some(json!({})),
            resources: Some(json!({})),
        },
        server_info: ServerInfo {
            name: "fleethub".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };
    json!(result)
}
