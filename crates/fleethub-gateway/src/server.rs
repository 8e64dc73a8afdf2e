use crate::middleware::trace_requests;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    middleware as axum_mw,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use fleethub_core::{FleetError, ToolResult};
use fleethub_mcp::protocol::{JsonRpcRequest, JsonRpcResponse, PARSE_ERROR};
use fleethub_mcp::{rpc, Hub};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Shared application state.
pub struct AppState {
    pub hub: Arc<Hub>,
}

/// The hub's HTTP front door.
pub struct GatewayServer;

impl GatewayServer {
    pub fn build(hub: Arc<Hub>) -> Router {
        let state = Arc::new(AppState { hub });

        Router::new()
            .route("/health", get(health_handler))
            .route("/tools", get(list_tools_handler))
            .route("/tools/{name}", post(call_tool_handler))
            .route("/mcp", post(mcp_handler))
            .route("/health-log", get(health_log_handler))
            .route("/heartbeat", post(heartbeat_handler))
            .route("/report", post(report_handler))
            .route("/status", get(status_handler))
            .layer(axum_mw::from_fn(trace_requests))
            .with_state(state)
    }

    /// Serve `hub` on `listener` until `shutdown` resolves.
    pub async fn serve<F>(listener: TcpListener, hub: Arc<Hub>, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        info!(addr = %addr, "Gateway listening");
        axum::serve(listener, Self::build(hub))
            .with_graceful_shutdown(shutdown)
            .await
    }
}

/// HTTP status for a failed tool call, keyed by its error code.
fn error_status(code: &str) -> StatusCode {
    match code {
        "validation_error" => StatusCode::BAD_REQUEST,
        "agent_not_found" | "unknown_tool" => StatusCode::NOT_FOUND,
        "no_run_command" => StatusCode::CONFLICT,
        "transport_error" => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn tool_response(result: ToolResult) -> Response {
    if result.is_error {
        let status = error_status(result.content["error"].as_str().unwrap_or_default());
        (status, Json(result.content)).into_response()
    } else {
        Json(result.content).into_response()
    }
}

/// Parse a request body as JSON. An empty body means no arguments.
fn parse_body(body: &Bytes) -> Result<Value, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    serde_json::from_slice(body).map_err(|e| {
        let err = FleetError::Validation(format!("request body is not valid JSON: {e}"));
        (StatusCode::BAD_REQUEST, Json(err.to_value())).into_response()
    })
}

async fn run_tool(state: &AppState, name: &str, body: &Bytes) -> Response {
    match parse_body(body) {
        Ok(arguments) => tool_response(state.hub.call_tool(name, arguments).await),
        Err(rejection) => rejection,
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({"status": "ok", "service": "fleethub"}))
}

async fn list_tools_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "tools": state.hub.tools().descriptors() }))
}

async fn call_tool_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    run_tool(&state, &name, &body).await
}

async fn heartbeat_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    run_tool(&state, "report_heartbeat", &body).await
}

async fn report_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    run_tool(&state, "report_status", &body).await
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Response {
    tool_response(state.hub.call_tool("fleet_status", json!({})).await)
}

async fn health_log_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.hub.health_log(),
    )
}

async fn mcp_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            let resp = JsonRpcResponse::failure(Value::Null, PARSE_ERROR, format!("Parse error: {e}"));
            return Json(resp).into_response();
        }
    };
    match rpc::handle_request(&state.hub, request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
