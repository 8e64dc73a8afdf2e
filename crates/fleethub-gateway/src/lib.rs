//! HTTP gateway for the fleethub hub.
//!
//! Serves the tool surface over REST (`/tools`) and MCP JSON-RPC (`/mcp`),
//! takes heartbeats and status reports from agents, and exposes the event
//! log at `/health-log`.

/// Request logging middleware.
pub mod middleware;
/// Router and handlers.
pub mod server;

pub use server::{AppState, GatewayServer};
