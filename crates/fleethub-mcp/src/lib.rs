//! Tool surface and agent dispatch for the fleethub hub.
//!
//! # Main types
//!
//! - [`Hub`]: wires registry, dispatcher, repair controller and tools together.
//! - [`AgentDispatcher`]: timeout-bounded HTTP calls to agents; failures become data.
//! - [`ToolRegistry`]: ordered set of [`Tool`]s; invocation never fails.
//! - [`rpc::handle_request`]: MCP JSON-RPC entry point.

/// HTTP dispatch from the hub to agents.
pub mod dispatch;
/// Hub assembly.
pub mod hub;
/// MCP JSON-RPC 2.0 message types.
pub mod protocol;
/// Ordered tool registry.
pub mod registry;
/// MCP request handling.
pub mod rpc;
/// The `Tool` trait and descriptors.
pub mod tool;
/// Hub tool implementations.
pub mod tools;

pub use dispatch::{AgentDispatcher, DispatchError};
pub use hub::{Hub, HEALTH_LOG_URI};
pub use protocol::{JsonRpcRequest, JsonRpcResponse};
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolDescriptor};
