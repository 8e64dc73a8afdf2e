//! Core types and error definitions for the fleethub orchestration hub.
//!
//! This crate provides the foundational types shared across all fleethub crates:
//! the unified error enum, the request/response envelope exchanged with agents,
//! and the tool call abstractions consumed by the tool surface.
//!
//! # Main types
//!
//! - [`FleetError`] — Unified error enum for all hub subsystems.
//! - [`FleetResult`] — Convenience alias for `Result<T, FleetError>`.
//! - [`CallRequest`] — The uniform agent call envelope.
//! - [`HealthReport`] — Payload returned by an agent's `GET /health`.
//! - [`ToolCall`] / [`ToolResult`] — Tool invocation request and result.

/// Agent call envelope types.
pub mod envelope;
/// Error types.
pub mod error;
/// Tool call types.
pub mod tool;

pub use envelope::{CallRequest, HealthReport};
pub use error::{FleetError, FleetResult};
pub use tool::{ToolCall, ToolResult};

use chrono::{DateTime, Utc};

/// Render a timestamp as fractional seconds since the Unix epoch.
///
/// The wire format agents and callers expect for `ts`, `timestamp` and
/// `last_seen` fields.
pub fn epoch_secs(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 1000.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_epoch_secs() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_250).unwrap();
        assert_eq!(epoch_secs(at), 1_700_000_000.25);
    }
}
