#![allow(clippy::unwrap_used, clippy::expect_used)]

use fleethub_core::*;
use serde_json::json;

// ---------------------------------------------------------------------------
// 1. ToolCall -> ToolResult flow (success and error variants)
// ---------------------------------------------------------------------------

#[test]
fn tool_call_to_tool_result_flow() {
    let call = ToolCall::new(
        "call_abc123",
        "call_agent_tool",
        json!({"agent": "data-agent", "query": "list_users"}),
    );

    let ok = ToolResult::success(&call.id, json!({"status": "ok", "agent": "data-agent"}));
    assert_eq!(ok.call_id, "call_abc123");
    assert!(!ok.is_error);

    let err = ToolResult::error(&call.id, &FleetError::AgentNotFound("data-agent".into()));
    assert!(err.is_error);
    assert_eq!(err.content["error"], "agent_not_found");
    assert_eq!(err.content["agent"], "data-agent");

    let json = serde_json::to_string(&call).unwrap();
    let back: ToolCall = serde_json::from_str(&json).unwrap();
    assert_eq!(back.name, "call_agent_tool");
    assert_eq!(back.arguments["query"], "list_users");
}

// ---------------------------------------------------------------------------
// 2. Envelope shapes sent to agents
// ---------------------------------------------------------------------------

#[test]
fn call_request_shapes_match_agent_contract() {
    let query = CallRequest::query("search", Some(&json!({"term": "ai", "role": "ml"})));
    assert_eq!(
        query.to_value(),
        json!({"input": {"query": "search", "term": "ai", "role": "ml"}})
    );

    let text = CallRequest::text("Artificial Intelligence is transforming industries.");
    assert_eq!(
        text.to_value(),
        json!({"input": {"text": "Artificial Intelligence is transforming industries."}})
    );
}

// ---------------------------------------------------------------------------
// 3. Every error variant has a distinct code
// ---------------------------------------------------------------------------

#[test]
fn error_codes_are_distinct() {
    let errors = vec![
        FleetError::Validation("x".into()),
        FleetError::AgentNotFound("x".into()),
        FleetError::UnknownTool("x".into()),
        FleetError::NoRunCommand("x".into()),
        FleetError::Transport("x".into()),
        FleetError::Spawn {
            agent: "x".into(),
            message: "y".into(),
        },
        FleetError::Config("x".into()),
        FleetError::Io(std::io::Error::other("x")),
    ];
    let mut codes: Vec<&str> = errors.iter().map(FleetError::code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
}
