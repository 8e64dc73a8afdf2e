//! Integration tests for the hub tool surface.
//!
//! Agents are stood in for by wiremock servers speaking the agent HTTP
//! contract (`GET /health`, `POST /call`).

#![allow(clippy::unwrap_used, clippy::expect_used)]

use fleethub_mcp::Hub;
use fleethub_orchestrator::{AgentConfig, AgentStatus, HubSettings};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn seeded_users() -> Value {
    json!([
        {"id": 1, "name": "Harshit", "role": "student", "email": "harshit@example.com"},
        {"id": 2, "name": "Samrat", "role": "webdev", "email": "samrat@example.com"},
        {"id": 3, "name": "Aisha", "role": "ml", "email": "aisha@example.com"}
    ])
}

/// A data agent that answers `list_users` and `/health`.
async fn data_agent() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/call"))
        .and(body_json(json!({"input": {"query": "list_users"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "result": {"data": seeded_users()},
            "meta": {"agent": "DataAgent"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "agent": "DataAgent",
            "ts": 1_700_000_000.0,
            "count": 3
        })))
        .mount(&server)
        .await;
    server
}

async fn hub_with(agents: Vec<AgentConfig>) -> Hub {
    let settings = HubSettings {
        call_timeout_secs: 2,
        ..HubSettings::default()
    };
    let hub = Hub::new(settings).unwrap();
    hub.register_agents(&agents).await;
    hub
}

// ---------------------------------------------------------------------------
// call_agent_tool
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_call_agent_tool_returns_seeded_records() {
    let agent = data_agent().await;
    let hub = hub_with(vec![AgentConfig::new("data-agent", agent.uri())]).await;

    let result = hub
        .call_tool(
            "call_agent_tool",
            json!({"agent": "data-agent", "query": "list_users"}),
        )
        .await;
    assert!(!result.is_error);
    assert_eq!(result.content["status"], "ok");
    assert_eq!(result.content["agent"], "data-agent");

    let names: Vec<&str> = result.content["result"]["result"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Harshit", "Samrat", "Aisha"]);
}

#[tokio::test]
async fn test_call_agent_tool_merges_input() {
    let agent = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/call"))
        .and(body_json(json!({"input": {"query": "get_user", "id": 2}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "result": {"data": {"id": 2, "name": "Samrat"}}
        })))
        .expect(1)
        .mount(&agent)
        .await;
    let hub = hub_with(vec![AgentConfig::new("data-agent", agent.uri())]).await;

    let result = hub
        .call_tool(
            "call_agent_tool",
            json!({"agent": "data-agent", "query": "get_user", "input": {"id": 2}}),
        )
        .await;
    assert_eq!(result.content["result"]["result"]["data"]["name"], "Samrat");
}

#[tokio::test]
async fn test_call_agent_tool_validation() {
    let hub = hub_with(vec![]).await;
    for args in [json!({}), json!({"agent": "data-agent"}), json!("list_users")] {
        let result = hub.call_tool("call_agent_tool", args).await;
        assert!(result.is_error);
        assert_eq!(result.content["error"], "validation_error");
    }
}

#[tokio::test]
async fn test_call_agent_tool_unknown_agent_is_data() {
    let hub = hub_with(vec![]).await;
    let result = hub
        .call_tool("call_agent_tool", json!({"agent": "ghost", "query": "x"}))
        .await;
    assert!(!result.is_error);
    assert_eq!(result.content["result"]["error"], "Agent 'ghost' not found");
}

// ---------------------------------------------------------------------------
// summarize_with_gemini
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_summarize_forwards_exact_body() {
    let summarizer = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/call"))
        .and(body_json(json!({"input": {"text": "hello"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "result": {"summary": "hi"}
        })))
        .expect(2)
        .mount(&summarizer)
        .await;
    let hub = hub_with(vec![AgentConfig::new("summarizer-gemini", summarizer.uri())]).await;

    let result = hub
        .call_tool("summarize_with_gemini", json!({"text": "hello"}))
        .await;
    assert_eq!(result.content["status"], "ok");
    assert_eq!(result.content["summary"]["result"]["summary"], "hi");

    let nested = hub
        .call_tool("summarize_with_gemini", json!({"input": {"text": "hello"}}))
        .await;
    assert!(!nested.is_error);
}

#[tokio::test]
async fn test_summarize_requires_text() {
    let hub = hub_with(vec![]).await;
    let result = hub.call_tool("summarize_with_gemini", json!({})).await;
    assert!(result.is_error);
    assert_eq!(result.content["error"], "validation_error");
}

#[tokio::test]
async fn test_summarizer_agent_is_configurable() {
    let summarizer = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/call"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&summarizer)
        .await;
    let settings = HubSettings {
        summarizer_agent: "local-summarizer".into(),
        ..HubSettings::default()
    };
    let hub = Hub::new(settings).unwrap();
    hub.register_agents(&[AgentConfig::new("local-summarizer", summarizer.uri())])
        .await;

    let result = hub
        .call_tool("summarize_with_gemini", json!({"body": "long text"}))
        .await;
    assert_eq!(result.content["summary"]["status"], "ok");
}

// ---------------------------------------------------------------------------
// health_all
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_all_with_unreachable_agents() {
    let agent = data_agent().await;
    let slow = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "ok"}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&slow)
        .await;

    let hub = hub_with(vec![
        AgentConfig::new("data-agent", agent.uri()),
        AgentConfig::new("math-agent", "http://127.0.0.1:9"),
        AgentConfig::new("slow-agent", slow.uri()),
        AgentConfig {
            name: "local-agent".into(),
            base_url: None,
            run_command: None,
        },
    ])
    .await;

    let started = std::time::Instant::now();
    let result = hub.call_tool("health_all", json!({})).await;
    // Calls run concurrently, each bounded by the 2s call timeout.
    assert!(started.elapsed() < Duration::from_secs(6));

    assert!(!result.is_error);
    assert_eq!(result.content["status"], "ok");
    let results = result.content["results"].as_object().unwrap();
    assert_eq!(results.len(), 4);
    assert_eq!(results["data-agent"]["count"], 3);
    for name in ["math-agent", "slow-agent", "local-agent"] {
        assert!(results[name].get("error").is_some(), "{name} should carry an error");
        assert_eq!(results[name]["agent"], name);
    }
}

// ---------------------------------------------------------------------------
// Registry tools
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_list_and_status_tools() {
    let hub = hub_with(fleethub_orchestrator::default_agents()).await;

    let listed = hub.call_tool("list_agents", json!({})).await;
    assert_eq!(listed.content["agents"].as_object().unwrap().len(), 5);
    assert_eq!(
        listed.content["agents"]["finance-agent"]["url"],
        "http://127.0.0.1:8001"
    );

    let missing = hub
        .call_tool("get_agent_status", json!({"name": "ghost"}))
        .await;
    assert!(missing.is_error);
    assert_eq!(missing.content["error"], "agent_not_found");

    hub.call_tool("report_heartbeat", json!({"name": "math-agent"}))
        .await;
    let status = hub
        .call_tool("get_agent_status", json!({"name": "math-agent"}))
        .await;
    assert_eq!(status.content["status"], "healthy");

    let fleet = hub.call_tool("fleet_status", json!({})).await;
    assert_eq!(fleet.content["math-agent"], "healthy");
    assert_eq!(fleet.content["data-agent"], "unknown");
}

#[tokio::test]
async fn test_repair_tool_through_hub() {
    let hub = hub_with(vec![AgentConfig::new("math-agent", "http://127.0.0.1:8003")
        .with_run_command("/nonexistent/fleethub-math-agent")])
    .await;

    let result = hub.call_tool("repair_agent", json!({"name": "math-agent"})).await;
    assert!(!result.is_error);
    assert_eq!(result.content["ok"], false);
    assert_eq!(
        hub.registry().get("math-agent").await.unwrap().status,
        AgentStatus::Failed
    );
    assert!(hub.health_log().contains("Restart of math-agent failed"));

    let missing = hub.call_tool("repair_agent", json!({"name": "ghost"})).await;
    assert_eq!(missing.content["error"], "agent_not_found");
}

#[tokio::test]
async fn test_unknown_tool() {
    let hub = hub_with(vec![]).await;
    let result = hub.call_tool("reboot_everything", json!({})).await;
    assert!(result.is_error);
    assert_eq!(result.content["error"], "unknown_tool");
}
