use async_trait::async_trait;
use fleethub_core::{CallRequest, FleetError, FleetResult, HealthReport};
use fleethub_orchestrator::{AgentEntry, AgentRegistry, HealthProbe};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a call to an agent produced no usable JSON.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Agent '{0}' not found")]
    UnknownAgent(String),

    #[error("Agent '{0}' has no base URL")]
    NoBaseUrl(String),

    #[error("Request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    Connect(String),

    /// Non-2xx reply. `detail` is the agent's error payload, parsed as JSON
    /// when possible.
    #[error("Agent returned HTTP {code}")]
    Status { code: u16, detail: Value },

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),
}

impl DispatchError {
    fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            DispatchError::Timeout(timeout)
        } else {
            DispatchError::Connect(err.to_string())
        }
    }

    /// The `{error, agent}` object handed back to callers in place of a reply.
    pub fn to_value(&self, agent: &str) -> Value {
        let mut value = json!({
            "error": self.to_string(),
            "agent": agent,
        });
        if let DispatchError::Status { code, detail } = self {
            value["status_code"] = json!(code);
            value["detail"] = detail.clone();
        }
        value
    }
}

impl From<DispatchError> for FleetError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::UnknownAgent(name) => FleetError::AgentNotFound(name),
            other => FleetError::Transport(other.to_string()),
        }
    }
}

/// HTTP caller from the hub to individual agents.
///
/// Every call is bounded by a timeout. [`AgentDispatcher::call_agent`] never
/// fails: transport problems come back as `{error, agent}` data so one dead
/// agent cannot break an aggregate operation.
pub struct AgentDispatcher {
    registry: Arc<AgentRegistry>,
    client: reqwest::Client,
    timeout: Duration,
}

impl AgentDispatcher {
    pub fn new(registry: Arc<AgentRegistry>, timeout: Duration) -> FleetResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FleetError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            registry,
            client,
            timeout,
        })
    }

    /// Call `endpoint` on agent `name`: GET without a body, POST with one.
    pub async fn try_call_agent(
        &self,
        name: &str,
        endpoint: &str,
        body: Option<&Value>,
        timeout: Option<Duration>,
    ) -> Result<Value, DispatchError> {
        let entry = self
            .registry
            .get(name)
            .await
            .map_err(|_| DispatchError::UnknownAgent(name.to_string()))?;
        let base_url = entry
            .base_url
            .ok_or_else(|| DispatchError::NoBaseUrl(name.to_string()))?;
        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        let timeout = timeout.unwrap_or(self.timeout);

        debug!(agent = %name, url = %url, post = body.is_some(), "Dispatching agent call");
        let request = match body {
            Some(body) => self.client.post(&url).json(body),
            None => self.client.get(&url),
        };
        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| DispatchError::from_reqwest(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str(&text).unwrap_or(Value::String(text));
            return Err(DispatchError::Status {
                code: status.as_u16(),
                detail,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                DispatchError::Timeout(timeout)
            } else {
                DispatchError::InvalidBody(e.to_string())
            }
        })
    }

    /// Like [`try_call_agent`](Self::try_call_agent), with failures flattened
    /// into an `{error, agent}` object.
    pub async fn call_agent(
        &self,
        name: &str,
        endpoint: &str,
        body: Option<&Value>,
        timeout: Option<Duration>,
    ) -> Value {
        match self.try_call_agent(name, endpoint, body, timeout).await {
            Ok(value) => value,
            Err(e) => {
                warn!(agent = %name, endpoint = %endpoint, error = %e, "Agent call failed");
                e.to_value(name)
            }
        }
    }

    /// `POST /call` with the given envelope.
    pub async fn invoke(&self, name: &str, request: &CallRequest) -> Value {
        self.call_agent(name, "call", Some(&request.to_value()), None)
            .await
    }

    /// `GET /health` on one agent.
    pub async fn health(&self, name: &str) -> Value {
        self.call_agent(name, "health", None, None).await
    }
}

#[async_trait]
impl HealthProbe for AgentDispatcher {
    async fn probe(&self, agent: &AgentEntry) -> bool {
        match self.try_call_agent(&agent.name, "health", None, None).await {
            Ok(body) => serde_json::from_value::<HealthReport>(body)
                .map(|report| report.is_healthy())
                .unwrap_or(false),
            Err(_) => false,
        }
    }
}
