use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{debug, warn};

/// Log every request with its outcome and latency.
///
/// Client and server errors are logged at `warn`, the rest at `debug` so that
/// heartbeat traffic stays quiet at the default level.
pub async fn trace_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if status.is_client_error() || status.is_server_error() {
        warn!(method = %method, path = %path, status = status.as_u16(), elapsed_ms, "Request failed");
    } else {
        debug!(method = %method, path = %path, status = status.as_u16(), elapsed_ms, "Request served");
    }
    response
}
