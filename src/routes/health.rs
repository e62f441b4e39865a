//! Health and version endpoints
//!
//! /health and /healthz are liveness probes: 200 whenever the service is
//! running, including when the GitHub credential is missing (that surfaces
//! per request as a configuration error instead).

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use super::json_response;
use crate::server::AppState;

#[derive(Serialize)]
struct HealthResponse {
    healthy: bool,
    version: &'static str,
    /// Seconds since startup
    uptime: u64,
    /// Whether a GitHub credential is configured (submissions will 500 otherwise)
    #[serde(rename = "githubConfigured")]
    github_configured: bool,
    /// Clients currently tracked by the rate limiter
    #[serde(rename = "trackedClients")]
    tracked_clients: usize,
    timestamp: String,
}

/// Liveness probe
pub fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let body = HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        github_configured: state.service.is_some(),
        tracked_clients: state.limiter.tracked_clients(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    json_response(StatusCode::OK, serde_json::to_value(body).unwrap_or_default())
}

/// Version info for deployment verification
pub fn version_info() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }),
    )
}
