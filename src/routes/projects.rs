//! Project submission route
//!
//! `POST /api/v1/projects` - the single intake endpoint. Admission control
//! gates every request before the body is even read; the orchestrator does
//! the rest.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{HeaderMap, Request, Response, StatusCode};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{error_response, json_response};
use crate::listing::SubmissionBody;
use crate::orchestrator::SubmissionOutcome;
use crate::server::AppState;
use crate::types::IntakeError;

/// Rate-limit key for one request: first hop of X-Forwarded-For when the
/// service sits behind a proxy, the socket peer address otherwise.
pub fn client_key(headers: &HeaderMap, addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| addr.ip().to_string())
}

/// Success body, field names fixed by the public API contract
fn outcome_body(outcome: &SubmissionOutcome) -> serde_json::Value {
    serde_json::json!({
        "yamlPullRequestUrl": outcome.record.pull_request_url,
        "logoPullRequestUrl": outcome.logo.as_ref().map(|l| l.pull_request_url.clone()),
        "yamlFilePath": outcome.record.file_path,
        "logoFilePath": outcome.logo.as_ref().map(|l| l.file_path.clone()),
        "yamlBranchName": outcome.record.branch_name,
        "logoBranchName": outcome.logo.as_ref().map(|l| l.branch_name.clone()),
    })
}

/// Handle a project submission
pub async fn handle_submit(
    req: Request<Incoming>,
    state: Arc<AppState>,
    addr: SocketAddr,
) -> Response<Full<Bytes>> {
    let key = client_key(req.headers(), addr);
    let admission = state.limiter.check(&key);
    if !admission.allowed {
        warn!(client = %key, "Submission denied by rate limiter");
        return error_response(IntakeError::RateLimited {
            retry_after_secs: admission.retry_after_secs,
        });
    }

    let body = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(error = %e, "Failed to read submission body");
            return error_response(IntakeError::Internal(format!(
                "Failed to read request body: {}",
                e
            )));
        }
    };

    let submission: SubmissionBody = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(e) => return error_response(IntakeError::from(e)),
    };

    let service = match &state.service {
        Some(service) => Arc::clone(service),
        None => {
            return error_response(IntakeError::Config(
                "GITHUB_TOKEN is not configured".to_string(),
            ));
        }
    };

    debug!(client = %key, "Processing submission");
    match service.handle(submission).await {
        Ok(outcome) => json_response(StatusCode::OK, outcome_body(&outcome)),
        Err(e) => {
            warn!(client = %key, error = %e, "Submission failed");
            error_response(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChangeRef;

    fn addr() -> SocketAddr {
        "10.0.0.9:55555".parse().unwrap()
    }

    #[test]
    fn test_client_key_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        assert_eq!(client_key(&headers, addr()), "203.0.113.7");
    }

    #[test]
    fn test_client_key_falls_back_to_peer_address() {
        assert_eq!(client_key(&HeaderMap::new(), addr()), "10.0.0.9");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "   ".parse().unwrap());
        assert_eq!(client_key(&headers, addr()), "10.0.0.9");
    }

    #[test]
    fn test_outcome_body_with_and_without_logo() {
        let record = ChangeRef {
            pull_request_url: "https://github.com/o/r/pull/1".into(),
            branch_name: "submission/acme-1".into(),
            file_path: "data/projects/a/acme.yaml".into(),
        };

        let body = outcome_body(&SubmissionOutcome {
            record: record.clone(),
            logo: None,
        });
        assert_eq!(body["yamlPullRequestUrl"], "https://github.com/o/r/pull/1");
        assert_eq!(body["logoPullRequestUrl"], serde_json::Value::Null);
        assert_eq!(body["logoFilePath"], serde_json::Value::Null);
        assert_eq!(body["logoBranchName"], serde_json::Value::Null);

        let body = outcome_body(&SubmissionOutcome {
            record,
            logo: Some(ChangeRef {
                pull_request_url: "https://github.com/o/l/pull/2".into(),
                branch_name: "submission/acme-2".into(),
                file_path: "logos/acme.png".into(),
            }),
        });
        assert_eq!(body["logoPullRequestUrl"], "https://github.com/o/l/pull/2");
        assert_eq!(body["logoFilePath"], "logos/acme.png");
    }
}
