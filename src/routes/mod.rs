//! HTTP routes for Turnstile

pub mod health;
pub mod projects;

pub use health::{health_check, version_info};
pub use projects::handle_submit;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};

use crate::types::IntakeError;

/// JSON response with CORS headers
pub fn json_response(status: StatusCode, body: serde_json::Value) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}

/// Map an [`IntakeError`] to its HTTP response.
///
/// Rate-limit denials carry a `Retry-After` header; a partial success
/// (record pull request created, logo failed) carries the record reference
/// alongside the error so callers can recover it.
pub fn error_response(err: IntakeError) -> Response<Full<Bytes>> {
    let status = err.status_code();
    match err {
        IntakeError::RateLimited { retry_after_secs } => Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .header("Retry-After", retry_after_secs.to_string())
            .body(Full::new(Bytes::from(
                serde_json::json!({ "error": "Rate limit exceeded" }).to_string(),
            )))
            .unwrap(),
        IntakeError::AssetSubmission { ref record, ref message } => json_response(
            status,
            serde_json::json!({
                "error": format!("Logo submission failed: {}", message),
                "yamlPullRequestUrl": record.pull_request_url,
                "yamlBranchName": record.branch_name,
                "yamlFilePath": record.file_path,
            }),
        ),
        other => json_response(status, serde_json::json!({ "error": other.to_string() })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChangeRef;

    #[test]
    fn test_rate_limited_response_has_retry_after() {
        let resp = error_response(IntakeError::RateLimited { retry_after_secs: 42 });
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(resp.headers().get("Retry-After").unwrap(), "42");
    }

    #[test]
    fn test_partial_success_response_carries_record_ref() {
        let resp = error_response(IntakeError::AssetSubmission {
            record: ChangeRef {
                pull_request_url: "https://github.com/o/r/pull/9".into(),
                branch_name: "submission/acme-9".into(),
                file_path: "data/projects/a/acme.yaml".into(),
            },
            message: "boom".into(),
        });
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let resp = error_response(IntakeError::Validation("missing".into()));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
