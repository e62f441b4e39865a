//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling; one spawned task per
//! connection, match-based routing.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::admission::{spawn_sweep_task, RateLimiter};
use crate::config::Args;
use crate::github::{GithubContentFetcher, GithubSubmitter, SubmitterConfig};
use crate::orchestrator::SubmitService;
use crate::routes;
use crate::types::IntakeError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Per-client admission control, the only cross-request mutable state
    pub limiter: Arc<RateLimiter>,
    /// Submission pipeline; absent when no GitHub credential is configured,
    /// in which case submissions fail with a configuration error
    pub service: Option<Arc<SubmitService>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args) -> Self {
        let limiter = Arc::new(RateLimiter::new(args.rate_limiter_config()));

        let service = args.github_token.as_ref().map(|token| {
            let client = reqwest::Client::builder()
                .timeout(args.request_timeout())
                .build()
                .expect("Failed to create HTTP client");

            let fetcher = Arc::new(GithubContentFetcher::new(
                client.clone(),
                args.github_api_url.clone(),
                token.clone(),
                args.records_target(),
            ));
            let submitter = Arc::new(GithubSubmitter::new(
                client,
                SubmitterConfig {
                    api_url: args.github_api_url.clone(),
                    token: token.clone(),
                    records: args.records_target(),
                    assets: args.assets_target(),
                    fork_owner: args.fork_owner.clone(),
                    auto_fork: args.auto_fork,
                    branch_prefix: args.branch_prefix.clone(),
                },
            ));
            Arc::new(SubmitService::new(fetcher, submitter))
        });

        Self {
            args,
            limiter,
            service,
            started_at: Instant::now(),
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), IntakeError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Turnstile listening on {}", state.args.listen);
    if state.service.is_none() {
        warn!("GITHUB_TOKEN not configured - submissions will fail until it is set");
    }

    // Keep the bucket map bounded without touching the admission hot path
    spawn_sweep_task(Arc::clone(&state.limiter), Duration::from_secs(60));

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let response = match (method, path.as_str()) {
        // Liveness probe
        (Method::GET, "/health") | (Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(&state))
        }

        // Version info for deployment verification
        (Method::GET, "/version") => routes::version_info(),

        // CORS preflight
        (Method::OPTIONS, _) => preflight_response(),

        // Project submission
        (Method::POST, "/api/v1/projects") => {
            routes::handle_submit(req, Arc::clone(&state), addr).await
        }

        // Not found
        _ => not_found_response(&path),
    };

    Ok(response)
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Headers", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Not found response
fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": "Not Found",
        "path": path,
        "hint": "POST submissions to /api/v1/projects"
    });

    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}
