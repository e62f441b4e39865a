//! Admission control
//!
//! Fixed-window per-client request quota. Advisory abuse mitigation, not a
//! security boundary: state lives in memory and is lost on restart.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default request quota per window
pub const DEFAULT_MAX_REQUESTS: u32 = 5;
/// Default window length
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Requests admitted per client per window
    pub max_requests: u32,
    /// Fixed window length
    pub window: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Outcome of one admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub allowed: bool,
    /// Seconds until the client's window resets; zero when allowed
    pub retry_after_secs: u64,
}

impl Admission {
    fn allowed() -> Self {
        Self { allowed: true, retry_after_secs: 0 }
    }

    fn denied(retry_after_secs: u64) -> Self {
        Self { allowed: false, retry_after_secs }
    }
}

/// Per-client request counter for the current window
#[derive(Debug, Clone)]
struct ClientBucket {
    count: u32,
    window_reset_at: Instant,
}

/// Fixed-window rate limiter keyed by client network address.
///
/// Buckets are created lazily and replaced (not incremented) once their
/// window has elapsed. The per-key read-modify-write happens under the
/// DashMap entry lock, so two concurrent requests from the same client
/// cannot both observe the last free slot.
pub struct RateLimiter {
    buckets: DashMap<String, ClientBucket>,
    config: RateLimiterConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(RateLimiterConfig::default())
    }

    /// Check whether a request from `client_key` is admitted.
    pub fn check(&self, client_key: &str) -> Admission {
        let now = Instant::now();
        let mut bucket = self
            .buckets
            .entry(client_key.to_string())
            .or_insert_with(|| ClientBucket {
                count: 0,
                window_reset_at: now + self.config.window,
            });

        if now >= bucket.window_reset_at {
            // Window elapsed: replace the bucket rather than increment
            bucket.count = 1;
            bucket.window_reset_at = now + self.config.window;
            return Admission::allowed();
        }

        if bucket.count >= self.config.max_requests {
            let remaining = bucket.window_reset_at.saturating_duration_since(now);
            let retry_after_secs = ((remaining.as_millis() as u64) + 999) / 1000;
            debug!(client = %client_key, retry_after_secs, "Request denied by rate limiter");
            return Admission::denied(retry_after_secs.max(1));
        }

        bucket.count += 1;
        Admission::allowed()
    }

    /// Remove buckets whose window has elapsed, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        // Counted inside the closure: other requests may insert fresh
        // buckets while the retain is running, so a before/after length
        // diff is not reliable.
        let mut removed = 0;
        self.buckets.retain(|_, bucket| {
            let keep = bucket.window_reset_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Number of tracked clients
    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }
}

/// Spawn a background task that periodically sweeps expired buckets, keeping
/// memory bounded without contending with the admission hot path.
pub fn spawn_sweep_task(limiter: Arc<RateLimiter>, interval: Duration) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let removed = limiter.sweep();
            if removed > 0 {
                debug!("Rate limiter sweep: removed {} expired buckets", removed);
            }
        }
    });
    info!("Rate limiter sweep task started");
}
