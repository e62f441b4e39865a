//! Configuration for Turnstile
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::admission::RateLimiterConfig;
use crate::github::{RepoTarget, DEFAULT_API_URL};

/// Turnstile - project-listing intake gateway
#[derive(Parser, Debug, Clone)]
#[command(name = "turnstile")]
#[command(about = "Intake gateway that turns project-listing submissions into pull requests")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// GitHub API endpoint (override for GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub github_api_url: String,

    /// GitHub token used for fetching records and opening pull requests.
    /// Required for submissions; requests fail with a configuration error
    /// when absent.
    #[arg(long, env = "GITHUB_TOKEN")]
    pub github_token: Option<String>,

    /// Owner of the record-store (YAML dataset) repository
    #[arg(long, env = "RECORDS_REPO_OWNER", default_value = "project-registry")]
    pub records_repo_owner: String,

    /// Name of the record-store repository
    #[arg(long, env = "RECORDS_REPO_NAME", default_value = "registry")]
    pub records_repo_name: String,

    /// Base branch of the record-store repository
    #[arg(long, env = "RECORDS_REPO_BRANCH", default_value = "main")]
    pub records_repo_branch: String,

    /// Owner of the asset-store (logo) repository
    #[arg(long, env = "ASSETS_REPO_OWNER", default_value = "project-registry")]
    pub assets_repo_owner: String,

    /// Name of the asset-store repository
    #[arg(long, env = "ASSETS_REPO_NAME", default_value = "registry-logos")]
    pub assets_repo_name: String,

    /// Base branch of the asset-store repository
    #[arg(long, env = "ASSETS_REPO_BRANCH", default_value = "main")]
    pub assets_repo_branch: String,

    /// Owner (organization) to fork into when auto-fork is enabled
    #[arg(long, env = "FORK_OWNER")]
    pub fork_owner: Option<String>,

    /// Fork the target repositories and open cross-repo pull requests.
    /// Accepts permissive truthy/falsy forms (1/0, yes/no, on/off).
    #[arg(long, env = "AUTO_FORK", default_value = "true", value_parser = parse_permissive_bool)]
    pub auto_fork: bool,

    /// Prefix for submission branch names
    #[arg(long, env = "BRANCH_PREFIX", default_value = "submission/")]
    pub branch_prefix: String,

    /// Timeout for outbound GitHub calls in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Requests admitted per client per rate-limit window
    #[arg(long, env = "RATE_LIMIT_MAX_REQUESTS", default_value = "5")]
    pub rate_limit_max_requests: u32,

    /// Rate-limit window in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS", default_value = "3600")]
    pub rate_limit_window_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Parse permissive boolean forms from the environment
fn parse_permissive_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got {:?}", other)),
    }
}

impl Args {
    pub fn records_target(&self) -> RepoTarget {
        RepoTarget {
            owner: self.records_repo_owner.clone(),
            name: self.records_repo_name.clone(),
            base_branch: self.records_repo_branch.clone(),
        }
    }

    pub fn assets_target(&self) -> RepoTarget {
        RepoTarget {
            owner: self.assets_repo_owner.clone(),
            name: self.assets_repo_name.clone(),
            base_branch: self.assets_repo_branch.clone(),
        }
    }

    pub fn rate_limiter_config(&self) -> RateLimiterConfig {
        RateLimiterConfig {
            max_requests: self.rate_limit_max_requests,
            window: Duration::from_secs(self.rate_limit_window_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.rate_limit_max_requests == 0 {
            return Err("RATE_LIMIT_MAX_REQUESTS must be at least 1".to_string());
        }
        if self.rate_limit_window_secs == 0 {
            return Err("RATE_LIMIT_WINDOW_SECS must be at least 1".to_string());
        }
        if self.branch_prefix.chars().any(|c| c.is_whitespace()) {
            return Err("BRANCH_PREFIX must not contain whitespace".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissive_bool_parsing() {
        for raw in ["1", "true", "TRUE", "yes", "Y", "on"] {
            assert_eq!(parse_permissive_bool(raw), Ok(true), "{}", raw);
        }
        for raw in ["0", "false", "No", "off", " f "] {
            assert_eq!(parse_permissive_bool(raw), Ok(false), "{}", raw);
        }
        assert!(parse_permissive_bool("maybe").is_err());
    }
}
