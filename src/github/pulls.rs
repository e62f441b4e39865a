//! Change-request submission via the GitHub API
//!
//! Turns one proposed file change into a pull request: optionally fork the
//! target repository, branch from the base reference, create or update the
//! file, open the pull request. Record and asset changes go through the same
//! flow against independently configured repositories.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use super::{logo_path, record_path, RepoTarget};
use crate::listing::RecordFile;
use crate::types::{ChangeRef, ContributionMode, IntakeError, Result};

/// Proposed record change
#[derive(Debug, Clone, PartialEq)]
pub struct RecordChange {
    pub mode: ContributionMode,
    pub slug: String,
    pub record: RecordFile,
    /// Blob sha of the existing file; required for Edit, absent for Add
    pub prior_sha: Option<String>,
}

/// Proposed logo asset change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetChange {
    pub slug: String,
    pub content_base64: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// Write access to the change-request collaborator
#[async_trait]
pub trait ChangeSubmitter: Send + Sync {
    async fn submit_record(&self, change: RecordChange) -> Result<ChangeRef>;
    async fn submit_asset(&self, change: AssetChange) -> Result<ChangeRef>;
}

/// Submitter configuration, resolved from the environment at startup
#[derive(Debug, Clone)]
pub struct SubmitterConfig {
    pub api_url: String,
    pub token: String,
    /// Record store (YAML dataset)
    pub records: RepoTarget,
    /// Asset store (logo images)
    pub assets: RepoTarget,
    /// Owner to fork into, when different from the token's user
    pub fork_owner: Option<String>,
    /// Fork the target repository and open cross-repo pull requests
    pub auto_fork: bool,
    pub branch_prefix: String,
}

/// GitHub-backed [`ChangeSubmitter`]
pub struct GithubSubmitter {
    client: reqwest::Client,
    config: SubmitterConfig,
}

#[derive(Debug, Deserialize)]
struct ForkResponse {
    name: String,
    owner: OwnerResponse,
}

#[derive(Debug, Deserialize)]
struct OwnerResponse {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: RefObject,
}

#[derive(Debug, Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct BlobInfo {
    sha: String,
}

/// Branch name for one submission: `{prefix}{slug}-{unix_millis}`
fn branch_name(prefix: &str, slug: &str) -> String {
    format!("{}{}-{}", prefix, slug, chrono::Utc::now().timestamp_millis())
}

impl GithubSubmitter {
    pub fn new(client: reqwest::Client, config: SubmitterConfig) -> Self {
        Self { client, config }
    }

    /// Send one GitHub API request, mapping failures to [`IntakeError::Submission`].
    async fn api<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(&self.config.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "turnstile");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| IntakeError::Submission(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntakeError::Submission(format!(
                "GitHub answered {} for {}: {}",
                status, url, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| IntakeError::Submission(format!("invalid response from {}: {}", url, e)))
    }

    /// The repository the submission branch is pushed to: a fork of the
    /// target when auto-fork is enabled, the target itself otherwise.
    async fn resolve_head_repo(&self, target: &RepoTarget) -> Result<(String, String)> {
        if !self.config.auto_fork {
            return Ok((target.owner.clone(), target.name.clone()));
        }

        let url = format!(
            "{}/repos/{}/{}/forks",
            self.config.api_url, target.owner, target.name
        );
        let body = self
            .config
            .fork_owner
            .as_ref()
            .map(|owner| serde_json::json!({ "organization": owner }));
        let fork: ForkResponse = self.api(Method::POST, &url, Some(body.unwrap_or_else(|| serde_json::json!({})))).await?;

        debug!(fork = %format!("{}/{}", fork.owner.login, fork.name), "Resolved fork");
        Ok((fork.owner.login, fork.name))
    }

    async fn base_sha(&self, target: &RepoTarget) -> Result<String> {
        let url = format!(
            "{}/repos/{}/{}/git/ref/heads/{}",
            self.config.api_url, target.owner, target.name, target.base_branch
        );
        let reference: RefResponse = self.api(Method::GET, &url, None).await?;
        Ok(reference.object.sha)
    }

    async fn create_branch(&self, owner: &str, repo: &str, branch: &str, sha: &str) -> Result<()> {
        let url = format!("{}/repos/{}/{}/git/refs", self.config.api_url, owner, repo);
        let _: serde_json::Value = self
            .api(
                Method::POST,
                &url,
                Some(serde_json::json!({
                    "ref": format!("refs/heads/{}", branch),
                    "sha": sha,
                })),
            )
            .await?;
        Ok(())
    }

    async fn put_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
        message: &str,
        content_base64: &str,
        prior_sha: Option<&str>,
    ) -> Result<()> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_url, owner, repo, path
        );
        let mut body = serde_json::json!({
            "message": message,
            "content": content_base64,
            "branch": branch,
        });
        if let Some(sha) = prior_sha {
            body["sha"] = serde_json::Value::String(sha.to_string());
        }
        let _: serde_json::Value = self.api(Method::PUT, &url, Some(body)).await?;
        Ok(())
    }

    async fn open_pull(
        &self,
        target: &RepoTarget,
        head_owner: &str,
        branch: &str,
        title: &str,
        body_text: &str,
    ) -> Result<String> {
        let url = format!(
            "{}/repos/{}/{}/pulls",
            self.config.api_url, target.owner, target.name
        );
        let head = if head_owner == target.owner {
            branch.to_string()
        } else {
            format!("{}:{}", head_owner, branch)
        };
        let pull: PullResponse = self
            .api(
                Method::POST,
                &url,
                Some(serde_json::json!({
                    "title": title,
                    "head": head,
                    "base": target.base_branch,
                    "body": body_text,
                })),
            )
            .await?;
        Ok(pull.html_url)
    }

    /// Blob sha of `path` on the target's base branch, if the file exists.
    /// Needed so the contents API treats our PUT as an update.
    async fn existing_sha(&self, target: &RepoTarget, path: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.config.api_url, target.owner, target.name, path, target.base_branch
        );
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "turnstile")
            .send()
            .await
            .map_err(|e| IntakeError::Submission(format!("request to {} failed: {}", url, e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntakeError::Submission(format!(
                "GitHub answered {} for {}: {}",
                status, url, body
            )));
        }
        let info: BlobInfo = response
            .json()
            .await
            .map_err(|e| IntakeError::Submission(format!("invalid response from {}: {}", url, e)))?;
        Ok(Some(info.sha))
    }

    /// Shared fork/branch/commit/pull flow for one file change.
    async fn open_change(
        &self,
        target: &RepoTarget,
        slug: &str,
        path: &str,
        message: &str,
        content_base64: &str,
        prior_sha: Option<&str>,
    ) -> Result<ChangeRef> {
        let (head_owner, head_repo) = self.resolve_head_repo(target).await?;
        let base_sha = self.base_sha(target).await?;
        let branch = branch_name(&self.config.branch_prefix, slug);

        self.create_branch(&head_owner, &head_repo, &branch, &base_sha)
            .await?;
        self.put_contents(
            &head_owner,
            &head_repo,
            path,
            &branch,
            message,
            content_base64,
            prior_sha,
        )
        .await?;
        let pull_request_url = self
            .open_pull(target, &head_owner, &branch, message, &format!("{}\n\nSubmitted via turnstile.", message))
            .await?;

        info!(
            pull_request = %pull_request_url,
            branch = %branch,
            path = %path,
            "Opened change request"
        );

        Ok(ChangeRef {
            pull_request_url,
            branch_name: branch,
            file_path: path.to_string(),
        })
    }
}

#[async_trait]
impl ChangeSubmitter for GithubSubmitter {
    async fn submit_record(&self, change: RecordChange) -> Result<ChangeRef> {
        let yaml = serde_yaml::to_string(&change.record)
            .map_err(|e| IntakeError::Internal(format!("failed to serialize record: {}", e)))?;
        let content = general_purpose::STANDARD.encode(yaml.as_bytes());

        let message = match change.mode {
            ContributionMode::Add => format!("Add project {}", change.slug),
            ContributionMode::Edit => format!("Update project {}", change.slug),
        };
        let path = record_path(&change.slug);

        self.open_change(
            &self.config.records,
            &change.slug,
            &path,
            &message,
            &content,
            change.prior_sha.as_deref(),
        )
        .await
    }

    async fn submit_asset(&self, change: AssetChange) -> Result<ChangeRef> {
        let path = logo_path(
            &change.slug,
            change.file_name.as_deref(),
            change.mime_type.as_deref(),
        );
        // Clients send base64 with arbitrary line wrapping; GitHub wants it clean
        let content: String = change
            .content_base64
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        let prior_sha = self.existing_sha(&self.config.assets, &path).await?;
        let message = format!("Add logo for {}", change.slug);

        self.open_change(
            &self.config.assets,
            &change.slug,
            &path,
            &message,
            &content,
            prior_sha.as_deref(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_name_shape() {
        let name = branch_name("submission/", "acme");
        assert!(name.starts_with("submission/acme-"));
        let suffix = name.rsplit('-').next().unwrap();
        assert!(suffix.parse::<i64>().is_ok());
    }

    #[test]
    fn test_pull_response_parse() {
        let pull: PullResponse = serde_json::from_str(
            r#"{"html_url": "https://github.com/o/r/pull/12", "number": 12}"#,
        )
        .unwrap();
        assert_eq!(pull.html_url, "https://github.com/o/r/pull/12");
    }

    #[test]
    fn test_fork_response_parse() {
        let fork: ForkResponse = serde_json::from_str(
            r#"{"name": "registry", "owner": {"login": "bot"}, "fork": true}"#,
        )
        .unwrap();
        assert_eq!(fork.owner.login, "bot");
        assert_eq!(fork.name, "registry");
    }
}
