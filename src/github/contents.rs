//! Upstream record fetch via the GitHub contents API
//!
//! Read-only: resolves a slug to its storage path, requests the file as of
//! the configured base branch and decodes it. No merging happens here.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use tracing::debug;

use super::{record_path, RepoTarget};
use crate::listing::RecordFile;
use crate::types::{IntakeError, Result};

/// A canonical record as fetched from the store, plus the metadata the
/// submitter needs to update the same file.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRecord {
    pub record: RecordFile,
    /// Blob sha of the fetched file, required by the contents API on update
    pub sha: String,
    pub path: String,
}

/// Read access to the canonical record store
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_record(&self, slug: &str) -> Result<FetchedRecord>;
}

/// Shape of a GitHub contents API response we care about
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    sha: String,
}

/// GitHub-backed [`ContentFetcher`]
pub struct GithubContentFetcher {
    client: reqwest::Client,
    api_url: String,
    token: String,
    target: RepoTarget,
}

impl GithubContentFetcher {
    pub fn new(client: reqwest::Client, api_url: String, token: String, target: RepoTarget) -> Self {
        Self {
            client,
            api_url,
            token,
            target,
        }
    }
}

#[async_trait]
impl ContentFetcher for GithubContentFetcher {
    async fn fetch_record(&self, slug: &str) -> Result<FetchedRecord> {
        let path = record_path(slug);
        let url = format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.api_url, self.target.owner, self.target.name, path, self.target.base_branch
        );

        debug!(url = %url, slug = %slug, "Fetching canonical record");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "turnstile")
            .send()
            .await
            .map_err(|e| IntakeError::Fetch(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntakeError::Fetch(format!(
                "GitHub answered {} for {}: {}",
                status, path, body
            )));
        }

        let contents: ContentsResponse = response
            .json()
            .await
            .map_err(|e| IntakeError::Fetch(format!("invalid contents payload for {}: {}", path, e)))?;

        decode_contents(contents, path)
    }
}

/// Validate and decode a contents API payload into a [`FetchedRecord`].
fn decode_contents(contents: ContentsResponse, path: String) -> Result<FetchedRecord> {
    match contents.encoding.as_deref() {
        Some("base64") => {}
        other => {
            return Err(IntakeError::Fetch(format!(
                "unexpected content encoding {:?} for {}",
                other, path
            )));
        }
    }
    let encoded = contents.content.ok_or_else(|| {
        IntakeError::Fetch(format!("response for {} omitted file content", path))
    })?;

    // The API wraps base64 at 60 columns; strip whitespace before decoding
    let stripped: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let raw = general_purpose::STANDARD
        .decode(stripped.as_bytes())
        .map_err(|e| IntakeError::Fetch(format!("base64 decode failed for {}: {}", path, e)))?;

    let record: RecordFile = serde_yaml::from_slice(&raw)
        .map_err(|e| IntakeError::Fetch(format!("YAML decode failed for {}: {}", path, e)))?;

    Ok(FetchedRecord {
        record,
        sha: contents.sha,
        path,
    })
}
