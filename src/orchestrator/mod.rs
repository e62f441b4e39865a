//! Submission orchestration
//!
//! Sequences one intake request end to end: normalize the draft, fetch and
//! reconcile the upstream record in edit mode, submit the record change,
//! then independently submit the logo asset. Any failure before dispatch
//! aborts with no external side effect; a logo failure after the record
//! pull request exists is reported with the record reference attached.

use std::sync::Arc;
use tracing::{debug, info};

use crate::github::{AssetChange, ChangeSubmitter, ContentFetcher, RecordChange};
use crate::listing::{normalize, reconcile, SubmissionBody};
use crate::types::{ChangeRef, ContributionMode, IntakeError, Result};

/// Outcome of one orchestrated submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub record: ChangeRef,
    /// Absent when no logo was submitted
    pub logo: Option<ChangeRef>,
}

/// Sequences the intake pipeline against the two collaborators
pub struct SubmitService {
    fetcher: Arc<dyn ContentFetcher>,
    submitter: Arc<dyn ChangeSubmitter>,
}

impl SubmitService {
    pub fn new(fetcher: Arc<dyn ContentFetcher>, submitter: Arc<dyn ChangeSubmitter>) -> Self {
        Self { fetcher, submitter }
    }

    pub async fn handle(&self, body: SubmissionBody) -> Result<SubmissionOutcome> {
        let draft = normalize(body)?;
        debug!(slug = %draft.slug, mode = ?draft.mode, "Draft normalized");

        let (record, prior_sha) = match draft.mode {
            ContributionMode::Add => (draft.record.clone(), None),
            ContributionMode::Edit => {
                let fetched = self.fetcher.fetch_record(&draft.slug).await?;
                let merged = reconcile(&fetched.record, &draft.record);
                (merged, Some(fetched.sha))
            }
        };

        let record_ref = self
            .submitter
            .submit_record(RecordChange {
                mode: draft.mode,
                slug: draft.slug.clone(),
                record,
                prior_sha,
            })
            .await?;

        let logo_ref = match draft.logo {
            None => None,
            Some(asset) => {
                // Decoupled from the record submission: the record pull
                // request already exists whatever happens here.
                let result = self
                    .submitter
                    .submit_asset(AssetChange {
                        slug: draft.slug.clone(),
                        content_base64: asset.content_base64,
                        file_name: asset.file_name,
                        mime_type: asset.mime_type,
                    })
                    .await;
                match result {
                    Ok(change_ref) => Some(change_ref),
                    Err(e) => {
                        return Err(IntakeError::AssetSubmission {
                            record: record_ref,
                            message: e.to_string(),
                        });
                    }
                }
            }
        };

        info!(
            slug = %draft.slug,
            record_pr = %record_ref.pull_request_url,
            logo_pr = ?logo_ref.as_ref().map(|r| r.pull_request_url.as_str()),
            "Submission completed"
        );

        Ok(SubmissionOutcome {
            record: record_ref,
            logo: logo_ref,
        })
    }
}
