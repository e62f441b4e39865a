//! Shared types for Turnstile

pub mod error;

use serde::{Deserialize, Serialize};

pub use error::{IntakeError, Result};

/// Whether a submission creates a new listing or edits an existing one.
///
/// Edit mode requires fetching and reconciling the upstream record before
/// anything is submitted; Add mode submits the draft as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionMode {
    Add,
    Edit,
}

impl ContributionMode {
    /// Parse the raw mode value. Anything other than the exact edit marker
    /// (after trimming) falls back to Add.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("edit") => Self::Edit,
            _ => Self::Add,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, Self::Edit)
    }
}

/// Reference to one created change request (pull request).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRef {
    /// URL of the pull request
    pub pull_request_url: String,
    /// Branch the change was pushed to
    pub branch_name: String,
    /// Path of the changed file within the target repository
    pub file_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_defaults_to_add() {
        assert_eq!(ContributionMode::from_raw(None), ContributionMode::Add);
        assert_eq!(ContributionMode::from_raw(Some("add")), ContributionMode::Add);
        assert_eq!(ContributionMode::from_raw(Some("")), ContributionMode::Add);
        assert_eq!(ContributionMode::from_raw(Some("EDIT")), ContributionMode::Add);
    }

    #[test]
    fn test_mode_edit_marker() {
        assert_eq!(ContributionMode::from_raw(Some("edit")), ContributionMode::Edit);
        assert_eq!(ContributionMode::from_raw(Some("  edit  ")), ContributionMode::Edit);
    }
}
