//! Draft normalization
//!
//! Converts an untrusted, partially-populated request body into a trusted
//! draft. All string fields are trimmed and empty-after-trim values are
//! treated as absent, so a canonical draft never contains empty strings or
//! empty lists.

use serde::{Deserialize, Serialize};

use super::record::{RecordFile, SocialMap};
use crate::types::{ContributionMode, IntakeError, Result};

/// Hard cap on the encoded logo payload. Bounds roughly 500 KB of decoded
/// binary; checked before any decoding or external call.
pub const MAX_LOGO_B64_CHARS: usize = 700_000;

/// Inbound submission body (untrusted)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionBody {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub project: Option<ProjectFields>,
    #[serde(default)]
    pub logo: Option<LogoFields>,
}

/// Project fields as submitted by the user (untrusted)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectFields {
    #[serde(default)]
    pub owner_project: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub main_github: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
}

/// Logo attachment as submitted by the user (untrusted)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogoFields {
    #[serde(default)]
    pub base64: Option<String>,
    #[serde(default, rename = "fileName")]
    pub file_name: Option<String>,
    #[serde(default, rename = "mimeType")]
    pub mime_type: Option<String>,
}

/// Logo asset carried through one request; never persisted here
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoAsset {
    /// Raw base64 content, still encoded (decoding is the submitter's job)
    pub content_base64: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// Normalized, trusted shape of one submission
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub mode: ContributionMode,
    /// Project slug (`owner_project`), validated URL/path-safe
    pub slug: String,
    /// Record built only from fields the user actually supplied
    pub record: RecordFile,
    pub logo: Option<LogoAsset>,
}

/// Trim a raw string field; empty-after-trim is absent.
fn clean(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn is_slug(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('.')
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Normalize a raw submission body into a [`Draft`].
pub fn normalize(body: SubmissionBody) -> Result<Draft> {
    let mode = ContributionMode::from_raw(body.mode.as_deref());
    let project = body.project.unwrap_or_default();

    let slug = clean(project.owner_project);
    let display_name = clean(project.display_name);
    let (slug, display_name) = match (slug, display_name) {
        (Some(s), Some(d)) => (s, d),
        _ => {
            return Err(IntakeError::Validation(
                "owner_project and display_name are required".to_string(),
            ));
        }
    };
    if !is_slug(&slug) {
        return Err(IntakeError::Validation(format!(
            "owner_project must be a URL-safe slug, got {:?}",
            slug
        )));
    }

    // Platforms the user did not supply stay wholly absent from the map;
    // the merge treats absence and emptiness differently.
    let mut social = SocialMap::new();
    if let Some(twitter) = clean(project.twitter) {
        social.insert("twitter".to_string(), vec![twitter]);
    }
    if let Some(telegram) = clean(project.telegram) {
        social.insert("telegram".to_string(), vec![telegram]);
    }

    let record = RecordFile {
        version: None,
        name: Some(slug.clone()),
        display_name: Some(display_name),
        description: clean(project.description),
        websites: clean(project.website).map(|url| vec![url]),
        github: clean(project.main_github).map(|url| vec![url]),
        social: if social.is_empty() { None } else { Some(social) },
        extra: Default::default(),
    };

    let logo = match body.logo {
        Some(fields) => match clean(fields.base64) {
            Some(content_base64) => {
                if content_base64.len() > MAX_LOGO_B64_CHARS {
                    return Err(IntakeError::PayloadTooLarge(format!(
                        "Logo exceeds maximum encoded size of {} characters",
                        MAX_LOGO_B64_CHARS
                    )));
                }
                Some(LogoAsset {
                    content_base64,
                    file_name: clean(fields.file_name),
                    mime_type: clean(fields.mime_type),
                })
            }
            // A logo object without content is treated as no logo
            None => None,
        },
        None => None,
    };

    Ok(Draft {
        mode,
        slug,
        record,
        logo,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(owner: &str, display: &str) -> SubmissionBody {
        SubmissionBody {
            mode: None,
            project: Some(ProjectFields {
                owner_project: Some(owner.to_string()),
                display_name: Some(display.to_string()),
                ..Default::default()
            }),
            logo: None,
        }
    }

    #[test]
    fn test_minimal_add_draft() {
        let draft = normalize(body("acme", "Acme")).unwrap();
        assert_eq!(draft.mode, ContributionMode::Add);
        assert_eq!(draft.slug, "acme");
        assert_eq!(draft.record.name.as_deref(), Some("acme"));
        assert_eq!(draft.record.display_name.as_deref(), Some("Acme"));
        assert!(draft.record.description.is_none());
        assert!(draft.record.websites.is_none());
        assert!(draft.record.github.is_none());
        assert!(draft.record.social.is_none());
        assert!(draft.logo.is_none());
    }

    #[test]
    fn test_missing_required_fields() {
        let err = normalize(SubmissionBody::default()).unwrap_err();
        match err {
            IntakeError::Validation(msg) => {
                assert_eq!(msg, "owner_project and display_name are required");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let mut b = body("acme", "Acme");
        b.project.as_mut().unwrap().display_name = Some("   ".to_string());
        assert!(matches!(normalize(b), Err(IntakeError::Validation(_))));
    }

    #[test]
    fn test_rejects_unsafe_slug() {
        let err = normalize(body("../etc/passwd", "Acme")).unwrap_err();
        assert!(matches!(err, IntakeError::Validation(_)));
    }

    #[test]
    fn test_fields_are_trimmed_and_empty_is_absent() {
        let mut b = body("  acme  ", "  Acme  ");
        {
            let p = b.project.as_mut().unwrap();
            p.description = Some("  a project  ".to_string());
            p.website = Some("   ".to_string());
            p.main_github = Some(" https://github.com/acme/acme ".to_string());
        }
        let draft = normalize(b).unwrap();
        assert_eq!(draft.slug, "acme");
        assert_eq!(draft.record.display_name.as_deref(), Some("Acme"));
        assert_eq!(draft.record.description.as_deref(), Some("a project"));
        // Empty-after-trim website is omitted entirely, never an empty list
        assert!(draft.record.websites.is_none());
        assert_eq!(
            draft.record.github,
            Some(vec!["https://github.com/acme/acme".to_string()])
        );
    }

    #[test]
    fn test_social_map_contains_only_supplied_platforms() {
        let mut b = body("acme", "Acme");
        b.project.as_mut().unwrap().twitter = Some("@acme".to_string());
        let draft = normalize(b).unwrap();

        let social = draft.record.social.unwrap();
        assert_eq!(social.get("twitter"), Some(&vec!["@acme".to_string()]));
        assert!(!social.contains_key("telegram"));
    }

    #[test]
    fn test_edit_mode_marker() {
        let mut b = body("acme", "Acme");
        b.mode = Some("edit".to_string());
        assert_eq!(normalize(b).unwrap().mode, ContributionMode::Edit);

        let mut b = body("acme", "Acme");
        b.mode = Some("replace".to_string());
        assert_eq!(normalize(b).unwrap().mode, ContributionMode::Add);
    }

    #[test]
    fn test_logo_size_cap() {
        let mut b = body("acme", "Acme");
        b.logo = Some(LogoFields {
            base64: Some("A".repeat(MAX_LOGO_B64_CHARS + 1)),
            file_name: None,
            mime_type: None,
        });
        let err = normalize(b).unwrap_err();
        assert!(matches!(err, IntakeError::PayloadTooLarge(_)));
    }

    #[test]
    fn test_logo_within_cap() {
        let mut b = body("acme", "Acme");
        b.logo = Some(LogoFields {
            base64: Some("aGVsbG8=".to_string()),
            file_name: Some("acme.png".to_string()),
            mime_type: Some("image/png".to_string()),
        });
        let draft = normalize(b).unwrap();
        let logo = draft.logo.unwrap();
        assert_eq!(logo.content_base64, "aGVsbG8=");
        assert_eq!(logo.file_name.as_deref(), Some("acme.png"));
    }

    #[test]
    fn test_logo_without_content_is_absent() {
        let mut b = body("acme", "Acme");
        b.logo = Some(LogoFields {
            base64: Some("   ".to_string()),
            file_name: Some("acme.png".to_string()),
            mime_type: None,
        });
        assert!(normalize(b).unwrap().logo.is_none());
    }
}
