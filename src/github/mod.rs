//! GitHub collaborators
//!
//! The two external capabilities the core consumes: reading the canonical
//! record (`contents`) and turning a proposed change into a pull request
//! (`pulls`). Both are traits so the engine stays unit-testable without
//! network access.

pub mod contents;
pub mod pulls;

pub use contents::{ContentFetcher, FetchedRecord, GithubContentFetcher};
pub use pulls::{
    AssetChange, ChangeSubmitter, GithubSubmitter, RecordChange, SubmitterConfig,
};

/// Default GitHub REST API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// One target repository and base reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    pub owner: String,
    pub name: String,
    pub base_branch: String,
}

impl RepoTarget {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Storage path of a project record inside the records repository.
///
/// Records are sharded by the slug's first character:
/// `data/projects/a/acme.yaml`.
pub fn record_path(slug: &str) -> String {
    let initial = slug
        .chars()
        .next()
        .map(|c| c.to_ascii_lowercase())
        .unwrap_or('_');
    format!("data/projects/{}/{}.yaml", initial, slug)
}

/// Storage path of a project logo inside the assets repository.
///
/// The extension is taken from the declared file name, then the declared
/// MIME type, defaulting to png.
pub fn logo_path(slug: &str, file_name: Option<&str>, mime_type: Option<&str>) -> String {
    let ext = file_name
        .and_then(|n| n.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase()))
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .or_else(|| match mime_type {
            Some("image/png") => Some("png".to_string()),
            Some("image/jpeg") => Some("jpg".to_string()),
            Some("image/svg+xml") => Some("svg".to_string()),
            Some("image/webp") => Some("webp".to_string()),
            _ => None,
        })
        .unwrap_or_else(|| "png".to_string());
    format!("logos/{}.{}", slug, ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_path_sharded_by_initial() {
        assert_eq!(record_path("acme"), "data/projects/a/acme.yaml");
        assert_eq!(record_path("Zebra"), "data/projects/z/Zebra.yaml");
        assert_eq!(record_path("0xdeadbeef"), "data/projects/0/0xdeadbeef.yaml");
    }

    #[test]
    fn test_logo_path_extension_resolution() {
        assert_eq!(logo_path("acme", Some("logo.SVG"), None), "logos/acme.svg");
        assert_eq!(logo_path("acme", None, Some("image/jpeg")), "logos/acme.jpg");
        assert_eq!(logo_path("acme", None, None), "logos/acme.png");
        // File name extension wins over MIME type
        assert_eq!(
            logo_path("acme", Some("x.webp"), Some("image/png")),
            "logos/acme.webp"
        );
        // Junk extension falls through to MIME type
        assert_eq!(
            logo_path("acme", Some("noext"), Some("image/png")),
            "logos/acme.png"
        );
    }
}
