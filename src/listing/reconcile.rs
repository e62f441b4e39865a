//! Reconciliation of an upstream record with a normalized draft
//!
//! Pure merge, no I/O. The one hard rule: nothing present upstream may be
//! silently lost. Fields the draft does not set carry over unchanged,
//! including fields this service does not model.

use super::record::RecordFile;

/// Merge `existing` (fetched upstream) with `draft` (user-supplied).
///
/// Policy, each rule independent:
/// 1. Draft-set top-level fields overwrite; everything else, including
///    extension fields, carries over from `existing`.
/// 2. An existing non-empty `name` wins over the draft's.
/// 3. An existing `version` wins regardless of the draft.
/// 4. The social map is merged per platform key, draft taking precedence,
///    and only when the draft supplies a social map at all. A draft without
///    the social key leaves the existing map untouched.
/// 5. Output field order is deterministic (see [`RecordFile`]).
pub fn reconcile(existing: &RecordFile, draft: &RecordFile) -> RecordFile {
    let mut merged = existing.clone();

    if draft.display_name.is_some() {
        merged.display_name = draft.display_name.clone();
    }
    if draft.description.is_some() {
        merged.description = draft.description.clone();
    }
    if draft.websites.is_some() {
        merged.websites = draft.websites.clone();
    }
    if draft.github.is_some() {
        merged.github = draft.github.clone();
    }
    for (key, value) in &draft.extra {
        merged.extra.insert(key.clone(), value.clone());
    }

    // Identity fields are not rewritten by an edit unless previously unset
    if !existing.has_name() {
        merged.name = draft.name.clone();
    }
    if existing.version.is_none() {
        merged.version = draft.version;
    }

    // Platform-key granularity: draft platforms replace, existing-only
    // platforms are preserved. "No social key" and "empty social map" are
    // different inputs and must stay different.
    if let Some(draft_social) = &draft.social {
        let mut social = existing.social.clone().unwrap_or_default();
        for (platform, handles) in draft_social {
            social.insert(platform.clone(), handles.clone());
        }
        merged.social = Some(social);
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::record::SocialMap;

    fn existing_record() -> RecordFile {
        serde_yaml::from_str(
            "version: 3\n\
             name: acme\n\
             display_name: Acme\n\
             websites:\n  - old.example\n\
             social:\n  twitter:\n    - a\n  telegram:\n    - b\n\
             funding_sources:\n  - grants\n",
        )
        .unwrap()
    }

    #[test]
    fn test_empty_draft_is_identity() {
        let existing = existing_record();
        let merged = reconcile(&existing, &RecordFile::default());
        assert_eq!(merged, existing);
    }

    #[test]
    fn test_existing_keys_absent_from_draft_survive() {
        let existing = existing_record();
        let draft = RecordFile {
            name: Some("acme".to_string()),
            display_name: Some("Acme Renamed".to_string()),
            ..Default::default()
        };
        let merged = reconcile(&existing, &draft);

        assert_eq!(merged.display_name.as_deref(), Some("Acme Renamed"));
        // Untouched fields, including ones the draft builder does not model
        assert_eq!(merged.websites, Some(vec!["old.example".to_string()]));
        assert_eq!(merged.extra, existing.extra);
        assert!(merged.extra.contains_key("funding_sources"));
    }

    #[test]
    fn test_name_and_version_precedence() {
        let existing = existing_record();
        let draft = RecordFile {
            version: Some(99),
            name: Some("not-acme".to_string()),
            ..Default::default()
        };
        let merged = reconcile(&existing, &draft);
        assert_eq!(merged.name.as_deref(), Some("acme"));
        assert_eq!(merged.version, Some(3));
    }

    #[test]
    fn test_name_taken_from_draft_when_previously_unset() {
        let existing = RecordFile::default();
        let draft = RecordFile {
            name: Some("acme".to_string()),
            version: Some(7),
            ..Default::default()
        };
        let merged = reconcile(&existing, &draft);
        assert_eq!(merged.name.as_deref(), Some("acme"));
        assert_eq!(merged.version, Some(7));
    }

    #[test]
    fn test_social_merge_at_platform_granularity() {
        let existing = existing_record();
        let mut social = SocialMap::new();
        social.insert("twitter".to_string(), vec!["c".to_string()]);
        let draft = RecordFile {
            social: Some(social),
            ..Default::default()
        };

        let merged = reconcile(&existing, &draft).social.unwrap();
        assert_eq!(merged.get("twitter"), Some(&vec!["c".to_string()]));
        assert_eq!(merged.get("telegram"), Some(&vec!["b".to_string()]));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_draft_without_social_key_leaves_existing_untouched() {
        let existing = existing_record();
        let merged = reconcile(&existing, &RecordFile::default());
        assert_eq!(merged.social, existing.social);
    }

    #[test]
    fn test_draft_social_onto_empty_existing() {
        let existing = RecordFile::default();
        let mut social = SocialMap::new();
        social.insert("twitter".to_string(), vec!["c".to_string()]);
        let draft = RecordFile {
            social: Some(social.clone()),
            ..Default::default()
        };
        assert_eq!(reconcile(&existing, &draft).social, Some(social));
    }

    #[test]
    fn test_empty_social_map_presence_is_kept() {
        // A present-but-empty draft map asserts presence without replacing
        // any platform; the result is the union (existing keys unchanged).
        let existing = existing_record();
        let draft = RecordFile {
            social: Some(SocialMap::new()),
            ..Default::default()
        };
        let merged = reconcile(&existing, &draft);
        assert_eq!(merged.social, existing.social);

        // And onto an existing record without any social map, the result
        // is exactly the draft's (empty, but present).
        let merged = reconcile(&RecordFile::default(), &draft);
        assert_eq!(merged.social, Some(SocialMap::new()));
    }

    #[test]
    fn test_edit_scenario_website_only() {
        let existing: RecordFile =
            serde_yaml::from_str("name: acme\nversion: 3\nwebsites:\n  - old.example\n").unwrap();
        let draft = RecordFile {
            name: Some("acme".to_string()),
            websites: Some(vec!["new.example".to_string()]),
            ..Default::default()
        };
        let merged = reconcile(&existing, &draft);
        assert_eq!(merged.name.as_deref(), Some("acme"));
        assert_eq!(merged.version, Some(3));
        assert_eq!(merged.websites, Some(vec!["new.example".to_string()]));
    }
}
