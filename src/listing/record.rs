//! Canonical record shape
//!
//! Structurally compatible with the draft the normalizer builds, but open:
//! fields the canonical store holds that this service does not know about are
//! captured in an extension map and round-trip through reconciliation
//! unchanged.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Platform name -> list of handles.
///
/// A platform key that is absent means "not supplied"; a key that is present
/// with an empty list means "supplied and empty". The merge in `reconcile`
/// depends on that distinction.
pub type SocialMap = BTreeMap<String, Vec<String>>;

/// One project record as stored in the dataset.
///
/// Known fields are typed; everything else lands in `extra`. Serialization
/// order is deterministic: known fields in declaration order, then extension
/// keys sorted (BTreeMap), so emitted records are diff-stable irrespective of
/// input field order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFile {
    /// Schema version, owned by the canonical store's lifecycle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,

    /// Unique URL/path-safe slug identifying the project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub websites: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub social: Option<SocialMap>,

    /// Fields the canonical store holds that this service does not model
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl RecordFile {
    /// Whether the record carries a non-empty `name`
    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_round_trip() {
        let yaml = "name: acme\nversion: 7\nfunding_sources:\n  - grants\ndisplay_name: Acme\n";
        let record: RecordFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(record.name.as_deref(), Some("acme"));
        assert_eq!(record.version, Some(7));
        assert!(record.extra.contains_key("funding_sources"));

        let out = serde_yaml::to_string(&record).unwrap();
        let reparsed: RecordFile = serde_yaml::from_str(&out).unwrap();
        assert_eq!(record, reparsed);
    }

    #[test]
    fn test_serialization_order_is_stable() {
        // Same fields in different input order serialize identically
        let a: RecordFile =
            serde_yaml::from_str("display_name: Acme\nname: acme\nzeta: 1\nalpha: 2\n").unwrap();
        let b: RecordFile =
            serde_yaml::from_str("alpha: 2\nzeta: 1\nname: acme\ndisplay_name: Acme\n").unwrap();
        assert_eq!(
            serde_yaml::to_string(&a).unwrap(),
            serde_yaml::to_string(&b).unwrap()
        );
    }
}
