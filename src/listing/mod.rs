//! Project listing domain
//!
//! - `record`: the canonical record shape stored in the dataset
//! - `draft`: normalization of an untrusted submission body
//! - `reconcile`: merge of an upstream record with a normalized draft

pub mod draft;
pub mod record;
pub mod reconcile;

pub use draft::{normalize, Draft, LogoAsset, LogoFields, ProjectFields, SubmissionBody, MAX_LOGO_B64_CHARS};
pub use record::{RecordFile, SocialMap};
pub use reconcile::reconcile;
