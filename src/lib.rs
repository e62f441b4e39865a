//! Turnstile - project-listing intake gateway
//!
//! Turnstile accepts user-submitted project listings (new entries or edits,
//! optionally with a logo image), reconciles edits against the authoritative
//! record in a GitHub-hosted YAML dataset, and opens pull requests for the
//! record and the logo independently.
//!
//! ## Services
//!
//! - **Admission**: fixed-window per-client rate limiting
//! - **Listing**: draft normalization and upstream reconciliation
//! - **GitHub**: contents fetch and pull-request submission collaborators
//! - **Orchestrator**: end-to-end submission sequencing

pub mod admission;
pub mod config;
pub mod github;
pub mod listing;
pub mod orchestrator;
pub mod routes;
pub mod server;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{IntakeError, Result};
