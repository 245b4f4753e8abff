//! ---
//! fw_section: "03-networking-external-interfaces"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Backend connectivity for snapshots and scenarios."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
//! Typed client for the fleet backend.
//!
//! The client never retries and never caches; failure policy (last-known-good
//! snapshots, retained metrics) lives with the callers that own that state.

pub mod api;
pub mod error;

pub use api::{BackendClient, SnapshotSource};
pub use error::ClientError;
pub use reqwest::StatusCode;
