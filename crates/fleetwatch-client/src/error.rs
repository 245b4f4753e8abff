//! ---
//! fw_section: "03-networking-external-interfaces"
//! fw_subsection: "module"
//! fw_type: "source"
//! fw_scope: "code"
//! fw_description: "Backend connectivity for snapshots and scenarios."
//! fw_version: "v0.0.0-prealpha"
//! fw_owner: "tbd"
//! ---
use thiserror::Error;

/// Failures surfaced by [`crate::BackendClient`].
///
/// Callers at the poller and session boundaries convert these into degraded
/// snapshots or retained metrics; they are never allowed to reach
/// reconciliation or rendering code.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure reaching the backend (DNS, connect, timeout).
    #[error("transport failure reaching backend: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success HTTP status.
    #[error("backend returned {status} for {endpoint}")]
    Protocol {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    /// The backend answered 2xx but the payload did not decode.
    #[error("malformed payload from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The configured base URL could not be parsed or joined.
    #[error("invalid backend url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
