//! Errors raised by extension discovery.

use thiserror::Error;

/// Fetching the extension list from the runner failed.
///
/// `Clone` because a single discovery fetch can be shared by several
/// concurrent callers, each of which receives the same error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    /// The runner could not be reached (connection error, deadline, ...).
    #[error("extension runner is unreachable: {0}")]
    Transport(String),

    /// The runner answered with a non-success status.
    #[error("fetching available extensions failed. Error: {body}")]
    Status {
        /// HTTP status code returned by the runner.
        status: u16,
        /// Raw response body, surfaced for diagnostics.
        body: String,
    },

    /// The runner answered 200 but the body was not a valid extension list.
    #[error("extension list is not valid JSON: {0}")]
    Decode(String),
}
