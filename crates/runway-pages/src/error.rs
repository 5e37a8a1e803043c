//! Errors raised while resolving a page.

use thiserror::Error;

/// A trusted local collaborator failed; the request becomes a server error.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// The static site-builder page matcher failed.
    #[error("site-builder page matching failed: {0}")]
    Matcher(#[source] anyhow::Error),

    /// Loading a node or its page data failed.
    #[error("loading node data failed: {0}")]
    NodeStore(#[source] anyhow::Error),

    /// The redirect rule lookup failed.
    #[error("redirect lookup failed: {0}")]
    Redirect(#[source] anyhow::Error),
}
