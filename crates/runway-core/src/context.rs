//! Request-scoped context threaded through extension calls.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies the tenant (customer project) an inbound request belongs to.
///
/// Extensions and pages are partitioned per project; the runner addresses a
/// project by the combined `{customer}_{project}` key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId {
    /// Customer account the project belongs to.
    pub customer: String,
    /// Project identifier within the customer account.
    pub project: String,
}

impl ProjectId {
    /// Create a new project identifier.
    pub fn new(customer: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            customer: customer.into(),
            project: project.into(),
        }
    }

    /// The combined identifier used in runner URLs.
    pub fn identifier(&self) -> String {
        format!("{}_{}", self.customer, self.project)
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.customer, self.project)
    }
}

/// Correlation identifier for one inbound request.
///
/// Attached to every outgoing runner call so remote extension logs can be
/// tied back to the request that triggered them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    /// Create a new random request ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything about the current request the extension layer needs to know.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Tenant the request is scoped to.
    pub project: ProjectId,
    /// Locale requested by the frontend (e.g. `en_US`).
    pub locale: String,
    /// Correlation id for tracing across the runner boundary.
    pub request_id: RequestId,
}

impl RequestContext {
    /// Create a context with a fresh correlation id.
    pub fn new(project: ProjectId, locale: impl Into<String>) -> Self {
        Self {
            project,
            locale: locale.into(),
            request_id: RequestId::new(),
        }
    }

    /// Create a context with an already-assigned correlation id (e.g. taken
    /// from an inbound header).
    pub fn with_request_id(
        project: ProjectId,
        locale: impl Into<String>,
        request_id: RequestId,
    ) -> Self {
        Self {
            project,
            locale: locale.into(),
            request_id,
        }
    }
}
