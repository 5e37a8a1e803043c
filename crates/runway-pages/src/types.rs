//! Data model for page resolution.
//!
//! Wire-facing types are camelCase-serialized to match the extension
//! runner's JSON contract.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a node in the page tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    /// Get the string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node (page folder) in the page tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub node_id: NodeId,
    /// Whether the node is bound to a dynamic page type rather than a path.
    #[serde(default)]
    pub is_dynamic: bool,
    #[serde(default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub configuration: Value,
}

impl Node {
    /// Create a minimal static node.
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            is_dynamic: false,
            node_type: None,
            name: None,
            configuration: Value::Null,
        }
    }
}

/// Renderable page data for a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub page_id: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub sections: Value,
}

/// Where a redirect points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RedirectTarget {
    /// An absolute or relative link.
    Link,
    /// Another node in the page tree.
    PageFolder,
}

/// Why a redirect was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RedirectReason {
    /// A redirect rule is configured for the request path.
    RedirectExistsForPath,
    /// The dynamic page handler answered with a redirect.
    DynamicPageRedirect,
}

/// A redirect the response layer should send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectResponse {
    pub status_code: u16,
    pub target: String,
    pub target_type: RedirectTarget,
    pub reason: RedirectReason,
}

/// Positive answer from the dynamic page handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicPageSuccessResult {
    /// Page type the handler matched; keys the node lookup.
    pub dynamic_page_type: String,
    #[serde(default)]
    pub data_source_payload: Value,
    #[serde(default)]
    pub page_matching_payload: Value,
}

/// Redirect answer from the dynamic page handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicPageRedirectResult {
    pub redirect_location: String,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub status_message: Option<String>,
}

/// Decoded, decisive dynamic page handler response.
#[derive(Debug, Clone)]
pub enum DynamicPageResult {
    Success(DynamicPageSuccessResult),
    Redirect(DynamicPageRedirectResult),
}

impl DynamicPageResult {
    /// Parse a handler response body.
    ///
    /// A body carrying `redirectLocation` is a redirect; a body carrying a
    /// non-empty `dynamicPageType` is a match; anything else (including an
    /// undecodable body) counts as "no match".
    pub fn parse(body: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(body).ok()?;
        if value.get("redirectLocation").is_some() {
            return serde_json::from_value(value)
                .ok()
                .map(DynamicPageResult::Redirect);
        }
        match serde_json::from_value::<DynamicPageSuccessResult>(value) {
            Ok(result) if !result.dynamic_page_type.is_empty() => {
                Some(DynamicPageResult::Success(result))
            }
            _ => None,
        }
    }
}

/// The inbound request the chain resolves a page for.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub path: String,
    pub query: HashMap<String, String>,
}

impl PageRequest {
    /// Request for a path with no query parameters.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: HashMap::new(),
        }
    }

    /// Attach query parameters.
    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }
}

/// What the resolution chain decided for one request.
#[derive(Debug, Clone)]
pub enum ResolutionOutcome {
    /// A statically configured page matched the path.
    StaticMatch { node: Node, page: Page },
    /// The dynamic page handler matched the path.
    DynamicMatch { node: Node, page: Page },
    /// A redirect applies.
    Redirect(RedirectResponse),
    /// Nothing matched.
    NotFound,
}
