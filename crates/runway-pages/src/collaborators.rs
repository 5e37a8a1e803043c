//! Trusted local collaborators the resolver depends on.
//!
//! These are opaque services (backed elsewhere by the content store and the
//! redirect table), so the traits return `anyhow::Result`; the resolver maps
//! their failures into [`crate::ResolutionError`] variants.

use std::collections::HashMap;

use async_trait::async_trait;

use runway_core::RequestContext;

use crate::types::{DynamicPageSuccessResult, Node, NodeId, Page, RedirectResponse};

/// Matches request paths against statically configured site-builder pages.
#[async_trait]
pub trait SiteBuilderPageMatcher: Send + Sync {
    /// The node bound to the path, if any.
    async fn match_site_builder_page(&self, path: &str) -> anyhow::Result<Option<NodeId>>;
}

/// Access to nodes and their renderable page data.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Load a node by id.
    async fn get(&self, node_id: &NodeId) -> anyhow::Result<Node>;

    /// The dynamic node registered for the handler's page type, if any.
    async fn match_dynamic_page(
        &self,
        result: &DynamicPageSuccessResult,
    ) -> anyhow::Result<Option<Node>>;

    /// Load the page data for a node.
    async fn fetch_page_for_node(&self, node: &Node) -> anyhow::Result<Page>;
}

/// Looks up configured redirect rules.
#[async_trait]
pub trait RedirectService: Send + Sync {
    /// The redirect rule matching the path, if any.
    async fn redirect_for_path(
        &self,
        path: &str,
        query: &HashMap<String, String>,
        ctx: &RequestContext,
    ) -> anyhow::Result<Option<RedirectResponse>>;
}
