//! The ordered resolution chain.
//!
//! Strategies implement [`ResolutionStrategy`] and are iterated in a fixed
//! order; the first decisive (`Some`) outcome wins and later strategies are
//! never evaluated. Within one request the chain is strictly sequential:
//! a later strategy is only correct once the earlier ones definitively
//! failed.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use runway_core::RequestContext;
use runway_extensions::{ExtensionInvoker, InvocationResult};

use crate::collaborators::{NodeStore, RedirectService, SiteBuilderPageMatcher};
use crate::error::ResolutionError;
use crate::types::{
    DynamicPageResult, PageRequest, RedirectReason, RedirectResponse, RedirectTarget,
    ResolutionOutcome,
};

/// Default status code when the dynamic page handler redirects without one.
const DEFAULT_REDIRECT_STATUS: u16 = 301;

/// One way of producing a page for a request.
#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    /// Try to resolve the request; `None` means "not mine, ask the next
    /// strategy".
    async fn try_resolve(
        &self,
        request: &PageRequest,
        ctx: &RequestContext,
    ) -> Result<Option<ResolutionOutcome>, ResolutionError>;
}

/// Strategy 1: statically configured site-builder pages.
pub struct StaticPageStrategy {
    matcher: Arc<dyn SiteBuilderPageMatcher>,
    nodes: Arc<dyn NodeStore>,
}

impl StaticPageStrategy {
    pub fn new(matcher: Arc<dyn SiteBuilderPageMatcher>, nodes: Arc<dyn NodeStore>) -> Self {
        Self { matcher, nodes }
    }
}

#[async_trait]
impl ResolutionStrategy for StaticPageStrategy {
    async fn try_resolve(
        &self,
        request: &PageRequest,
        _ctx: &RequestContext,
    ) -> Result<Option<ResolutionOutcome>, ResolutionError> {
        let node_id = self
            .matcher
            .match_site_builder_page(&request.path)
            .await
            .map_err(ResolutionError::Matcher)?;

        let Some(node_id) = node_id else {
            return Ok(None);
        };

        let node = self
            .nodes
            .get(&node_id)
            .await
            .map_err(ResolutionError::NodeStore)?;
        let page = self
            .nodes
            .fetch_page_for_node(&node)
            .await
            .map_err(ResolutionError::NodeStore)?;

        Ok(Some(ResolutionOutcome::StaticMatch { node, page }))
    }
}

/// Strategy 2: the remote `dynamic-page-handler` extension.
///
/// This is the single integration point with independently deployed remote
/// code, so every failure here (absent extension, remote error, discovery
/// failure, undecodable answer) degrades to "no match" instead of aborting
/// the request.
pub struct DynamicPageStrategy {
    invoker: Arc<dyn ExtensionInvoker>,
    nodes: Arc<dyn NodeStore>,
}

impl DynamicPageStrategy {
    pub fn new(invoker: Arc<dyn ExtensionInvoker>, nodes: Arc<dyn NodeStore>) -> Self {
        Self { invoker, nodes }
    }
}

#[async_trait]
impl ResolutionStrategy for DynamicPageStrategy {
    async fn try_resolve(
        &self,
        request: &PageRequest,
        ctx: &RequestContext,
    ) -> Result<Option<ResolutionOutcome>, ResolutionError> {
        let args = json!({
            "request": {
                "path": request.path,
                "query": request.query,
            },
            "locale": ctx.locale,
        });

        let result = match self
            .invoker
            .invoke_dynamic_page_handler(ctx, args, None)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "extension discovery failed, skipping dynamic page handling"
                );
                return Ok(None);
            }
        };

        let body = match result {
            InvocationResult::Payload(body) => body,
            InvocationResult::Failure { message } => {
                tracing::warn!(
                    message = %message,
                    "dynamic page handler call failed, continuing resolution"
                );
                return Ok(None);
            }
        };

        match DynamicPageResult::parse(&body) {
            Some(DynamicPageResult::Redirect(redirect)) => {
                Ok(Some(ResolutionOutcome::Redirect(RedirectResponse {
                    status_code: redirect.status_code.unwrap_or(DEFAULT_REDIRECT_STATUS),
                    target: redirect.redirect_location,
                    target_type: RedirectTarget::Link,
                    reason: RedirectReason::DynamicPageRedirect,
                })))
            }
            Some(DynamicPageResult::Success(success)) => {
                let node = self
                    .nodes
                    .match_dynamic_page(&success)
                    .await
                    .map_err(ResolutionError::NodeStore)?;

                let Some(node) = node else {
                    tracing::debug!(
                        page_type = %success.dynamic_page_type,
                        "no node registered for dynamic page type"
                    );
                    return Ok(None);
                };

                let page = self
                    .nodes
                    .fetch_page_for_node(&node)
                    .await
                    .map_err(ResolutionError::NodeStore)?;
                Ok(Some(ResolutionOutcome::DynamicMatch { node, page }))
            }
            None => {
                tracing::debug!(path = %request.path, "dynamic page handler returned no match");
                Ok(None)
            }
        }
    }
}

/// Strategy 3: configured redirect rules, fallback-only.
pub struct RedirectStrategy {
    redirects: Arc<dyn RedirectService>,
}

impl RedirectStrategy {
    pub fn new(redirects: Arc<dyn RedirectService>) -> Self {
        Self { redirects }
    }
}

#[async_trait]
impl ResolutionStrategy for RedirectStrategy {
    async fn try_resolve(
        &self,
        request: &PageRequest,
        ctx: &RequestContext,
    ) -> Result<Option<ResolutionOutcome>, ResolutionError> {
        let redirect = self
            .redirects
            .redirect_for_path(&request.path, &request.query, ctx)
            .await
            .map_err(ResolutionError::Redirect)?;

        Ok(redirect.map(ResolutionOutcome::Redirect))
    }
}

/// Runs the strategies in order and returns the first decisive outcome.
///
/// Owns no per-request state: the outcome is a pure function of the request,
/// the context, and the collaborators' answers.
pub struct PageResolver {
    strategies: Vec<Arc<dyn ResolutionStrategy>>,
}

impl PageResolver {
    /// The standard chain: static match, then dynamic match, then redirects.
    pub fn new(
        matcher: Arc<dyn SiteBuilderPageMatcher>,
        nodes: Arc<dyn NodeStore>,
        redirects: Arc<dyn RedirectService>,
        invoker: Arc<dyn ExtensionInvoker>,
    ) -> Self {
        Self {
            strategies: vec![
                Arc::new(StaticPageStrategy::new(matcher, nodes.clone())),
                Arc::new(DynamicPageStrategy::new(invoker, nodes)),
                Arc::new(RedirectStrategy::new(redirects)),
            ],
        }
    }

    /// A chain with a custom strategy order, mainly for tests.
    pub fn with_strategies(strategies: Vec<Arc<dyn ResolutionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Resolve one request.
    pub async fn resolve(
        &self,
        request: &PageRequest,
        ctx: &RequestContext,
    ) -> Result<ResolutionOutcome, ResolutionError> {
        for strategy in &self.strategies {
            if let Some(outcome) = strategy.try_resolve(request, ctx).await? {
                return Ok(outcome);
            }
        }
        Ok(ResolutionOutcome::NotFound)
    }
}
