//! End-to-end resolution against a real gateway and a mocked runner.
//!
//! The unit tests in `resolver.rs` stub the invoker; here the chain goes
//! through `ExtensionGateway` and the runner wire protocol.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use httpmock::prelude::*;
use serde_json::json;

use runway_core::config::RunnerConfig;
use runway_core::{ProjectId, RequestContext, RequestId};
use runway_extensions::{ExtensionGateway, ExtensionRegistry};
use runway_pages::{
    DynamicPageSuccessResult, Node, NodeId, NodeStore, Page, PageRequest, PageResolver,
    RedirectReason, RedirectResponse, RedirectService, RedirectTarget, ResolutionOutcome,
    SiteBuilderPageMatcher,
};

struct NoStaticPages;

#[async_trait]
impl SiteBuilderPageMatcher for NoStaticPages {
    async fn match_site_builder_page(&self, _path: &str) -> anyhow::Result<Option<NodeId>> {
        Ok(None)
    }
}

struct ProductNodes;

#[async_trait]
impl NodeStore for ProductNodes {
    async fn get(&self, node_id: &NodeId) -> anyhow::Result<Node> {
        anyhow::bail!("unknown node {node_id}")
    }

    async fn match_dynamic_page(
        &self,
        result: &DynamicPageSuccessResult,
    ) -> anyhow::Result<Option<Node>> {
        if result.dynamic_page_type == "product-detail" {
            let mut node = Node::new(NodeId::from("n1"));
            node.is_dynamic = true;
            node.node_type = Some("product-detail".to_string());
            Ok(Some(node))
        } else {
            Ok(None)
        }
    }

    async fn fetch_page_for_node(&self, node: &Node) -> anyhow::Result<Page> {
        Ok(Page {
            page_id: format!("page-for-{}", node.node_id),
            state: Some("published".to_string()),
            sections: serde_json::Value::Null,
        })
    }
}

struct FixedRedirect;

#[async_trait]
impl RedirectService for FixedRedirect {
    async fn redirect_for_path(
        &self,
        path: &str,
        _query: &HashMap<String, String>,
        _ctx: &RequestContext,
    ) -> anyhow::Result<Option<RedirectResponse>> {
        if path == "/redirect" {
            Ok(Some(RedirectResponse {
                status_code: 301,
                target: "https://example.com".to_string(),
                target_type: RedirectTarget::Link,
                reason: RedirectReason::RedirectExistsForPath,
            }))
        } else {
            Ok(None)
        }
    }
}

fn resolver_for(server: &MockServer) -> PageResolver {
    let registry = Arc::new(
        ExtensionRegistry::new(RunnerConfig::new(server.base_url()))
            .expect("client should build"),
    );
    let gateway = Arc::new(ExtensionGateway::new(registry));
    PageResolver::new(
        Arc::new(NoStaticPages),
        Arc::new(ProductNodes),
        Arc::new(FixedRedirect),
        gateway,
    )
}

fn ctx() -> RequestContext {
    RequestContext::with_request_id(
        ProjectId::new("acme", "webshop"),
        "en_US",
        RequestId::from("req-chain-1"),
    )
}

#[tokio::test]
async fn dynamic_page_resolves_through_the_runner() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/hooks/acme_webshop");
        then.status(200).json_body(json!({"dynamic-page-handler": {}}));
    });
    let run = server.mock(|when, then| {
        when.method(POST)
            .path("/run/acme_webshop/dynamic-page-handler")
            .header("Frontastic-Request-Id", "req-chain-1");
        then.status(200).json_body(json!({
            "dynamicPageType": "product-detail",
            "dataSourcePayload": {"sku": "A-1"}
        }));
    });

    let resolver = resolver_for(&server);
    let outcome = resolver
        .resolve(&PageRequest::new("/no/node/found"), &ctx())
        .await
        .expect("resolution should succeed");

    run.assert_calls(1);
    match outcome {
        ResolutionOutcome::DynamicMatch { node, page } => {
            assert_eq!(node.node_id.as_str(), "n1");
            assert_eq!(page.page_id, "page-for-n1");
        }
        other => panic!("expected dynamic match, got {other:?}"),
    }
}

#[tokio::test]
async fn handler_no_match_falls_through_to_redirect() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/hooks/acme_webshop");
        then.status(200).json_body(json!({"dynamic-page-handler": {}}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/run/acme_webshop/dynamic-page-handler");
        then.status(200).body("null");
    });

    let resolver = resolver_for(&server);
    let outcome = resolver
        .resolve(&PageRequest::new("/redirect"), &ctx())
        .await
        .expect("resolution should succeed");

    match outcome {
        ResolutionOutcome::Redirect(redirect) => {
            assert_eq!(redirect.status_code, 301);
            assert_eq!(redirect.target, "https://example.com");
        }
        other => panic!("expected redirect, got {other:?}"),
    }
}

#[tokio::test]
async fn crashing_handler_degrades_to_redirect_lookup() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/hooks/acme_webshop");
        then.status(200).json_body(json!({"dynamic-page-handler": {}}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/run/acme_webshop/dynamic-page-handler");
        then.status(500).body("handler crashed");
    });

    let resolver = resolver_for(&server);
    let outcome = resolver
        .resolve(&PageRequest::new("/redirect"), &ctx())
        .await
        .expect("a broken handler must not abort resolution");

    assert!(matches!(outcome, ResolutionOutcome::Redirect(_)));
}

#[tokio::test]
async fn undeployed_handler_yields_not_found_without_runner_calls() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/hooks/acme_webshop");
        then.status(200).json_body(json!({}));
    });
    let run = server.mock(|when, then| {
        when.method(POST).path_includes("/run/");
        then.status(200).body("{}");
    });

    let resolver = resolver_for(&server);
    let outcome = resolver
        .resolve(&PageRequest::new("/nowhere"), &ctx())
        .await
        .expect("resolution should succeed");

    assert!(matches!(outcome, ResolutionOutcome::NotFound));
    run.assert_calls(0);
}
