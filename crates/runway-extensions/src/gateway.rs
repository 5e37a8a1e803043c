//! Invocation of deployed extensions over the runner's HTTP protocol.
//!
//! One call is `POST {base}/run/{project}/{hook}` with body
//! `{"arguments": ...}`. The gateway checks the registry before going to the
//! network, clamps requested timeouts to per-call-class ceilings, and turns
//! every remote failure into an [`InvocationResult::Failure`] value so that a
//! missing or crashing extension can never abort the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use runway_core::RequestContext;

use crate::error::DiscoveryError;
use crate::registry::ExtensionRegistry;

/// Hook name of the extension that resolves dynamic pages.
pub const DYNAMIC_PAGE_EXTENSION_NAME: &str = "dynamic-page-handler";

/// Correlation header attached to every runner call.
pub const REQUEST_ID_HEADER: &str = "Frontastic-Request-Id";

/// The kind of extension being invoked, with its fixed timeout ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallClass {
    /// Named action (`action-{namespace}-{action}`).
    Action,
    /// Data-source extension, addressed by its literal name.
    DataSource,
    /// The dynamic-page-handler extension.
    DynamicPage,
}

impl CallClass {
    /// Administrative timeout ceiling for this call class.
    pub fn max_timeout(self) -> Duration {
        match self {
            CallClass::Action => Duration::from_secs(10),
            CallClass::DataSource => Duration::from_secs(5),
            CallClass::DynamicPage => Duration::from_secs(5),
        }
    }

    /// Clamp a requested timeout to this class's ceiling.
    ///
    /// A request above the ceiling is clamped and logged; no request may
    /// hold a connection open longer than the ceiling allows.
    pub fn effective_timeout(self, requested: Option<Duration>) -> Duration {
        let maximum = self.max_timeout();
        match requested {
            Some(requested) if requested > maximum => {
                tracing::warn!(
                    requested_secs = requested.as_secs_f64(),
                    maximum_secs = maximum.as_secs(),
                    call_class = ?self,
                    "provided timeout is greater than the maximum allowed value, \
                     using maximum value instead"
                );
                maximum
            }
            Some(requested) => requested,
            None => maximum,
        }
    }
}

/// Outcome of one extension invocation.
///
/// Remote failures are data, not errors: the only error an invocation can
/// surface is a [`DiscoveryError`] from the registry lookup that precedes it.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationResult {
    /// The extension answered 200; the raw body is the caller's to decode.
    Payload(String),
    /// The extension was absent, answered non-200, or the call itself failed.
    Failure {
        /// Human-readable description, carrying the remote body where one
        /// was received.
        message: String,
    },
}

impl InvocationResult {
    fn not_found(hook_name: &str) -> Self {
        InvocationResult::Failure {
            message: format!("The requested extension \"{hook_name}\" was not found."),
        }
    }

    /// Whether the invocation failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, InvocationResult::Failure { .. })
    }

    /// The raw payload, if the invocation succeeded.
    pub fn payload(&self) -> Option<&str> {
        match self {
            InvocationResult::Payload(body) => Some(body),
            InvocationResult::Failure { .. } => None,
        }
    }

    /// Decode a successful payload as JSON.
    pub fn decode<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        match self {
            InvocationResult::Payload(body) => Ok(serde_json::from_str(body)?),
            InvocationResult::Failure { message } => anyhow::bail!("{message}"),
        }
    }
}

/// Seam for invoking extensions, so callers can be exercised without a
/// running extension runner.
#[async_trait]
pub trait ExtensionInvoker: Send + Sync {
    /// Invoke the action `{namespace}/{action}`.
    async fn invoke_action(
        &self,
        ctx: &RequestContext,
        namespace: &str,
        action: &str,
        args: Value,
        timeout: Option<Duration>,
    ) -> Result<InvocationResult, DiscoveryError>;

    /// Invoke a data-source extension by name.
    async fn invoke_data_source(
        &self,
        ctx: &RequestContext,
        extension_name: &str,
        args: Value,
        timeout: Option<Duration>,
    ) -> Result<InvocationResult, DiscoveryError>;

    /// Invoke the dynamic-page-handler extension.
    async fn invoke_dynamic_page_handler(
        &self,
        ctx: &RequestContext,
        args: Value,
        timeout: Option<Duration>,
    ) -> Result<InvocationResult, DiscoveryError>;
}

/// Issues extension calls against the runner.
pub struct ExtensionGateway {
    registry: Arc<ExtensionRegistry>,
    client: Client,
}

impl ExtensionGateway {
    /// Create a gateway sharing the registry's HTTP client and runner
    /// endpoint.
    pub fn new(registry: Arc<ExtensionRegistry>) -> Self {
        let client = registry.client().clone();
        Self { registry, client }
    }

    /// The registry this gateway consults before each call.
    pub fn registry(&self) -> &Arc<ExtensionRegistry> {
        &self.registry
    }

    async fn invoke(
        &self,
        ctx: &RequestContext,
        hook_name: &str,
        class: CallClass,
        args: Value,
        requested_timeout: Option<Duration>,
    ) -> Result<InvocationResult, DiscoveryError> {
        let timeout = class.effective_timeout(requested_timeout);

        if !self.registry.exists(&ctx.project, hook_name).await? {
            tracing::debug!(
                project = %ctx.project,
                hook = hook_name,
                "extension not deployed, skipping runner call"
            );
            return Ok(InvocationResult::not_found(hook_name));
        }

        let url = format!(
            "{}/run/{}/{}",
            self.registry.config().endpoint,
            ctx.project.identifier(),
            hook_name
        );
        let payload = serde_json::json!({ "arguments": args });

        tracing::debug!(
            project = %ctx.project,
            hook = hook_name,
            request_id = %ctx.request_id,
            timeout_secs = timeout.as_secs_f64(),
            "invoking extension"
        );

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .header(REQUEST_ID_HEADER, ctx.request_id.as_str())
            .json(&payload)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(hook = hook_name, error = %e, "extension call failed");
                return Ok(InvocationResult::Failure {
                    message: format!("Calling extension {hook_name} failed. Error: {e}"),
                });
            }
        };

        let status = response.status();
        match response.text().await {
            Ok(body) if status.is_success() => Ok(InvocationResult::Payload(body)),
            Ok(body) => {
                tracing::warn!(hook = hook_name, status = status.as_u16(), "extension call failed");
                Ok(InvocationResult::Failure {
                    message: format!("Calling extension {hook_name} failed. Error: {body}"),
                })
            }
            Err(e) => Ok(InvocationResult::Failure {
                message: format!("Calling extension {hook_name} failed. Error: {e}"),
            }),
        }
    }
}

#[async_trait]
impl ExtensionInvoker for ExtensionGateway {
    async fn invoke_action(
        &self,
        ctx: &RequestContext,
        namespace: &str,
        action: &str,
        args: Value,
        timeout: Option<Duration>,
    ) -> Result<InvocationResult, DiscoveryError> {
        let hook_name = action_hook_name(namespace, action);
        self.invoke(ctx, &hook_name, CallClass::Action, args, timeout)
            .await
    }

    async fn invoke_data_source(
        &self,
        ctx: &RequestContext,
        extension_name: &str,
        args: Value,
        timeout: Option<Duration>,
    ) -> Result<InvocationResult, DiscoveryError> {
        self.invoke(ctx, extension_name, CallClass::DataSource, args, timeout)
            .await
    }

    async fn invoke_dynamic_page_handler(
        &self,
        ctx: &RequestContext,
        args: Value,
        timeout: Option<Duration>,
    ) -> Result<InvocationResult, DiscoveryError> {
        self.invoke(
            ctx,
            DYNAMIC_PAGE_EXTENSION_NAME,
            CallClass::DynamicPage,
            args,
            timeout,
        )
        .await
    }
}

/// Hook name addressing a named action.
pub fn action_hook_name(namespace: &str, action: &str) -> String {
    format!("action-{namespace}-{action}")
}
