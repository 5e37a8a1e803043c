//! Per-project discovery of deployed extensions.
//!
//! The runner exposes `GET {base}/hooks/{project}` returning a JSON object
//! mapping extension name to its (opaque) metadata. The registry caches that
//! list per project so that existence checks stay cheap: the first `list`
//! call for a project issues the fetch, concurrent first-time callers share
//! the same in-flight fetch, and later calls hit the cache. A failed fetch
//! is evicted so the next call retries.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::Client;
use tokio::sync::Mutex;

use runway_core::config::RunnerConfig;
use runway_core::ProjectId;

use crate::error::DiscoveryError;

/// Extension name -> opaque metadata, as returned by the runner.
pub type ExtensionMap = HashMap<String, serde_json::Value>;

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<ExtensionMap>, DiscoveryError>>>;

/// Discovers and caches the extension list per project.
pub struct ExtensionRegistry {
    client: Client,
    config: RunnerConfig,
    /// Completed or in-flight fetches, keyed by project identifier.
    cache: Mutex<HashMap<String, SharedFetch>>,
}

impl ExtensionRegistry {
    /// Create a registry talking to the configured runner.
    pub fn new(config: RunnerConfig) -> Result<Self, DiscoveryError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| DiscoveryError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    /// Create a registry reusing an existing HTTP client.
    pub fn with_client(client: Client, config: RunnerConfig) -> Self {
        Self {
            client,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Fetch the extension list for a project from the runner, bypassing the
    /// cache.
    pub async fn fetch(&self, project: &ProjectId) -> Result<ExtensionMap, DiscoveryError> {
        let url = hooks_url(&self.config, project);
        fetch_extensions(self.client.clone(), url).await
    }

    /// Get the extension list for a project, fetching it on first use.
    ///
    /// Concurrent first-time callers for the same project share one fetch
    /// and all receive the same result or the same error.
    pub async fn list(&self, project: &ProjectId) -> Result<Arc<ExtensionMap>, DiscoveryError> {
        let key = project.identifier();

        let fetch = {
            let mut cache = self.cache.lock().await;
            match cache.get(&key) {
                Some(fetch) => fetch.clone(),
                None => {
                    tracing::debug!(project = %key, "fetching extension list from runner");
                    let client = self.client.clone();
                    let url = hooks_url(&self.config, project);
                    let fetch = async move { fetch_extensions(client, url).await.map(Arc::new) }
                        .boxed()
                        .shared();
                    cache.insert(key.clone(), fetch.clone());
                    fetch
                }
            }
        };

        let result = fetch.clone().await;
        if result.is_err() {
            // Do not cache failures; the next list() retries the fetch.
            self.evict_failed(&key, &fetch).await;
        }
        result
    }

    /// Drop a failed fetch from the cache so the next `list` retries.
    ///
    /// Eviction is by identity, not by key: a late waker of an old failed
    /// fetch must not evict a fresh fetch another caller has already
    /// started for the same project.
    async fn evict_failed(&self, key: &str, failed: &SharedFetch) {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.get(key) {
            if cached.ptr_eq(failed) {
                cache.remove(key);
            }
        }
    }

    /// Check whether an extension is deployed for a project.
    pub async fn exists(
        &self,
        project: &ProjectId,
        extension_name: &str,
    ) -> Result<bool, DiscoveryError> {
        Ok(self.list(project).await?.contains_key(extension_name))
    }
}

fn hooks_url(config: &RunnerConfig, project: &ProjectId) -> String {
    format!("{}/hooks/{}", config.endpoint, project.identifier())
}

async fn fetch_extensions(client: Client, url: String) -> Result<ExtensionMap, DiscoveryError> {
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| DiscoveryError::Transport(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| DiscoveryError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(DiscoveryError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| DiscoveryError::Decode(e.to_string()))
}
