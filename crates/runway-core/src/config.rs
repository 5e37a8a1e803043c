//! Shared configuration defaults.
//!
//! Keeps endpoint and environment-variable names in one place so the
//! extension layer and tests agree on them.

/// Default endpoint constants.
pub mod endpoints {
    /// Base URL of the extension runner.
    pub const EXTENSION_RUNNER: &str = "http://localhost:8082";
}

/// Environment variable names.
pub mod env_vars {
    pub const RUNNER_ENDPOINT: &str = "RUNWAY_RUNNER_ENDPOINT";
}

/// Connection settings for the extension runner.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Base URL the runner is reachable at, without a trailing slash.
    pub endpoint: String,
}

impl RunnerConfig {
    /// Create a config pointing at the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let mut endpoint = endpoint.into();
        while endpoint.ends_with('/') {
            endpoint.pop();
        }
        Self { endpoint }
    }

    /// Read the endpoint from the environment, falling back to the default.
    pub fn from_env() -> Self {
        let endpoint = std::env::var(env_vars::RUNNER_ENDPOINT)
            .unwrap_or_else(|_| endpoints::EXTENSION_RUNNER.to_string());
        Self::new(endpoint)
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new(endpoints::EXTENSION_RUNNER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_stripped() {
        let config = RunnerConfig::new("http://localhost:8082/");
        assert_eq!(config.endpoint, "http://localhost:8082");
    }

    #[test]
    fn test_default_points_at_local_runner() {
        assert_eq!(RunnerConfig::default().endpoint, endpoints::EXTENSION_RUNNER);
    }
}
