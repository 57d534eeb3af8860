//! Adapter configuration
//!
//! Configuration is fixed at construction and immutable for the adapter's
//! lifetime.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default Ollama endpoint when no base address is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

fn default_max_rate() -> f64 {
    1000.0
}

fn default_time_period() -> Duration {
    Duration::from_secs(1)
}

/// Configuration for an [`OllamaAdapter`](crate::OllamaAdapter)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Model identifier, e.g. `qwen2.5:7b`
    pub model: String,

    /// Backend base address; the Ollama default is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Request timeout; no timeout when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,

    /// Whether chat calls stream the response
    #[serde(default)]
    pub stream: bool,

    /// Maximum calls admitted per `time_period`
    #[serde(default = "default_max_rate")]
    pub max_rate: f64,

    /// Window for `max_rate`
    #[serde(default = "default_time_period")]
    pub time_period: Duration,

    /// Identity override used for rate-limit bucketing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AdapterConfig {
    /// Create a configuration for `model` with defaults for everything else
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: None,
            timeout: None,
            stream: false,
            max_rate: default_max_rate(),
            time_period: default_time_period(),
            name: None,
        }
    }

    /// Set the backend base address
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable or disable streaming
    #[must_use]
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Set the rate-limit parameters
    #[must_use]
    pub fn with_rate_limit(mut self, max_rate: f64, time_period: Duration) -> Self {
        self.max_rate = max_rate;
        self.time_period = time_period;
        self
    }

    /// Set the identity override
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The endpoint chat calls go to, trailing slash trimmed
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    /// Derived identity used for rate-limit bucketing
    ///
    /// Defaults to the configured base address (the literal `"None"` when
    /// absent) concatenated with the model name, matching the identity
    /// format used across the orchestration framework this feeds into.
    #[must_use]
    pub fn identity(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{}{}", self.base_url.as_deref().unwrap_or("None"), self.model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identity_defaults_to_base_url_and_model() {
        let config = AdapterConfig::new("llama3").with_base_url("http://localhost:11434");
        assert_eq!(config.identity(), "http://localhost:11434llama3");
    }

    #[test]
    fn test_identity_without_base_url() {
        let config = AdapterConfig::new("llama3");
        assert_eq!(config.identity(), "Nonellama3");
    }

    #[test]
    fn test_identity_override() {
        let config = AdapterConfig::new("llama3").with_name("primary");
        assert_eq!(config.identity(), "primary");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = AdapterConfig::new("llama3").with_base_url("http://10.0.0.2:11434/");
        assert_eq!(config.endpoint(), "http://10.0.0.2:11434");

        let default = AdapterConfig::new("llama3");
        assert_eq!(default.endpoint(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_defaults() {
        let config = AdapterConfig::new("llama3");
        assert!(!config.stream);
        assert!(config.timeout.is_none());
        assert_eq!(config.max_rate, 1000.0);
        assert_eq!(config.time_period, Duration::from_secs(1));
    }
}
