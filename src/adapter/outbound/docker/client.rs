//! Engine REST API client.
//!
//! Only the container inspect endpoint is used here; the event stream lives
//! in [`super::stream`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use tracing::{debug, warn};

use super::stream::DockerEventStream;
use crate::domain::container::ContainerDetails;
use crate::error::InspectError;
use crate::infrastructure::config::docker::DockerConfig;
use crate::port::outbound::inspector::ContainerInspector;

/// HTTP client for the engine's REST API.
#[derive(Debug, Clone)]
pub struct DockerClient {
    http: HttpClient,
    base_url: String,
}

impl DockerClient {
    /// Create a client for the engine at `base_url` (e.g. `http://127.0.0.1:2375`).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn from_config(config: &DockerConfig) -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });

        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A fresh event stream against the same engine.
    #[must_use]
    pub fn event_stream(&self) -> DockerEventStream {
        DockerEventStream::new(&self.base_url)
    }

    fn inspect_url(&self, id: &str) -> String {
        format!("{}/containers/{}/json", self.base_url, id)
    }
}

#[async_trait]
impl ContainerInspector for DockerClient {
    async fn inspect_container(&self, id: &str) -> Result<ContainerDetails, InspectError> {
        let url = self.inspect_url(id);
        debug!(url = %url, "Inspecting container");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| InspectError::Request(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(InspectError::NotFound { id: id.to_string() });
        }
        let response = response
            .error_for_status()
            .map_err(|e| InspectError::Request(e.to_string()))?;

        response
            .json::<ContainerDetails>()
            .await
            .map_err(|e| InspectError::Request(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = DockerClient::new("http://engine:2375/");
        assert_eq!(client.base_url(), "http://engine:2375");
        assert_eq!(
            client.inspect_url("abc123"),
            "http://engine:2375/containers/abc123/json"
        );
    }

    #[test]
    fn from_config_uses_configured_url() {
        let config = DockerConfig {
            url: "https://swarm:2376".into(),
            ..DockerConfig::default()
        };
        assert_eq!(DockerClient::from_config(&config).base_url(), "https://swarm:2376");
    }

    #[tokio::test]
    async fn unreachable_engine_is_a_request_error() {
        let client = DockerClient::new("http://127.0.0.1:9");
        let result = client.inspect_container("abc").await;
        assert!(matches!(result, Err(InspectError::Request(_))));
    }
}
