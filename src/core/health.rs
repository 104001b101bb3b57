use crate::adapters::http::{build_client, describe_request_error};
use crate::domain::model::{ServerEndpoint, DEFAULT_HEALTH_TIMEOUT_SECS};
use crate::utils::error::Result;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Single-shot liveness check against `{endpoint}/health`.
pub struct HealthProber {
    client: Client,
    url: Url,
}

impl HealthProber {
    pub fn new(endpoint: &ServerEndpoint, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            url: endpoint.health_url()?,
        })
    }

    /// Healthy means status 200 with a JSON body. Every other result,
    /// including timeouts, is `false`; the reason only goes to the log.
    pub async fn check(&self) -> bool {
        match self.probe().await {
            Ok(()) => {
                tracing::info!("✅ Health check passed: {}", self.url);
                true
            }
            Err(reason) => {
                tracing::warn!("❌ Health check failed for {}: {}", self.url, reason);
                false
            }
        }
    }

    async fn probe(&self) -> std::result::Result<(), String> {
        tracing::debug!("Probing service health at: {}", self.url);
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| describe_request_error(&e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(format!("status code {}", status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| describe_request_error(&e))?;
        serde_json::from_str::<serde_json::Value>(&body)
            .map_err(|e| format!("unparseable body: {}", e))?;
        Ok(())
    }
}

/// Probes with the default five second timeout.
pub async fn check_health(endpoint: &ServerEndpoint) -> bool {
    match HealthProber::new(endpoint, Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS)) {
        Ok(prober) => prober.check().await,
        Err(e) => {
            tracing::error!("❌ Could not build health probe: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn endpoint_for(server: &MockServer) -> ServerEndpoint {
        ServerEndpoint::parse(&server.base_url()).unwrap()
    }

    #[tokio::test]
    async fn test_healthy_service() {
        let server = MockServer::start_async().await;
        let health_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/health");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(serde_json::json!({"status": "ok"}));
            })
            .await;

        assert!(check_health(&endpoint_for(&server)).await);
        health_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_found_is_unhealthy() {
        let server = MockServer::start_async().await;
        let health_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/health");
                then.status(404);
            })
            .await;

        assert!(!check_health(&endpoint_for(&server)).await);
        health_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unparseable_body_is_unhealthy() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/health");
                then.status(200).body("OK");
            })
            .await;

        assert!(!check_health(&endpoint_for(&server)).await);
    }

    #[tokio::test]
    async fn test_timeout_is_unhealthy() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/health");
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .json_body(serde_json::json!({"status": "ok"}));
            })
            .await;

        let prober =
            HealthProber::new(&endpoint_for(&server), Duration::from_millis(200)).unwrap();
        assert!(!prober.check().await);
    }

    #[tokio::test]
    async fn test_probe_does_not_retry() {
        let server = MockServer::start_async().await;
        let health_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/health");
                then.status(500);
            })
            .await;

        let prober = HealthProber::new(&endpoint_for(&server), Duration::from_secs(5)).unwrap();
        assert!(!prober.check().await);
        health_mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_unreachable_is_unhealthy() {
        let endpoint = ServerEndpoint::parse("http://127.0.0.1:1").unwrap();
        assert!(!check_health(&endpoint).await);
    }
}
