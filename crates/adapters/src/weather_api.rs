//! weatherapi.com adapter for current-weather lookups

use std::time::Duration;

use async_trait::async_trait;
use gemm_domain::{WeatherError, WeatherSource};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};

/// Client for the `current.json` endpoint
pub struct WeatherApiClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
}

impl WeatherApiClient {
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self, WeatherError> {
        Self::with_base_url(api_key, "http://api.weatherapi.com".to_string(), timeout)
    }

    pub fn with_base_url(
        api_key: SecretString,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    async fn current(&self, country: &str) -> Result<serde_json::Value, WeatherError> {
        let url = format!("{}/v1/current.json", self.base_url);

        tracing::debug!(country = %country, "Fetching current weather");

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.expose_secret()), ("q", country)])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api(format!("{}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| WeatherError::Api(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(uri: String) -> WeatherApiClient {
        WeatherApiClient::with_base_url(
            SecretString::new("test-key".into()),
            uri,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_current_weather_passthrough() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .and(query_param("key", "test-key"))
            .and(query_param("q", "Singapore"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "location": { "name": "Singapore" },
                "current": { "temp_c": 31.0 }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let weather = client(mock_server.uri()).current("Singapore").await.unwrap();

        assert_eq!(weather["location"]["name"], "Singapore");
        assert_eq!(weather["current"]["temp_c"], 31.0);
    }

    #[tokio::test]
    async fn test_upstream_error_is_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .respond_with(ResponseTemplate::new(401).set_body_string("API key is invalid"))
            .mount(&mock_server)
            .await;

        let result = client(mock_server.uri()).current("Singapore").await;

        match result {
            Err(WeatherError::Api(message)) => assert!(message.contains("API key is invalid")),
            other => panic!("expected api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let result = client(mock_server.uri()).current("Singapore").await;
        assert!(matches!(result, Err(WeatherError::Api(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let result = client("http://127.0.0.1:1".to_string())
            .current("Singapore")
            .await;
        assert!(matches!(result, Err(WeatherError::Network(_))));
    }
}
