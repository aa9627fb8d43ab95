use crate::errors::FetchError;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// HTTP client with a request timeout.
///
/// Each call is a single attempt: failures go straight back to the caller.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client })
    }

    /// Fetch JSON from URL.
    ///
    /// Query strings are left out of the logs since they carry the API key.
    #[instrument(skip_all, fields(endpoint = %endpoint(url)))]
    pub async fn get_json<T>(&self, url: &str) -> Result<T, FetchError>
    where
        T: serde::de::DeserializeOwned,
    {
        match self.fetch(url).await {
            Ok(body) => {
                debug!("Request successful");
                Ok(body)
            }
            Err(e) => {
                debug!(kind = e.kind(), "Request failed");
                Err(e)
            }
        }
    }

    async fn fetch<T>(&self, url: &str) -> Result<T, FetchError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(format!("Request to {} timed out", endpoint(url)))
            } else {
                FetchError::Network(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http(
                status.as_u16(),
                format!("HTTP error: {}", status),
            ));
        }

        let text = response.text().await?;
        let json: T = serde_json::from_str(&text)?;

        Ok(json)
    }
}

fn endpoint(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn client() -> HttpClient {
        HttpClient::new(Duration::from_secs(2)).expect("client should build")
    }

    #[test]
    fn endpoint_drops_query_string() {
        assert_eq!(
            endpoint("http://host/v1/forecast.json?key=secret&q=Paris"),
            "http://host/v1/forecast.json"
        );
        assert_eq!(endpoint("http://host/health"), "http://host/health");
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "temp_c": 10.0 })))
            .expect(1)
            .mount(&server)
            .await;

        let body: Value = client()
            .get_json(&format!("{}/ok", server.uri()))
            .await
            .expect("request should succeed");

        assert_eq!(body["temp_c"], 10.0);
    }

    #[tokio::test]
    async fn test_non_success_status_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/error"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client()
            .get_json::<Value>(&format!("{}/error", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::HttpStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client()
            .get_json::<Value>(&format!("{}/garbage", server.uri()))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "parse");
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = HttpClient::new(Duration::from_millis(100)).expect("client should build");
        let err = client
            .get_json::<Value>(&format!("{}/slow", server.uri()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Timeout(_)));
    }
}
