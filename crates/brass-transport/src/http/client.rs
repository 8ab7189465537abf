//! JSON API client.

use std::time::Duration;

use brass_core::{TransportError, TransportResult};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::trace;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_ERROR_BODY: usize = 512;

/// A shared reqwest client with uniform error mapping.
///
/// Requests are built with [`get`](Self::get) / [`post`](Self::post) (plain
/// reqwest builders, so auth, headers, query and form work as usual) and
/// sent with [`send_json`](Self::send_json) or [`send`](Self::send).
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client with the default timeout.
    pub fn new() -> TransportResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> TransportResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidConfig(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Sends `request` and decodes a JSON response.
    pub async fn send_json<R: DeserializeOwned>(&self, request: RequestBuilder) -> TransportResult<R> {
        let response = execute(request).await?;
        let bytes = response.bytes().await.map_err(map_error)?;
        serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
    }

    /// Sends `request`, discarding the response body.
    pub async fn send(&self, request: RequestBuilder) -> TransportResult<()> {
        execute(request).await.map(drop)
    }
}

async fn execute(request: RequestBuilder) -> TransportResult<Response> {
    let response = request.send().await.map_err(map_error)?;
    let status = response.status();
    trace!(status = status.as_u16(), url = %response.url(), "HTTP response");

    if !status.is_success() {
        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|&i| body.is_char_boundary(i))
                .unwrap_or(0);
            body.truncate(cut);
        }
        return Err(TransportError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

fn map_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_decode() {
        TransportError::Decode(err.to_string())
    } else {
        TransportError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pong {
        pong: bool,
    }

    #[tokio::test]
    async fn test_send_json_decodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(query_param("n", "1"))
            .and(header("authorization", "Bearer t0ken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"pong": true})))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let req = client
            .get(&format!("{}/ping", server.uri()))
            .query(&[("n", "1")])
            .bearer_auth("t0ken");
        let pong: Pong = client.send_json(req).await.unwrap();
        assert_eq!(pong, Pong { pong: true });
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("{\"message\":\"Invalid reply token\"}"))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let err = client
            .send(client.post(&server.uri()).json(&serde_json::json!({})))
            .await
            .unwrap_err();
        match err {
            TransportError::Status { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("Invalid reply token"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = HttpClient::new().unwrap();
        let err = client
            .send_json::<Pong>(client.get(&server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = HttpClient::with_timeout(Duration::from_millis(50)).unwrap();
        let err = client.send(client.get(&server.uri())).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout));
    }
}
