//! Network adapters.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tether_core::ports::Network;
use tether_core::{Error, Method, Request, Response, Result};
use tracing::debug;

/// Network over HTTP. No retries, no timeout beyond the client's own.
#[derive(Clone, Default)]
pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("{} {}: {}", request.method, request.url, e)))?;

        let status = resp.status();
        let mut headers = BTreeMap::new();
        for (name, value) in resp.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("Failed to read body of {}: {}", request.url, e)))?;

        debug!(url = %request.url, status = status.as_u16(), bytes = body.len(), "Network response");

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: body.to_vec(),
        })
    }
}

/// A network that is never reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNetwork;

#[async_trait]
impl Network for OfflineNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        Err(Error::Network(format!("offline: {} {}", request.method, request.url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_maps_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/data"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string(r#"{"online":true}"#),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/api/data", server.uri())).unwrap();
        let response = HttpNetwork::new().fetch(&Request::get(url)).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.status_text, "OK");
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.text(), r#"{"online":true}"#);
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/api/data", server.uri())).unwrap();
        let response = HttpNetwork::new().fetch(&Request::get(url)).await.unwrap();
        assert_eq!(response.status, 500);
        assert!(!response.ok());
    }

    #[tokio::test]
    async fn test_sends_method_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/data"))
            .and(body_string("hello"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/api/data", server.uri())).unwrap();
        let request = Request::new(Method::Post, url).with_body("hello");
        let response = HttpNetwork::new().fetch(&request).await.unwrap();
        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
        drop(listener);

        let err = HttpNetwork::new().fetch(&Request::get(url)).await.unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_offline_network_always_fails() {
        let url = Url::parse("http://localhost:8080/").unwrap();
        let err = OfflineNetwork.fetch(&Request::navigate(url)).await.unwrap_err();
        assert!(err.is_network());
    }
}
