//! Route definitions.

use axum::{Router, middleware, routing::any};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::{api, pages};
use crate::state::AppState;

/// Build the edge router. Dispatch is on path only; the method is not inspected.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", any(pages::index))
        .route("/index.html", any(pages::index))
        .route("/offline.html", any(pages::offline))
        .route("/sw.js", any(pages::worker_script))
        .route("/api/data", any(api::data))
        .fallback(pages::not_found)
        .layer(middleware::from_fn(crate::middleware::request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EdgeConfig;
    use crate::handlers::api::DataResponse;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode, header};
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    fn app() -> Router {
        build_app(Arc::new(AppState::new(EdgeConfig::default())))
    }

    async fn send(method: Method, uri: &str) -> axum::response::Response {
        app()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn header_value<'a>(response: &'a axum::response::Response, name: header::HeaderName) -> &'a str {
        response.headers().get(name).unwrap().to_str().unwrap()
    }

    #[tokio::test]
    async fn test_index_is_not_cached() {
        for uri in ["/", "/index.html"] {
            let response = send(Method::GET, uri).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(header_value(&response, header::CACHE_CONTROL), "no-cache");
            assert!(header_value(&response, header::CONTENT_TYPE).starts_with("text/html"));
            assert!(body_text(response).await.contains("/sw.js"));
        }
    }

    #[tokio::test]
    async fn test_worker_script() {
        let response = send(Method::GET, "/sw.js").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_value(&response, header::CONTENT_TYPE), "application/javascript");
        assert_eq!(header_value(&response, header::CACHE_CONTROL), "no-cache");
        assert!(body_text(response).await.contains("offline-demo-v1"));
    }

    #[tokio::test]
    async fn test_offline_page_is_cached_for_a_year() {
        let response = send(Method::GET, "/offline.html").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            header_value(&response, header::CACHE_CONTROL),
            "public, max-age=31536000"
        );
    }

    #[tokio::test]
    async fn test_api_data() {
        let response = send(Method::GET, "/api/data").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header_value(&response, header::CONTENT_TYPE), "application/json");
        let data: DataResponse = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(data.online);
        assert_eq!(data.message, "Hello from the edge!");
        assert!(chrono::DateTime::parse_from_rfc3339(&data.timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_unknown_path_is_plain_404() {
        let response = send(Method::DELETE, "/nope").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(header_value(&response, header::CONTENT_TYPE).starts_with("text/plain"));
        assert_eq!(body_text(response).await, "Not Found");
    }

    #[tokio::test]
    async fn test_request_id_header() {
        let response = send(Method::GET, "/").await;
        assert!(response.headers().contains_key(crate::middleware::REQUEST_ID_HEADER));
    }
}
