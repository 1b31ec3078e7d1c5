use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, FromRef};
use axum::http::{HeaderName, HeaderValue, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::controllers;
use crate::api::state::*;

#[derive(Default)]
pub struct ApiEndpointBuilder {
    common: ApiEndpointBuilderCommon,
}

impl ApiEndpointBuilder {
    pub async fn bind(self, state: ApiState) -> Result<ApiEndpoint> {
        let listener = state
            .bind_socket()
            .await
            .with_context(|| format!("failed to bind {}", state.config().listen_addr))?;
        let max_request_size = state.config().max_request_size;

        Ok(ApiEndpoint::from_parts(
            listener,
            self.common.build(),
            state,
            max_request_size,
        ))
    }
}

struct ApiEndpointBuilderCommon {
    healthcheck_route: Option<String>,
}

impl Default for ApiEndpointBuilderCommon {
    fn default() -> Self {
        Self {
            healthcheck_route: Some("/".to_owned()),
        }
    }
}

impl ApiEndpointBuilderCommon {
    fn build<S>(self) -> axum::Router<S>
    where
        ApiState: FromRef<S>,
        S: Clone + Send + Sync + 'static,
    {
        let mut router = axum::Router::new();

        if let Some(route) = self.healthcheck_route {
            router = router.route(&route, get(health_check));
        }

        router.nest("/api", api_router())
    }
}

pub struct ApiEndpoint {
    listener: TcpListener,
    router: axum::Router<()>,
}

impl ApiEndpoint {
    pub fn builder() -> ApiEndpointBuilder {
        ApiEndpointBuilder::default()
    }

    pub fn from_parts<S>(
        listener: TcpListener,
        router: axum::Router<S>,
        state: S,
        max_request_size: usize,
    ) -> Self
    where
        S: Clone + Send + Sync + 'static,
    {
        let router = with_middleware(router, max_request_size).with_state(state);
        Self { listener, router }
    }

    pub async fn serve(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }
}

fn with_middleware<S>(router: axum::Router<S>, max_request_size: usize) -> axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    use tower::ServiceBuilder;
    use tower_http::cors::CorsLayer;

    let service = ServiceBuilder::new()
        .layer(DefaultBodyLimit::max(max_request_size))
        .layer(CorsLayer::permissive())
        .layer(security_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .layer(security_header(header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .layer(security_header(header::REFERRER_POLICY, "no-referrer"))
        .layer(security_header(
            HeaderName::from_static("cross-origin-resource-policy"),
            "same-origin",
        ));

    router.layer(service)
}

fn security_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
}

fn api_router<S>() -> axum::Router<S>
where
    ApiState: FromRef<S>,
    S: Clone + Send + Sync + 'static,
{
    axum::Router::new().route("/configs", post(controllers::configs::submit))
}

fn health_check() -> futures_util::future::Ready<impl IntoResponse> {
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    futures_util::future::ready(now_ms.to_string())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::api::config::ApiConfig;
    use crate::storage::{ConfigStore, StorageConfig};

    fn test_router(dir: &Path) -> axum::Router {
        let config = ApiConfig::default();
        let max_request_size = config.max_request_size;
        let state = ApiState::builder()
            .with_config(config)
            .with_config_store(ConfigStore::new(&StorageConfig {
                dir: dir.to_path_buf(),
            }))
            .build();

        with_middleware(ApiEndpointBuilderCommon::default().build(), max_request_size)
            .with_state(state)
    }

    async fn submit(router: &axum::Router, body: impl Into<Body>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/configs")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn stored_path(body: &Value) -> PathBuf {
        assert_eq!(body["status"], "success");
        PathBuf::from(body["path"].as_str().unwrap())
    }

    fn count_files(dir: &Path) -> usize {
        match std::fs::read_dir(dir) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    #[tokio::test]
    async fn stored_file_matches_body() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("configs");
        let router = test_router(&dir);

        let config = json!({
            "dashboard": "substation-4",
            "panels": [
                { "device": "CONDITIONER", "params": ["airTemperature", "humidity"] },
                { "device": "ALARMS", "params": ["startTs", "status"], "limit": 50 }
            ],
            "refresh": null
        });
        let (status, body) = submit(&router, config.to_string()).await;
        assert_eq!(status, StatusCode::OK);

        let path = stored_path(&body);
        assert!(path.is_absolute());
        assert!(path.starts_with(std::path::absolute(&dir).unwrap()));

        let stored: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(stored, config);
    }

    #[tokio::test]
    async fn stored_file_keeps_key_order() {
        let root = tempfile::tempdir().unwrap();
        let router = test_router(root.path());

        let (status, body) =
            submit(&router, r#"{"title":"Hall","rows":[1],"alpha":true,"nested":{"z":0,"b":1}}"#)
                .await;
        assert_eq!(status, StatusCode::OK);

        let text = std::fs::read_to_string(stored_path(&body)).unwrap();
        assert_eq!(
            text,
            "{\n  \"title\": \"Hall\",\n  \"rows\": [\n    1\n  ],\n  \"alpha\": true,\n  \
             \"nested\": {\n    \"z\": 0,\n    \"b\": 1\n  }\n}"
        );
    }

    #[tokio::test]
    async fn repeated_submission_creates_new_file() {
        let root = tempfile::tempdir().unwrap();
        let router = test_router(root.path());

        let config = json!({ "theme": "dark" });
        let (_, first) = submit(&router, config.to_string()).await;
        let (_, second) = submit(&router, config.to_string()).await;

        assert_ne!(stored_path(&first), stored_path(&second));
        assert_eq!(count_files(root.path()), 2);
    }

    #[tokio::test]
    async fn empty_body_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("configs");
        let router = test_router(&dir);

        for body in ["", "null"] {
            let (status, response) = submit(&router, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response, json!({ "error": "No configuration found." }));
        }

        // Nothing is touched before the input is accepted.
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let router = test_router(root.path());

        let (status, response) = submit(&router, "{ not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["error"].as_str().unwrap().starts_with("Invalid JSON"));
        assert_eq!(count_files(root.path()), 0);
    }

    #[tokio::test]
    async fn storage_failure_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("configs");
        std::fs::write(&blocker, b"").unwrap();
        let router = test_router(&blocker.join("inner"));

        let (status, response) = submit(&router, r#"{ "a": 1 }"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let error = response["error"].as_str().unwrap();
        assert!(error.starts_with("failed to create directory"), "{error}");
        assert!(error.contains("inner"), "{error}");

        assert_eq!(count_files(root.path()), 1);
        assert!(std::fs::read(&blocker).unwrap().is_empty());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn write_failure_is_reported() {
        let router = test_router(Path::new("/proc/sys"));

        let (status, response) = submit(&router, r#"{ "a": 1 }"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let error = response["error"].as_str().unwrap();
        assert!(error.starts_with("failed to write /proc/sys/.config-"), "{error}");
        assert!(error.contains("os error"), "{error}");

        let leftovers = std::fs::read_dir("/proc/sys")
            .unwrap()
            .filter_map(|entry| entry.ok()?.file_name().into_string().ok())
            .filter(|name| name.contains("config-"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let router = test_router(root.path());

        let big = json!({ "blob": "x".repeat(ApiConfig::default().max_request_size) });
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/configs")
            .body(Body::from(big.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(count_files(root.path()), 0);
    }

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let root = tempfile::tempdir().unwrap();
        let router = test_router(root.path());

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");
        assert_eq!(headers[header::REFERRER_POLICY], "no-referrer");
        assert_eq!(headers["cross-origin-resource-policy"], "same-origin");
    }

    #[tokio::test]
    async fn unknown_route() {
        let root = tempfile::tempdir().unwrap();
        let router = test_router(root.path());

        let request = Request::builder()
            .method(Method::GET)
            .uri("/api/configs")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
