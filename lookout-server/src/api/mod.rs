//! API Module
//!
//! HTTP API layer for the lookup service.
//! Each submodule handles endpoints for a specific concern.

pub mod error;
pub mod health;
pub mod image;
pub mod profile;
pub mod rate_limit;

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::get,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::service::{AlertSink, ProfileService};
use rate_limit::{RateLimit, enforce_rate_limit};

/// Shared state of every handler
#[derive(Clone)]
pub struct AppState {
    pub profiles: Arc<ProfileService>,
    pub alerts: Arc<dyn AlertSink>,
    /// Outbound client for the image proxy
    pub http: reqwest::Client,
    /// Largest image body the proxy relays
    pub image_max_bytes: usize,
}

/// Per-route-group rate limits
#[derive(Clone)]
pub struct RateLimits {
    pub scrape: RateLimit,
    pub image: RateLimit,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState, limits: RateLimits, cors: CorsLayer) -> Router {
    let lookups = Router::new()
        .route("/scrape/{username}", get(profile::get_profile))
        .route_layer(middleware::from_fn_with_state(
            limits.scrape,
            enforce_rate_limit,
        ));

    let images = Router::new()
        .route("/proxy-image", get(image::proxy_image))
        .route("/proxy-image/", get(image::proxy_image))
        .route_layer(middleware::from_fn_with_state(
            limits.image,
            enforce_rate_limit,
        ));

    Router::new()
        // Health check and stats
        .route("/health", get(health::health_check))
        .route("/stats", get(health::stats))
        // Rate limited endpoints
        .merge(lookups)
        .merge(images)
        // Add state and middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// CORS layer for the configured origins; "*" allows any origin
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryCacheStore;
    use crate::repository::fake::{Reply, ScriptedActor};
    use crate::service::alert::RecordingAlertSink;
    use crate::service::{CacheTtl, JobPoller, PollSettings};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use lookout_core::domain::run::RunStatus;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{header as header_matcher, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct TestApp {
        router: Router,
        alerts: Arc<RecordingAlertSink>,
    }

    fn app_with_limits(actor: ScriptedActor, limits: RateLimits) -> TestApp {
        let alerts = Arc::new(RecordingAlertSink::default());
        let poller = JobPoller::new(
            Arc::new(actor),
            PollSettings {
                interval: Duration::from_secs(1),
                max_wait: Duration::from_secs(15),
            },
        );
        let profiles = ProfileService::new(
            Arc::new(InMemoryCacheStore::new()),
            poller,
            alerts.clone(),
            CacheTtl {
                positive: Duration::from_secs(300),
                negative: Duration::from_secs(3600),
            },
        );
        let state = AppState {
            profiles: Arc::new(profiles),
            alerts: alerts.clone(),
            http: reqwest::Client::new(),
            image_max_bytes: 1024,
        };

        TestApp {
            router: create_router(state, limits, cors_layer(&["*".to_string()])),
            alerts,
        }
    }

    fn app(actor: ScriptedActor) -> TestApp {
        app_with_limits(
            actor,
            RateLimits {
                scrape: RateLimit::per_minute(100),
                image: RateLimit::per_minute(100),
            },
        )
    }

    async fn get(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
        let (status, body) = get(router, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(ScriptedActor::profile("nasa", 100));

        let (status, body) = get_json(&app.router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["time"].is_string());
    }

    #[tokio::test]
    async fn test_scrape_returns_profile() {
        let app = app(ScriptedActor::profile("nasa", 100));

        let (status, body) = get_json(&app.router, "/scrape/nasa").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "nasa");
        assert_eq!(body["display_name"], "NASA");
        assert_eq!(body["followers_count"], 100);
        assert!(body["bio"].is_null());
    }

    #[tokio::test]
    async fn test_scrape_invalid_username() {
        let app = app(ScriptedActor::profile("nasa", 100));

        let (status, body) = get_json(&app.router, "/scrape/a@b").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_USERNAME");
    }

    #[tokio::test]
    async fn test_scrape_not_found() {
        let app = app(ScriptedActor::not_found());

        let (status, body) = get_json(&app.router, "/scrape/doesnotexist123").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "PROFILE_NOT_FOUND");
    }

    #[tokio::test(start_paused = true)]
    async fn test_scrape_timeout() {
        let app = app(
            ScriptedActor::profile("nasa", 100).with_statuses(vec![Reply::Ok(RunStatus::Running)]),
        );

        let (status, body) = get_json(&app.router, "/scrape/nasa").await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"], "UPSTREAM_TIMEOUT");
        assert_eq!(app.alerts.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_scrape_rate_limited() {
        let app = app_with_limits(
            ScriptedActor::profile("nasa", 100),
            RateLimits {
                scrape: RateLimit::per_minute(1),
                image: RateLimit::per_minute(1),
            },
        );

        let (status, _) = get(&app.router, "/scrape/nasa").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get_json(&app.router, "/scrape/nasa").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "RATE_LIMIT_EXCEEDED");

        // Health is never limited
        let (status, _) = get(&app.router, "/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats() {
        let app = app(ScriptedActor::profile("nasa", 100));

        get(&app.router, "/scrape/nasa").await;
        get(&app.router, "/scrape/nasa").await;

        let (status, body) = get_json(&app.router, "/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cache_size"], 1);
        assert_eq!(body["hits"], 1);
        assert_eq!(body["misses"], 1);
        assert!(body["recent_alerts"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_proxy_image_relays_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pic.png"))
            .and(header_matcher("referer", "https://www.instagram.com/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(vec![0x89, b'P', b'N', b'G']),
            )
            .mount(&server)
            .await;

        let app = app(ScriptedActor::profile("nasa", 100));
        let uri = format!("/proxy-image?url={}/pic.png", server.uri());
        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body.as_ref(), &[0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_proxy_image_upstream_errors() {
        let server = MockServer::start().await;
        Mock::given(path("/gone.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(path("/broken.jpg"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let app = app(ScriptedActor::profile("nasa", 100));

        let (status, body) =
            get_json(&app.router, &format!("/proxy-image?url={}/gone.jpg", server.uri())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "IMAGE_NOT_FOUND");
        assert!(app.alerts.messages().is_empty());

        let (status, body) =
            get_json(&app.router, &format!("/proxy-image/?url={}/broken.jpg", server.uri())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "IMAGE_FETCH_FAILED");
        assert!(app.alerts.messages()[0].starts_with("IMAGE PROXY FAILED"));
    }

    #[tokio::test]
    async fn test_proxy_image_rejects_non_http_url() {
        let app = app(ScriptedActor::profile("nasa", 100));

        let (status, body) = get_json(&app.router, "/proxy-image?url=file:///etc/passwd").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_URL");
    }

    #[tokio::test]
    async fn test_proxy_image_rejects_oversized_body() {
        let server = MockServer::start().await;
        Mock::given(path("/huge.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 2048]))
            .mount(&server)
            .await;
        Mock::given(path("/edge.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 1024]))
            .mount(&server)
            .await;

        let app = app(ScriptedActor::profile("nasa", 100));

        let (status, body) =
            get_json(&app.router, &format!("/proxy-image?url={}/huge.jpg", server.uri())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "IMAGE_TOO_LARGE");
        assert!(app.alerts.messages().is_empty());

        let (status, body) =
            get(&app.router, &format!("/proxy-image?url={}/edge.jpg", server.uri())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.len(), 1024);
    }

    async fn preflight(router: &Router, origin: &str) -> axum::http::Response<Body> {
        router
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/health")
                    .header(header::ORIGIN, origin)
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_cors_origin_list() {
        // The malformed origin is skipped, the valid one still applies
        let cors = cors_layer(&["https://app.example".to_string(), "bad\norigin".to_string()]);
        let router = Router::new()
            .route("/health", axum::routing::get(health::health_check))
            .layer(cors);

        let response = preflight(&router, "https://app.example").await;
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example"
        );

        let response = preflight(&router, "https://other.example").await;
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_cors_any_origin() {
        let app = app(ScriptedActor::profile("nasa", 100));

        let response = preflight(&app.router, "https://anywhere.example").await;
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
