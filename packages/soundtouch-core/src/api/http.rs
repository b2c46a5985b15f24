//! HTTP route handlers.
//!
//! All handlers are thin - they validate the query and forward to the device
//! or to a station directory.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::api::AppState;
use crate::directory::StationDirectory;
use crate::error::{RelayError, RelayResult};
use crate::protocol_constants::{MAX_RELAY_BODY_SIZE, SERVICE_ID, XML_CONTENT_TYPE};

// ─────────────────────────────────────────────────────────────────────────────
// Request Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DeviceQuery {
    endpoint: Option<String>,
    ip: Option<String>,
}

impl DeviceQuery {
    /// Returns `(endpoint, address)`, both present and non-empty.
    fn target(&self) -> RelayResult<(&str, &str)> {
        let endpoint = self.endpoint.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let ip = self.ip.as_deref().map(str::trim).filter(|s| !s.is_empty());

        let (Some(endpoint), Some(ip)) = (endpoint, ip) else {
            log::warn!(
                "[Relay] Missing parameters: endpoint={:?}, ip={:?}",
                self.endpoint,
                self.ip
            );
            return Err(RelayError::MissingParameters);
        };

        // A relative endpoint would be spliced into the authority part of the URL
        if !endpoint.starts_with('/') {
            return Err(RelayError::InvalidEndpoint(endpoint.to_string()));
        }
        Ok((endpoint, ip))
    }
}

#[derive(Deserialize)]
struct SearchQuery {
    query: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/device", get(relay_read).post(relay_write))
        .route("/api/bose", get(relay_read).post(relay_write))
        .route("/api/search", get(search))
        .route("/api/tunein", get(search_tunein))
        .route("/api/radio-browser", get(search_radio_browser))
        .layer(DefaultBodyLimit::max(MAX_RELAY_BODY_SIZE))
        .layer(cors)
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Liveness check.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": SERVICE_ID,
        "provider": state.directory.tag(),
    }))
}

/// Builds an XML response carrying the wildcard CORS origin.
fn xml_response(status: StatusCode, body: Bytes) -> Response {
    (
        status,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE)),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
        ],
        body,
    )
        .into_response()
}

/// Forwards a GET to the device. Upstream status is normalised to 200.
async fn relay_read(
    State(state): State<AppState>,
    Query(query): Query<DeviceQuery>,
) -> RelayResult<Response> {
    let (endpoint, ip) = query.target()?;

    let res = state.device.get(ip, endpoint).await.map_err(|e| {
        log::warn!("[Relay] GET {} on {} failed: {}", endpoint, ip, e);
        RelayError::from(e)
    })?;

    if !res.is_success() {
        log::debug!(
            "[Relay] GET {} on {} answered {}; relaying as 200",
            endpoint,
            ip,
            res.status
        );
    }
    Ok(xml_response(StatusCode::OK, res.body))
}

/// Forwards a POST to the device. Upstream status and body pass through.
async fn relay_write(
    State(state): State<AppState>,
    Query(query): Query<DeviceQuery>,
    body: Bytes,
) -> RelayResult<Response> {
    let (endpoint, ip) = query.target()?;

    let res = state.device.post(ip, endpoint, body).await.map_err(|e| {
        log::warn!("[Relay] POST {} on {} failed: {}", endpoint, ip, e);
        RelayError::from(e)
    })?;

    let status = StatusCode::from_u16(res.status).map_err(|e| {
        RelayError::Internal(format!("device returned invalid status {}: {}", res.status, e))
    })?;
    Ok(xml_response(status, res.body))
}

/// Searches the configured directory.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> RelayResult<Response> {
    run_search(&state.directory, query).await
}

/// Searches TuneIn regardless of configuration.
async fn search_tunein(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> RelayResult<Response> {
    run_search(&state.tunein, query).await
}

/// Searches Radio-Browser regardless of configuration.
async fn search_radio_browser(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> RelayResult<Response> {
    run_search(&state.radio_browser, query).await
}

async fn run_search(
    directory: &Arc<dyn StationDirectory>,
    query: SearchQuery,
) -> RelayResult<Response> {
    let query = query
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| RelayError::InvalidRequest("Missing query parameter".into()))?;

    let results = directory.search(query).await;
    Ok((
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"))],
        Json(json!({
            "provider": directory.tag(),
            "results": results,
        })),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::routing::post;
    use parking_lot::Mutex;
    use reqwest::Client;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::device::DeviceHttp;
    use crate::directory::{DirectoryError, DirectoryResult, StationResult};

    // ─────────────────────────────────────────────────────────────────────────
    // Fake device
    // ─────────────────────────────────────────────────────────────────────────

    #[derive(Default)]
    struct FakeDevice {
        hits: AtomicUsize,
        bodies: Mutex<Vec<String>>,
        content_types: Mutex<Vec<String>>,
    }

    /// Starts a fake device on an ephemeral loopback port.
    async fn spawn_fake_device() -> (u16, Arc<FakeDevice>) {
        let device = Arc::new(FakeDevice::default());

        let read_device = Arc::clone(&device);
        let missing_device = Arc::clone(&device);
        let write_device = Arc::clone(&device);
        let reject_device = Arc::clone(&device);

        let app = Router::new()
            .route(
                "/now_playing",
                get(move || async move {
                    read_device.hits.fetch_add(1, Ordering::SeqCst);
                    "<nowPlaying source=\"STANDBY\"/>"
                }),
            )
            .route(
                "/nothing",
                get(move || async move {
                    missing_device.hits.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::NOT_FOUND, "<errors><error name=\"HTTP_STATUS_NOT_FOUND\"/></errors>")
                }),
            )
            .route(
                "/select",
                post(move |headers: axum::http::HeaderMap, body: String| async move {
                    write_device.hits.fetch_add(1, Ordering::SeqCst);
                    let content_type = headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    write_device.content_types.lock().push(content_type);
                    write_device.bodies.lock().push(body);
                    "<status>/select</status>"
                }),
            )
            .route(
                "/preset",
                post(move |body: String| async move {
                    reject_device.hits.fetch_add(1, Ordering::SeqCst);
                    reject_device.bodies.lock().push(body);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "<errors><error name=\"CLIENT_XML_ERROR\"/></errors>",
                    )
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (port, device)
    }

    /// A loopback port with nothing listening on it.
    async fn closed_port() -> u16 {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fake directories
    // ─────────────────────────────────────────────────────────────────────────

    struct FixedDirectory;

    #[async_trait]
    impl StationDirectory for FixedDirectory {
        fn tag(&self) -> &str {
            "TUNEIN"
        }

        async fn try_search(&self, query: &str) -> DirectoryResult<Vec<StationResult>> {
            Ok(vec![StationResult {
                name: format!("{query} FM"),
                location: "s1".into(),
                source: "TUNEIN".into(),
                category: "Radio Station".into(),
            }])
        }
    }

    struct BrokenDirectory;

    #[async_trait]
    impl StationDirectory for BrokenDirectory {
        fn tag(&self) -> &str {
            "LOCAL_INTERNET_RADIO"
        }

        async fn try_search(&self, _query: &str) -> DirectoryResult<Vec<StationResult>> {
            Err(DirectoryError::Payload("expected JSON, got XML".into()))
        }
    }

    fn app(device_port: u16) -> Router {
        let directory: Arc<dyn StationDirectory> = Arc::new(FixedDirectory);
        create_router(AppState {
            device: DeviceHttp::new(Client::new(), device_port, Duration::from_secs(2)),
            directory: Arc::clone(&directory),
            tunein: directory,
            radio_browser: Arc::new(BrokenDirectory),
            config: Arc::new(Config::default()),
        })
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        serde_json::from_str(&body_string(response).await).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_request(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(body))
            .unwrap()
    }

    fn allow_origin(response: &Response) -> Option<&str> {
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Device relay
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn read_relays_body_with_200() {
        let (port, device) = spawn_fake_device().await;
        let response = app(port)
            .oneshot(get_request("/api/device?endpoint=/now_playing&ip=127.0.0.1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(allow_origin(&response), Some("*"));
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            XML_CONTENT_TYPE
        );
        assert_eq!(body_string(response).await, "<nowPlaying source=\"STANDBY\"/>");
        assert_eq!(device.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn read_normalises_upstream_error_status() {
        let (port, _device) = spawn_fake_device().await;
        let response = app(port)
            .oneshot(get_request("/api/device?endpoint=/nothing&ip=127.0.0.1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("HTTP_STATUS_NOT_FOUND"));
    }

    #[tokio::test]
    async fn write_relays_body_verbatim() {
        let (port, device) = spawn_fake_device().await;
        let xml = r#"<ContentItem source="TUNEIN" location="s12345"><itemName>Test &amp; FM</itemName></ContentItem>"#;
        let response = app(port)
            .oneshot(post_request("/api/device?endpoint=/select&ip=127.0.0.1", xml))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(allow_origin(&response), Some("*"));
        assert_eq!(body_string(response).await, "<status>/select</status>");
        assert_eq!(device.bodies.lock().as_slice(), [xml.to_string()]);
        assert_eq!(
            device.content_types.lock().as_slice(),
            ["text/xml; charset=UTF-8".to_string()]
        );
    }

    #[tokio::test]
    async fn write_passes_upstream_status_through() {
        let (port, _device) = spawn_fake_device().await;
        let response = app(port)
            .oneshot(post_request("/api/device?endpoint=/preset&ip=127.0.0.1", "<preset/>"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.contains("CLIENT_XML_ERROR"));
    }

    #[tokio::test]
    async fn empty_write_body_is_forwarded() {
        let (port, device) = spawn_fake_device().await;
        let response = app(port)
            .oneshot(post_request("/api/device?endpoint=/select&ip=127.0.0.1", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(device.bodies.lock().as_slice(), [String::new()]);
    }

    #[tokio::test]
    async fn missing_parameters_are_rejected_without_upstream_call() {
        let (port, device) = spawn_fake_device().await;

        for uri in [
            "/api/device?endpoint=/now_playing",
            "/api/device?ip=127.0.0.1",
            "/api/device?endpoint=&ip=127.0.0.1",
            "/api/device",
        ] {
            let response = app(port).oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(allow_origin(&response), Some("*"));
            let json = body_json(response).await;
            assert_eq!(json["error"], "missing_parameters");
            assert_eq!(json["status"], 400);
        }

        let response = app(port)
            .oneshot(post_request("/api/device?ip=127.0.0.1", "<key/>"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert_eq!(device.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn relative_endpoint_is_rejected() {
        let (port, device) = spawn_fake_device().await;
        let response = app(port)
            .oneshot(get_request("/api/device?endpoint=@evil.example/x&ip=127.0.0.1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid_endpoint");
        assert_eq!(device.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unreachable_device_is_bad_gateway() {
        let port = closed_port().await;
        let response = app(port)
            .oneshot(get_request("/api/device?endpoint=/info&ip=127.0.0.1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(allow_origin(&response), Some("*"));
        let json = body_json(response).await;
        assert_eq!(json["error"], "device_unreachable");
        assert_eq!(json["status"], 502);
    }

    #[tokio::test]
    async fn legacy_bose_route_behaves_identically() {
        let (port, device) = spawn_fake_device().await;
        let response = app(port)
            .oneshot(get_request("/api/bose?endpoint=/now_playing&ip=127.0.0.1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(device.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn preflight_is_answered_permissively() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/device?endpoint=/key&ip=127.0.0.1")
            .header(header::ORIGIN, "http://remote.local")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app(closed_port().await).oneshot(request).await.unwrap();

        assert!(response.status().is_success());
        assert_eq!(allow_origin(&response), Some("*"));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Directory search
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn search_wraps_results() {
        let response = app(closed_port().await)
            .oneshot(get_request("/api/search?query=jazz"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(allow_origin(&response), Some("*"));
        let json = body_json(response).await;
        assert_eq!(json["provider"], "TUNEIN");
        assert_eq!(json["results"][0]["name"], "jazz FM");
        assert_eq!(json["results"][0]["location"], "s1");
    }

    #[tokio::test]
    async fn provider_failure_yields_empty_results() {
        let response = app(closed_port().await)
            .oneshot(get_request("/api/radio-browser?query=jazz"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["results"], json!([]));
    }

    #[tokio::test]
    async fn search_without_query_is_rejected() {
        for uri in ["/api/search", "/api/search?query=%20%20", "/api/tunein?query="] {
            let response = app(closed_port().await)
                .oneshot(get_request(uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body_json(response).await["error"], "invalid_request");
        }
    }

    #[tokio::test]
    async fn health_reports_service_and_provider() {
        let response = app(closed_port().await)
            .oneshot(get_request("/health"))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], SERVICE_ID);
        assert_eq!(json["provider"], "TUNEIN");
    }
}
