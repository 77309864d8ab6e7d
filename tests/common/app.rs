//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use pixkey::models::AppConfig;
use pixkey::server::{build_router, create_app_state, AppState};
use pixkey::services::InMemoryImageStore;

use super::fixtures;

/// Test application with router and direct access to services
pub struct TestApp {
    router: axum::Router,
    pub images: Arc<InMemoryImageStore>,
}

impl TestApp {
    /// Create a new test application with default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Create a test application with custom configuration
    pub fn with_config(config: AppConfig, public_url: Option<&str>) -> Self {
        let state = create_app_state(config, public_url.map(str::to_string))
            .expect("Failed to create app state");

        // Keep references for test assertions
        let images = state.images.clone();

        // Build router using shared server module (same as production)
        let router = build_router(state);

        Self { router, images }
    }

    /// Create a test app and return the state for custom router configuration
    pub fn create_state() -> AppState {
        create_app_state(AppConfig::default(), None).expect("Failed to create app state")
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: &str) -> TestResponse {
        let builder = Request::post(path).header("Content-Type", "application/json");
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Encode text and return (key, image_id)
    pub async fn encode(&self, text: &str) -> (String, String) {
        let response = self
            .post_json("/api/encode", &fixtures::encode_body(text))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());

        let json: serde_json::Value = response.json();
        let key = json["key"].as_str().unwrap().to_string();
        let image_id = json["image_id"].as_str().unwrap().to_string();
        (key, image_id)
    }

    /// Fetch the PNG bytes stored under `image_id`
    pub async fn fetch_image(&self, image_id: &str) -> Vec<u8> {
        let response = self.get(&format!("/api/image/{image_id}.png")).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
        response.body
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Check if response is a PNG image
    pub fn is_png(&self) -> bool {
        self.body.len() >= 8 && &self.body[0..8] == b"\x89PNG\r\n\x1a\n"
    }
}
