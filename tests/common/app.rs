//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use imgfit::models::AppConfig;
use imgfit::server::{build_router, create_app_state, create_app_state_with_limiter};
use imgfit::services::RateLimitStore;

use super::fixtures::MultipartBody;

/// Configuration used by most tests: small dimension cap so the search
/// never scales far, and a rate limit no test reaches by accident
pub fn test_config() -> AppConfig {
    AppConfig {
        max_image_width: 1024,
        max_image_height: 1024,
        max_requests_per_minute: 1000,
        max_concurrent_jobs: 2,
        ..AppConfig::default()
    }
}

/// Test application wrapping the production router
pub struct TestApp {
    router: axum::Router,
}

impl TestApp {
    /// Create a new test application with [`test_config`]
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let state = create_app_state(config);
        Self {
            router: build_router(state),
        }
    }

    /// Build the app around a custom rate limit store
    pub fn with_rate_limiter(config: AppConfig, limiter: Arc<dyn RateLimitStore>) -> Self {
        let state = create_app_state_with_limiter(config, limiter);
        Self {
            router: build_router(state),
        }
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// POST a multipart form
    pub async fn post_form(&self, path: &str, form: MultipartBody) -> TestResponse {
        self.post_form_with_headers(path, form, &[]).await
    }

    /// POST a multipart form with custom headers
    pub async fn post_form_with_headers(
        &self,
        path: &str,
        form: MultipartBody,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::post(path).header("Content-Type", form.content_type());
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.request(builder.body(Body::from(form.finish())).unwrap())
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

    /// Header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Check if response is a JPEG image
    pub fn is_jpeg(&self) -> bool {
        self.body.len() >= 3 && self.body[0..3] == [0xFF, 0xD8, 0xFF]
    }
}
