//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::api;
use crate::error::ApiError;
use crate::models::AppConfig;
use crate::services::{ImageService, InMemoryRateLimiter, RateLimitStore};

/// Room for multipart boundaries and text fields on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub images: Arc<ImageService>,
    pub rate_limiter: Arc<dyn RateLimitStore>,
}

/// Create application state with the in-memory rate limiter.
pub fn create_app_state(config: AppConfig) -> AppState {
    let limiter = InMemoryRateLimiter::new(
        config.max_requests_per_minute,
        Duration::from_secs(config.rate_limit_window_secs),
    );
    create_app_state_with_limiter(config, Arc::new(limiter))
}

/// Create application state around a caller-supplied rate limit store.
pub fn create_app_state_with_limiter(
    config: AppConfig,
    rate_limiter: Arc<dyn RateLimitStore>,
) -> AppState {
    let images = Arc::new(ImageService::new(&config));
    AppState {
        config: Arc::new(config),
        images,
        rate_limiter,
    }
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests. The image
/// endpoints are rate limited; every response gets the security headers.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_file_size.saturating_add(MULTIPART_OVERHEAD);
    let cors = cors_layer(&state.config);

    let image_routes = Router::new()
        .route("/process-image/", post(handle_process_image))
        .route("/convert-image/", post(handle_convert_image))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .merge(image_routes)
        .route("/health", get(api::handle_health))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
}

/// Any origin in development, the configured list in production.
/// Credentials are never allowed.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([
            header::CONTENT_DISPOSITION,
            api::process::X_FINAL_SIZE_KB,
            api::process::X_FINAL_QUALITY,
            api::process::X_FINAL_DIMENSIONS,
            api::process::X_SEARCH_ITERATIONS,
            api::process::X_SEARCH_CONVERGED,
        ]);

    if !config.is_production() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%origin, %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

// Wrapper handlers to extract state components for the underlying API handlers

async fn handle_process_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    api::handle_process_image(State(state.config), State(state.images), multipart).await
}

async fn handle_convert_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    api::handle_convert_image(State(state.config), State(state.images), multipart).await
}

async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    api::enforce_rate_limit(
        state.rate_limiter,
        state.config.trust_proxy_headers,
        request,
        next,
    )
    .await
}
