use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;

use super::headers::client_key;
use crate::error::ApiError;
use crate::services::{RateDecision, RateLimitStore};

/// Reject requests from clients that exhausted their budget
///
/// Called from the router's middleware with the store and proxy policy
/// taken from the application state.
pub async fn enforce_rate_limit(
    store: Arc<dyn RateLimitStore>,
    trust_proxy: bool,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_key(request.headers(), peer, trust_proxy);

    match store.check(&client).await {
        RateDecision::Allowed { remaining } => {
            tracing::trace!(client = %client, remaining, "Request admitted");
            Ok(next.run(request).await)
        }
        RateDecision::Limited { retry_after } => {
            tracing::warn!(client = %client, ?retry_after, "Rate limit exceeded");
            Err(ApiError::RateLimited {
                // Rounded up to whole seconds
                retry_after_secs: retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0),
            })
        }
    }
}
