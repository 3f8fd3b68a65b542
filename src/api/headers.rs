//! Header helpers for identifying the calling client.

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Extension trait for convenient header access.
pub trait HeaderMapExt {
    /// Get a header value as a string, returning None if missing.
    fn get_str(&self, name: &str) -> Option<&str>;

    /// Originating client address as reported by a reverse proxy.
    fn forwarded_client(&self) -> Option<&str>;
}

impl HeaderMapExt for HeaderMap {
    fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }

    fn forwarded_client(&self) -> Option<&str> {
        // Leftmost X-Forwarded-For entry is the original client
        self.get_str("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .or_else(|| self.get_str("x-real-ip"))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Key used for per-client rate limiting
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(forwarded) = headers.forwarded_client() {
            return forwarded.to_string();
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
