//! Assertion helpers for tests.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use super::app::TestResponse;

/// Assert response has expected status code
pub fn assert_status(response: &TestResponse, expected: StatusCode) {
    assert_eq!(
        response.status, expected,
        "Expected status {}, got {}. Body: {}",
        expected,
        response.status,
        response.text()
    );
}

/// Assert response is OK (200)
pub fn assert_ok(response: &TestResponse) {
    assert_status(response, StatusCode::OK);
}

/// Assert response is a JPEG served as a download
pub fn assert_jpeg(response: &TestResponse) {
    assert_ok(response);
    assert!(
        response.is_jpeg(),
        "Expected JPEG image, got {} bytes starting with {:?}",
        response.body.len(),
        &response.body[..4.min(response.body.len())]
    );
    assert_eq!(response.header("content-type"), Some("image/jpeg"));
}

/// Assert a JSON error body `{status, error}` with the given status
pub fn assert_json_error(response: &TestResponse, expected: StatusCode) -> String {
    assert_status(response, expected);
    assert_eq!(response.header("content-type"), Some("application/json"));

    let json: serde_json::Value = response.json();
    assert_eq!(
        json["status"].as_u64(),
        Some(expected.as_u16() as u64),
        "Full response: {json}"
    );
    json["error"]
        .as_str()
        .expect("error message should be a string")
        .to_string()
}

/// Assert every security header is present
pub fn assert_security_headers(response: &TestResponse) {
    let expected = [
        ("x-content-type-options", "nosniff"),
        ("x-frame-options", "DENY"),
        ("x-xss-protection", "1; mode=block"),
        ("referrer-policy", "strict-origin-when-cross-origin"),
        ("cache-control", "no-cache, no-store, must-revalidate"),
    ];
    for (name, value) in expected {
        assert_eq!(response.header(name), Some(value), "header {name}");
    }
}
