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

/// Assert response is a valid PNG image
pub fn assert_png(response: &TestResponse) {
    assert_ok(response);
    assert!(
        response.is_png(),
        "Expected PNG image, got {} bytes starting with {:?}",
        response.body.len(),
        &response.body[..8.min(response.body.len())]
    );

    // Check Content-Type header
    let content_type = response
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok());
    assert_eq!(
        content_type,
        Some("image/png"),
        "Expected Content-Type: image/png"
    );
}

/// Assert the JSON error shape with the expected status
pub fn assert_json_error(response: &TestResponse, expected: StatusCode) {
    assert_status(response, expected);
    let json: serde_json::Value = response.json();
    assert_eq!(json["success"], false);
    assert_eq!(
        json["status"].as_u64(),
        Some(expected.as_u16() as u64),
        "Full response: {}",
        serde_json::to_string_pretty(&json).unwrap()
    );
    assert!(json["error"].is_string(), "Expected error message");
}

/// Assert the error message mentions `needle`
pub fn assert_error_contains(response: &TestResponse, needle: &str) {
    let json: serde_json::Value = response.json();
    let message = json["error"].as_str().unwrap_or_default();
    assert!(
        message.contains(needle),
        "Expected error containing {needle:?}, got {message:?}"
    );
}

/// Assert encode response is valid and return its parsed body
pub fn assert_valid_encode_response(response: &TestResponse) -> serde_json::Value {
    assert_ok(response);
    let json: serde_json::Value = response.json();

    assert_eq!(json["success"], true);
    assert!(json["key"].is_string(), "Expected key");
    assert!(json["width"].as_u64().unwrap_or(0) > 0, "Expected width");
    assert!(json["height"].as_u64().unwrap_or(0) > 1, "Expected decoy row");

    let image_id = json["image_id"].as_str().expect("Expected image_id");
    assert_eq!(image_id.len(), 16, "Image id should be 16 hex characters");
    assert!(json["image_url"]
        .as_str()
        .unwrap_or_default()
        .ends_with(&format!("/api/image/{image_id}.png")));

    json
}
