//! Response assertions for console tests

use axum_test::TestResponse;

/// Assert an `HX-Redirect` header with the expected location
///
/// # Panics
///
/// Panics if the header is missing or has a different value
pub fn assert_hx_redirect(response: &TestResponse, expected_path: &str) {
    let header = response
        .headers()
        .get("HX-Redirect")
        .expect("HX-Redirect header not found");
    let actual = header.to_str().expect("Invalid HX-Redirect header value");
    assert_eq!(
        actual, expected_path,
        "Expected HX-Redirect to {expected_path}, got {actual}"
    );
}

/// Assert a 303 redirect to the expected location
///
/// # Panics
///
/// Panics if the status is not 303 or the location differs
pub fn assert_see_other(response: &TestResponse, expected_location: &str) {
    assert_eq!(response.status_code(), axum::http::StatusCode::SEE_OTHER);
    let actual = response
        .headers()
        .get("location")
        .expect("Location header not found")
        .to_str()
        .expect("Invalid Location header value");
    assert_eq!(
        actual, expected_location,
        "Expected redirect to {expected_location}, got {actual}"
    );
}

/// Assert the body contains `needle`
///
/// # Panics
///
/// Panics if the text is missing
pub fn assert_body_contains(response: &TestResponse, needle: &str) {
    let body = response.text();
    assert!(
        body.contains(needle),
        "Expected body to contain '{needle}', got:\n{body}"
    );
}
