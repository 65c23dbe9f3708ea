//! Tokens with controlled claims

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

const SECRET: &str = "pagecraft-test-secret";

fn sign(secret: &str, claims: &Value) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// HS256 token expiring `seconds` from now (negative for the past)
pub fn expiring_in(seconds: i64) -> String {
    signed_with(SECRET, seconds)
}

/// Token signed with an arbitrary secret
pub fn signed_with(secret: &str, seconds: i64) -> String {
    sign(
        secret,
        &json!({"sub": "1", "exp": Utc::now().timestamp() + seconds}),
    )
}

/// Token carrying an `aud` claim
pub fn with_audience(audience: &str, seconds: i64) -> String {
    sign(
        SECRET,
        &json!({"sub": "1", "aud": audience, "exp": Utc::now().timestamp() + seconds}),
    )
}

/// Token with no `exp` claim
pub fn without_expiry() -> String {
    sign(SECRET, &json!({"sub": "1"}))
}
