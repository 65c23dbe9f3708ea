//! Access token expiry inspection
//!
//! The console never verifies token signatures; the backend does that on
//! every call. Locally we only read the `exp` claim to decide whether a
//! refresh is due.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

/// Failure to read a token's expiry
#[derive(Debug, Error)]
pub enum TokenError {
    /// Not a JWT, or the payload has no numeric `exp`
    #[error("token decode error: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),

    /// `exp` is outside the representable time range
    #[error("token expiry {0} is out of range")]
    ExpiryOutOfRange(i64),
}

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

/// Read the `exp` claim without checking the signature
pub fn decode_expiry(token: &str) -> Result<DateTime<Utc>, TokenError> {
    let header = decode_header(token)?;

    let mut validation = Validation::new(header.alg);
    #[allow(deprecated)]
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let data = decode::<ExpiryClaim>(token, &DecodingKey::from_secret(b""), &validation)?;
    DateTime::from_timestamp(data.claims.exp, 0).ok_or(TokenError::ExpiryOutOfRange(data.claims.exp))
}

/// True when `token` expires at or before `now + leeway`
pub fn expires_within(token: &str, now: DateTime<Utc>, leeway: Duration) -> Result<bool, TokenError> {
    Ok(decode_expiry(token)? <= now + leeway)
}
