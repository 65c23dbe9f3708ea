//! API client errors

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failure of a backend call
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused, timeout, TLS)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("{message} (HTTP {status})")]
    Status {
        /// Response status
        status: StatusCode,
        /// Best message found in the body
        message: String,
    },

    /// A 2xx body did not match the expected shape
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The request could not be built
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Build a status error from a response body
    ///
    /// The message prefers `detail`, then `error`, then `message`, then
    /// per-field validation errors, then the status reason phrase.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|value| server_message(&value))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        Self::Status { status, message }
    }

    /// Response status, when there was one
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401 responses
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// True for 404 responses
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Text suitable for showing to a person
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Transport(err) if err.is_timeout() => {
                "The template service did not respond in time".to_string()
            }
            Self::Transport(err) => format!("Could not reach the template service: {err}"),
            Self::Decode(_) => "The template service returned an unexpected response".to_string(),
            Self::InvalidRequest(reason) => reason.clone(),
        }
    }
}

fn server_message(value: &Value) -> Option<String> {
    let object = value.as_object()?;

    for key in ["detail", "error", "message"] {
        if let Some(text) = object.get(key).and_then(Value::as_str) {
            if !text.trim().is_empty() {
                return Some(text.to_string());
            }
        }
    }

    // Validation errors: {"name": ["This field is required."], ...}
    let mut parts: Vec<String> = object
        .iter()
        .filter_map(|(field, messages)| {
            let first = messages.as_array()?.first()?.as_str()?;
            Some(if field == "non_field_errors" {
                first.to_string()
            } else {
                format!("{field}: {first}")
            })
        })
        .collect();
    parts.sort();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_wins() {
        let err = ApiError::from_response(
            StatusCode::UNAUTHORIZED,
            br#"{"detail": "No active account found", "error": "ignored"}"#,
        );
        assert_eq!(err.user_message(), "No active account found");
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_error_key_is_second_choice() {
        let err = ApiError::from_response(StatusCode::BAD_REQUEST, br#"{"error": "Bad input"}"#);
        assert_eq!(err.user_message(), "Bad input");
    }

    #[test]
    fn test_field_errors_are_joined() {
        let err = ApiError::from_response(
            StatusCode::BAD_REQUEST,
            br#"{"name": ["This field is required."], "non_field_errors": ["Duplicate"]}"#,
        );
        assert_eq!(err.user_message(), "Duplicate; name: This field is required.");
    }

    #[test]
    fn test_falls_back_to_reason_phrase() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, b"<html>nope</html>");
        assert_eq!(err.user_message(), "Not Found");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not Found (HTTP 404 Not Found)");
    }

    #[test]
    fn test_blank_detail_is_skipped() {
        let err = ApiError::from_response(StatusCode::FORBIDDEN, br#"{"detail": "  "}"#);
        assert_eq!(err.user_message(), "Forbidden");
    }
}
