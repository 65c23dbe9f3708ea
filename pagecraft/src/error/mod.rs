//! Crate-wide error type

use thiserror::Error;

use crate::api::ApiError;
use crate::assets::AssetError;
use crate::config::ConfigError;
use crate::forms::WizardError;
use crate::session::{SessionError, StoreError};

/// Any failure a pagecraft operation can report
#[derive(Debug, Error)]
pub enum PagecraftError {
    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Authentication lifecycle failure
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Token persistence failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Asset upload or delete failure
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Form wizard failure
    #[error(transparent)]
    Wizard(#[from] WizardError),
}

impl PagecraftError {
    /// Text suitable for showing to a person
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => format!("Configuration error: {err}"),
            Self::Api(err) => err.user_message(),
            Self::Session(err) => err.user_message(),
            Self::Store(err) => format!("Could not access saved session: {err}"),
            Self::Asset(err) => err.user_message(),
            Self::Wizard(err) => err.user_message(),
        }
    }

    /// True when the backend rejected the bearer token
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Api(err) => err.is_unauthorized(),
            Self::Asset(AssetError::Api(err)) | Self::Wizard(WizardError::Render(err)) => {
                err.is_unauthorized()
            }
            Self::Session(SessionError::NotAuthenticated | SessionError::Refresh(_)) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_unauthorized_is_detected_through_wrappers() {
        let api = || ApiError::from_response(StatusCode::UNAUTHORIZED, br#"{"detail": "expired"}"#);

        assert!(PagecraftError::from(api()).is_unauthorized());
        assert!(PagecraftError::from(AssetError::Api(api())).is_unauthorized());
        assert!(PagecraftError::from(WizardError::Render(api())).is_unauthorized());
        assert!(PagecraftError::from(SessionError::NotAuthenticated).is_unauthorized());
        assert!(!PagecraftError::from(WizardError::NoTemplate).is_unauthorized());
    }

    #[test]
    fn test_user_message_delegates() {
        let err = PagecraftError::from(ApiError::from_response(
            StatusCode::BAD_REQUEST,
            br#"{"error": "Bad template"}"#,
        ));
        assert_eq!(err.user_message(), "Bad template");
    }
}
