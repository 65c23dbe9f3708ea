use serde::{Deserialize, Serialize};
use std::fmt;

/// The signed-in account as reported by the login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend identifier
    #[serde(default, deserialize_with = "super::id::option::deserialize")]
    pub id: Option<String>,

    /// Login name
    pub username: String,

    /// Free-form role; `"admin"` grants console access
    #[serde(default)]
    pub role: Option<String>,

    /// Admin flag (older backends send `is_staff`)
    #[serde(default, alias = "is_staff")]
    pub is_admin: bool,

    /// Contact address, when the backend shares it
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    /// Build a user with only a name, used by tests and the CLI
    #[must_use]
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            role: None,
            is_admin: false,
            email: None,
        }
    }

    /// True when the account may use admin screens
    #[must_use]
    pub fn has_admin_access(&self) -> bool {
        self.is_admin || self.role.as_deref() == Some("admin")
    }

    /// Role label for display
    #[must_use]
    pub fn role_label(&self) -> &str {
        if self.has_admin_access() {
            "admin"
        } else {
            self.role.as_deref().unwrap_or("user")
        }
    }
}

/// Body of `POST /auth/login/`
#[derive(Clone, Serialize)]
pub struct LoginRequest<'a> {
    /// Login name
    pub username: &'a str,
    /// Plain password, sent once over the transport
    pub password: &'a str,
}

impl fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Response of `POST /auth/login/`
#[derive(Clone, Deserialize)]
pub struct LoginResponse {
    /// Short-lived bearer token
    pub access: String,
    /// Long-lived token used to mint new access tokens
    pub refresh: String,
    /// The account that signed in
    pub user: User,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /auth/refresh/`
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    /// Refresh token to exchange
    pub refresh: &'a str,
}

/// Response of `POST /auth/refresh/`
#[derive(Deserialize)]
pub struct RefreshResponse {
    /// Replacement access token
    pub access: String,
}

/// Body of `POST /auth/logout/`
#[derive(Serialize)]
pub struct LogoutRequest<'a> {
    /// Refresh token to invalidate server-side
    pub refresh: &'a str,
}
