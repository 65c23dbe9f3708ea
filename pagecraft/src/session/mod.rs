//! Authentication lifecycle
//!
//! ```text
//! Unauthenticated ──login──▶ Authenticating ──ok──▶ Authenticated
//!        ▲                        │                     │
//!        │◀────────failure────────┘          exp within leeway
//!        │                                              ▼
//!        │◀──────failure────── Refreshing ◀──── TokenExpiring
//!                                  │
//!                                  └──ok──▶ Authenticated
//! ```
//!
//! The session is replaced wholesale under a short write lock; that lock is
//! never held across a network call. Refreshes are single-flight: a separate
//! async gate admits one exchange at a time, and callers queued behind it
//! re-check the token before starting another. Callers that need a bearer
//! token await [`SessionStore::access_token`], which completes any due
//! refresh before handing the token out.

mod store;
mod token;

use chrono::{Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::api::{ApiClient, ApiError};
use crate::models::User;
use crate::observability::token_prefix;

#[cfg(feature = "redis")]
pub use store::RedisTokenStore;
pub use store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore, TOKENS_KEY};
#[cfg(test)]
pub use store::MockTokenStore;
pub use token::{decode_expiry, expires_within, TokenError};

/// Default refresh leeway
pub const DEFAULT_REFRESH_LEEWAY_SECS: i64 = 30;

/// An authenticated session: the token pair and who it belongs to
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for API calls
    pub access: String,
    /// Token exchanged for new access tokens
    pub refresh: String,
    /// The signed-in account
    pub user: User,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access", &token_prefix(&self.access))
            .field("refresh", &"[redacted]")
            .field("user", &self.user)
            .finish()
    }
}

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session
    #[default]
    Unauthenticated,
    /// A login request is in flight
    Authenticating,
    /// A usable session is installed
    Authenticated,
    /// The access token is within the refresh leeway
    TokenExpiring,
    /// A refresh request is in flight
    Refreshing,
}

impl SessionState {
    /// Lowercase label for logs and views
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::TokenExpiring => "token_expiring",
            Self::Refreshing => "refreshing",
        }
    }
}

/// Session lifecycle failures
///
/// Every variant except [`SessionError::NotAuthenticated`] leaves a message
/// in [`SessionStore::last_error`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session is installed
    #[error("not signed in")]
    NotAuthenticated,

    /// The login request failed
    #[error("login failed: {0}")]
    Login(#[source] ApiError),

    /// The refresh request failed; the session was torn down
    #[error("token refresh failed: {0}")]
    Refresh(#[source] ApiError),

    /// The stored access token could not be read
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Persistence failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// Text suitable for showing to a person
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Please sign in to continue".to_string(),
            Self::Login(err) => format!("Login failed: {}", err.user_message()),
            Self::Refresh(err) => format!("Token refresh failed: {}", err.user_message()),
            Self::Token(err) => format!("Token decode error: {err}"),
            Self::Store(err) => format!("Could not access saved session: {err}"),
        }
    }
}

#[derive(Default)]
struct Inner {
    state: SessionState,
    session: Option<Session>,
    last_error: Option<String>,
}

/// Owns the current session and drives its transitions
pub struct SessionStore {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    leeway: Duration,
    inner: RwLock<Inner>,
    refresh_gate: Mutex<()>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("SessionStore")
            .field("state", &inner.state)
            .field("session", &inner.session)
            .field("leeway", &self.leeway)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// A store with no session, persisting through `tokens`
    pub fn new(api: ApiClient, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            tokens,
            leeway: Duration::seconds(DEFAULT_REFRESH_LEEWAY_SECS),
            inner: RwLock::new(Inner::default()),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Refresh tokens that expire within `seconds`
    #[must_use]
    pub fn with_refresh_leeway(mut self, seconds: i64) -> Self {
        self.leeway = Duration::seconds(seconds.max(0));
        self
    }

    /// The API client this store authenticates against
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Resume a persisted session
    ///
    /// A stored access token that is still valid is installed without any
    /// network call. An expired one triggers exactly one refresh attempt. A
    /// token that cannot be decoded clears storage and reports the error.
    pub async fn restore(&self) -> Result<SessionState, SessionError> {
        let stored = match self.tokens.load().await {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                tracing::debug!("no stored session");
                return Ok(SessionState::Unauthenticated);
            }
            Err(err) => {
                tracing::warn!(error = %err, "stored session unreadable, discarding");
                self.clear_persisted().await;
                return Err(self.fail(err.into()));
            }
        };

        let expiry = match decode_expiry(&stored.access) {
            Ok(expiry) => expiry,
            Err(err) => {
                tracing::warn!(error = %err, "stored access token undecodable, discarding");
                self.clear_persisted().await;
                self.install(SessionState::Unauthenticated, None);
                return Err(self.fail(err.into()));
            }
        };

        if expiry > Utc::now() {
            tracing::info!(username = %stored.user.username, "restored session");
            self.install(SessionState::Authenticated, Some(stored));
            return Ok(SessionState::Authenticated);
        }

        tracing::info!(username = %stored.user.username, "stored access token expired, refreshing");
        self.install(SessionState::TokenExpiring, Some(stored));
        self.refresh().await?;
        Ok(self.state())
    }

    /// Exchange credentials for a session
    ///
    /// The session is persisted before it is installed. On failure the prior
    /// session, if any, is left untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, SessionError> {
        let prior = {
            let mut inner = self.inner.write();
            let prior = inner.state;
            inner.state = SessionState::Authenticating;
            prior
        };
        tracing::info!(%username, "signing in");

        let response = match self.api.login(username, password).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%username, error = %err, "login rejected");
                self.inner.write().state = prior;
                return Err(self.fail(SessionError::Login(err)));
            }
        };

        let session = Session {
            access: response.access,
            refresh: response.refresh,
            user: response.user,
        };

        if let Err(err) = self.tokens.save(&session).await {
            tracing::error!(error = %err, "could not persist session");
            self.inner.write().state = prior;
            return Err(self.fail(err.into()));
        }

        let user = session.user.clone();
        {
            let mut inner = self.inner.write();
            inner.state = SessionState::Authenticated;
            inner.session = Some(session);
            inner.last_error = None;
        }
        tracing::info!(username = %user.username, admin = user.has_admin_access(), "signed in");
        Ok(user)
    }

    /// Exchange the refresh token for a new access token
    ///
    /// The refresh token and user are kept. Any failure tears the session
    /// down; nothing is retried.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let _gate = self.refresh_gate.lock().await;
        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> Result<(), SessionError> {
        let current = {
            let mut inner = self.inner.write();
            let Some(current) = inner.session.clone() else {
                return Err(SessionError::NotAuthenticated);
            };
            inner.state = SessionState::Refreshing;
            current
        };
        tracing::debug!(access = %token_prefix(&current.access), "refreshing access token");

        let response = match self.api.refresh(&current.refresh).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, "token refresh failed, signing out");
                self.teardown().await;
                return Err(self.fail(SessionError::Refresh(err)));
            }
        };

        let renewed = Session {
            access: response.access,
            ..current.clone()
        };

        {
            let mut inner = self.inner.write();
            // A logout that raced this refresh wins
            let still_current = inner
                .session
                .as_ref()
                .is_some_and(|session| session.refresh == current.refresh);
            if !still_current {
                return Err(SessionError::NotAuthenticated);
            }
            inner.session = Some(renewed.clone());
            inner.state = SessionState::Authenticated;
        }
        tracing::info!("access token refreshed");

        if let Err(err) = self.tokens.save(&renewed).await {
            tracing::warn!(error = %err, "could not persist refreshed session");
        }
        Ok(())
    }

    /// End the session
    ///
    /// Server-side invalidation is best effort; local state is always cleared.
    pub async fn logout(&self) {
        let current = self.inner.read().session.clone();
        if let Some(current) = current {
            if let Err(err) = self.api.logout(&current.refresh, Some(&current.access)).await {
                tracing::warn!(error = %err, "server-side logout failed");
            }
            tracing::info!(username = %current.user.username, "signed out");
        }
        self.teardown().await;
    }

    /// A bearer token fit for immediate use
    ///
    /// Refreshes first when the token expires within the leeway. Tokens that
    /// are not JWTs are handed out as-is and left to the backend to judge.
    pub async fn access_token(&self) -> Result<String, SessionError> {
        if let Some(access) = self.usable_access()? {
            return Ok(access);
        }

        {
            let mut inner = self.inner.write();
            if inner.state == SessionState::Authenticated {
                inner.state = SessionState::TokenExpiring;
            }
        }

        let _gate = self.refresh_gate.lock().await;
        // Whoever held the gate may already have renewed the token
        if let Some(access) = self.usable_access()? {
            return Ok(access);
        }
        self.refresh_locked().await?;

        self.current_access().ok_or(SessionError::NotAuthenticated)
    }

    fn current_access(&self) -> Option<String> {
        self.inner
            .read()
            .session
            .as_ref()
            .map(|session| session.access.clone())
    }

    /// The access token unless it is due for refresh
    fn usable_access(&self) -> Result<Option<String>, SessionError> {
        let access = self.current_access().ok_or(SessionError::NotAuthenticated)?;
        match expires_within(&access, Utc::now(), self.leeway) {
            Ok(false) => Ok(Some(access)),
            Err(err) => {
                tracing::debug!(error = %err, "access token is opaque, using as-is");
                Ok(Some(access))
            }
            Ok(true) => Ok(None),
        }
    }

    /// A bearer token when signed in, `None` for anonymous calls
    ///
    /// A failed refresh degrades to an anonymous call.
    pub async fn optional_access_token(&self) -> Option<String> {
        if !self.is_authenticated() {
            return None;
        }
        self.access_token().await.ok()
    }

    /// True when a user is present and is an admin
    #[must_use]
    pub fn has_admin_access(&self) -> bool {
        self.inner
            .read()
            .session
            .as_ref()
            .is_some_and(|session| session.user.has_admin_access())
    }

    /// True when a session is installed
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.read().session.is_some()
    }

    /// A copy of the current session
    #[must_use]
    pub fn snapshot(&self) -> Option<Session> {
        self.inner.read().session.clone()
    }

    /// The signed-in user
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner.read().session.as_ref().map(|s| s.user.clone())
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.read().state
    }

    /// The most recent authentication error, kept until the next login
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.inner.read().last_error.clone()
    }

    /// Forget the last error
    pub fn clear_error(&self) {
        self.inner.write().last_error = None;
    }

    /// Drop a session the backend no longer accepts
    ///
    /// Called when an authenticated call comes back 401.
    pub async fn expire(&self) {
        if !self.is_authenticated() {
            return;
        }
        tracing::info!("backend rejected the session, signing out");
        self.teardown().await;
        self.inner.write().last_error =
            Some("Your session has expired. Please sign in again.".to_string());
    }

    fn install(&self, state: SessionState, session: Option<Session>) {
        let mut inner = self.inner.write();
        inner.state = state;
        inner.session = session;
    }

    fn fail(&self, err: SessionError) -> SessionError {
        self.inner.write().last_error = Some(err.user_message());
        err
    }

    async fn teardown(&self) {
        self.install(SessionState::Unauthenticated, None);
        self.clear_persisted().await;
    }

    async fn clear_persisted(&self) {
        if let Err(err) = self.tokens.clear().await {
            tracing::warn!(error = %err, "could not clear stored session");
        }
    }
}
