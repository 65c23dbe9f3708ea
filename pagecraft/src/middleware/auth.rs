//! Route guard middleware
//!
//! Wraps [`RouteGuard`] around a router. Unauthenticated browser requests are
//! redirected to `/login?next=...`; signed-in non-admins are sent home. For
//! htmx requests the redirect becomes a 401 or 403 carrying `HX-Redirect` so
//! htmx performs a full-page navigation.
//!
//! # Example
//!
//! ```rust,no_run
//! use pagecraft::middleware::AuthGuard;
//! use pagecraft::prelude::*;
//! use axum::{middleware, routing::get, Router};
//! use std::sync::Arc;
//!
//! # fn example(session: Arc<SessionStore>) {
//! let guard = AuthGuard::require_admin(session);
//! let admin: Router = Router::new()
//!     .route("/admin", get(|| async { "dashboard" }))
//!     .layer(middleware::from_fn(move |req, next| guard.clone().handle(req, next)));
//! # }
//! ```

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_htmx::{HX_REDIRECT, HX_REQUEST};
use std::sync::Arc;

use crate::guard::{Access, GuardDecision, RouteGuard};
use crate::session::SessionStore;

/// Middleware gating routes on the current session
#[derive(Clone, Debug)]
pub struct AuthGuard {
    session: Arc<SessionStore>,
    guard: RouteGuard,
    require_admin: bool,
}

impl AuthGuard {
    /// Any signed-in user may pass
    #[must_use]
    pub fn require_session(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            guard: RouteGuard::new(),
            require_admin: false,
        }
    }

    /// Only admins may pass
    #[must_use]
    pub fn require_admin(session: Arc<SessionStore>) -> Self {
        Self {
            require_admin: true,
            ..Self::require_session(session)
        }
    }

    /// Use a custom route guard, e.g. one with another login path
    #[must_use]
    pub fn with_guard(mut self, guard: RouteGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Middleware handler
    ///
    /// # Errors
    ///
    /// Returns [`AuthGuardRejection`] when the guard does not allow the
    /// request; it renders as a redirect (or 401/403 for htmx).
    pub async fn handle(self, request: Request, next: Next) -> Result<Response, AuthGuardRejection> {
        let (parts, body) = request.into_parts();

        let access = Access {
            is_authenticated: self.session.is_authenticated(),
            is_admin: self.session.has_admin_access(),
        };
        let requested = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), ToString::to_string);

        let decision = self.guard.decide(access, self.require_admin, &requested);
        if let Some(location) = self.guard.location(&decision) {
            let is_htmx = parts
                .headers
                .get(HX_REQUEST)
                .is_some_and(|value| value == "true");

            tracing::debug!(path = %requested, ?decision, "route guard redirect");
            return Err(match (decision, is_htmx) {
                (GuardDecision::RedirectHome, true) => AuthGuardRejection::Forbidden(location),
                (_, true) => AuthGuardRejection::Unauthorized(location),
                (_, false) => AuthGuardRejection::Redirect(location),
            });
        }

        let request = Request::from_parts(parts, body);
        Ok(next.run(request).await)
    }
}

/// Why the guard stopped a request; each variant carries the target location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthGuardRejection {
    /// htmx request without a session
    Unauthorized(String),
    /// htmx request from a non-admin
    Forbidden(String),
    /// Regular browser request
    Redirect(String),
}

impl IntoResponse for AuthGuardRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized(location) => (
                StatusCode::UNAUTHORIZED,
                [(HX_REDIRECT, location)],
                "Unauthorized",
            )
                .into_response(),
            Self::Forbidden(location) => (
                StatusCode::FORBIDDEN,
                [(HX_REDIRECT, location)],
                "Forbidden",
            )
                .into_response(),
            Self::Redirect(location) => Redirect::to(&location).into_response(),
        }
    }
}
