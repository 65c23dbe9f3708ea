//! Console request handlers
//!
//! - [`public`]: template picker and form wizard
//! - [`auth`]: sign in and sign out
//! - [`admin`]: dashboard and template CRUD
//! - [`pages`]: page editor and page assets
//! - [`permissions`]: template grants
//! - [`health`]: liveness and backend reachability
//!
//! Handlers fetch fresh data on every request and render server-side. A
//! backend 401 signs the operator out and redirects to the login screen.

pub mod admin;
pub mod auth;
pub mod health;
pub mod pages;
pub mod permissions;
pub mod public;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::api::ApiError;
use crate::assets::AssetError;
use crate::error::PagecraftError;
use crate::forms::WizardError;
use crate::guard::RouteGuard;
use crate::state::{ConsoleState, FlashMessage};
use crate::views::{ErrorView, HxTemplate, Layout};

/// A request that could not be served
#[derive(Debug)]
pub enum ConsoleError {
    /// The session is gone; continue at the login screen
    SignedOut {
        /// Login URL carrying the original path
        location: String,
    },
    /// Render the error page
    Page {
        /// Response status
        status: StatusCode,
        /// What went wrong
        message: String,
        /// Header data
        layout: Box<Layout>,
    },
}

impl ConsoleError {
    /// Status the response will carry
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::SignedOut { .. } => StatusCode::SEE_OTHER,
            Self::Page { status, .. } => *status,
        }
    }

    /// Error page with an explicit status
    #[must_use]
    pub fn page(state: &ConsoleState, status: StatusCode, message: impl Into<String>) -> Self {
        Self::Page {
            status,
            message: message.into(),
            layout: Box::new(Layout::new(state, "Error")),
        }
    }

    /// 404 page
    #[must_use]
    pub fn not_found(state: &ConsoleState, what: &str) -> Self {
        Self::page(state, StatusCode::NOT_FOUND, format!("{what} was not found"))
    }
}

impl IntoResponse for ConsoleError {
    fn into_response(self) -> Response {
        match self {
            Self::SignedOut { location } => Redirect::to(&location).into_response(),
            Self::Page {
                status,
                message,
                layout,
            } => ErrorView {
                layout: *layout,
                status: status.as_u16(),
                message,
            }
            .render_status(status),
        }
    }
}

/// Result type for console handlers
pub type ConsoleResult<T = Response> = Result<T, ConsoleError>;

/// A usable bearer token, or a redirect to the login screen
pub(crate) async fn bearer(state: &ConsoleState, requested: &str) -> ConsoleResult<String> {
    state.session().access_token().await.map_err(|err| {
        tracing::info!(error = %err, path = %requested, "no usable session");
        signed_out(requested)
    })
}

/// Turn a failure into a console error, signing out on a backend 401
pub(crate) async fn failure(
    state: &ConsoleState,
    err: impl Into<PagecraftError>,
    requested: &str,
) -> ConsoleError {
    let err = err.into();
    if err.is_unauthorized() {
        state.session().expire().await;
        return signed_out(requested);
    }

    let status = match &err {
        PagecraftError::Api(api)
        | PagecraftError::Asset(AssetError::Api(api))
        | PagecraftError::Wizard(WizardError::Render(api)) => backend_status(api),
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!(error = %err, path = %requested, %status, "request failed");
    ConsoleError::page(state, status, err.user_message())
}

/// Signs out on a 401 and returns the redirect; other failures become a
/// flash message so the caller can re-render
pub(crate) async fn flash_or_sign_out(
    state: &ConsoleState,
    err: impl Into<PagecraftError>,
    requested: &str,
) -> ConsoleResult<()> {
    let err = err.into();
    if err.is_unauthorized() {
        state.session().expire().await;
        return Err(signed_out(requested));
    }
    tracing::warn!(error = %err, path = %requested, "operation failed");
    state.flash().push(FlashMessage::error(err.user_message()));
    Ok(())
}

/// Signs out on a 401; otherwise returns the message to show inline
pub(crate) async fn inline_error(
    state: &ConsoleState,
    err: impl Into<PagecraftError>,
    requested: &str,
) -> ConsoleResult<String> {
    let err = err.into();
    if err.is_unauthorized() {
        state.session().expire().await;
        return Err(signed_out(requested));
    }
    tracing::warn!(error = %err, path = %requested, "operation failed");
    Ok(err.user_message())
}

fn backend_status(err: &ApiError) -> StatusCode {
    match err.status() {
        Some(StatusCode::NOT_FOUND) => StatusCode::NOT_FOUND,
        Some(StatusCode::FORBIDDEN) => StatusCode::FORBIDDEN,
        Some(status) if status.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn signed_out(requested: &str) -> ConsoleError {
    ConsoleError::SignedOut {
        location: RouteGuard::new().login_location(requested),
    }
}
