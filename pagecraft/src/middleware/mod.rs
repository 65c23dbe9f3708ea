//! Middleware layers for the console
//!
//! - Route guard (session and admin checks in front of admin screens)
//! - CSRF protection for every state-changing request

pub mod auth;
pub mod csrf;

pub use auth::{AuthGuard, AuthGuardRejection};
pub use csrf::{CsrfLayer, CsrfToken, CSRF_FORM_FIELD, CSRF_HEADER_NAME};
