//! Console routes
//!
//! | Path | Handler |
//! |------|---------|
//! | `GET /` | template picker |
//! | `GET, POST /wizard/{id}` | form wizard |
//! | `GET, POST /login`, `POST /logout` | sign in and out |
//! | `GET /healthz`, `GET /healthz/live` | health checks |
//! | `/admin/...` | dashboard, templates, pages, assets, permissions (admins only) |
//!
//! Every POST passes the CSRF layer first; see [`crate::middleware::csrf`].

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, auth, health, pages, permissions, public};
use crate::middleware::{AuthGuard, CsrfLayer};
use crate::state::ConsoleState;

// Room for multipart framing around the largest accepted file
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

/// Build the console router
///
/// # Example
///
/// ```rust,no_run
/// use pagecraft::{config::PagecraftConfig, router::build_router, state::ConsoleState};
///
/// # fn example() -> Result<(), pagecraft::error::PagecraftError> {
/// let state = ConsoleState::new(PagecraftConfig::default())?;
/// let app: axum::Router = build_router(state);
/// # Ok(())
/// # }
/// ```
pub fn build_router(state: ConsoleState) -> Router {
    let body_limit = usize::try_from(state.uploads().max_size_bytes() + MULTIPART_OVERHEAD)
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/", get(public::home))
        .route("/wizard/{id}", get(public::start).post(public::step))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/healthz", get(health::health_check))
        .route("/healthz/live", get(health::liveness))
        .merge(admin_routes(&state))
        .layer(CsrfLayer::new(state.csrf().clone(), body_limit))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn admin_routes(state: &ConsoleState) -> Router<ConsoleState> {
    let guard = AuthGuard::require_admin(state.session().clone());

    Router::new()
        .route("/admin", get(admin::dashboard))
        .route("/admin/templates", get(admin::list))
        .route("/admin/templates/new", get(admin::new_form).post(admin::create))
        .route("/admin/templates/{id}", get(admin::edit_form).post(admin::update))
        .route("/admin/templates/{id}/delete", post(admin::delete))
        .route(
            "/admin/templates/{id}/pages/new",
            get(pages::new_form).post(pages::create),
        )
        .route(
            "/admin/templates/{id}/pages/{page}",
            get(pages::edit_form).post(pages::update),
        )
        .route("/admin/templates/{id}/pages/{page}/delete", post(pages::delete))
        .route(
            "/admin/templates/{id}/pages/{page}/assets",
            get(pages::assets).post(pages::upload),
        )
        .route(
            "/admin/templates/{id}/pages/{page}/assets/{asset}/delete",
            post(pages::delete_asset),
        )
        .route(
            "/admin/templates/{id}/permissions",
            get(permissions::list).post(permissions::add),
        )
        .route(
            "/admin/templates/{id}/permissions/{permission}/delete",
            post(permissions::remove),
        )
        .route_layer(middleware::from_fn(move |req, next| {
            guard.clone().handle(req, next)
        }))
}
