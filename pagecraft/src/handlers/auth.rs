//! Sign in and sign out

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::forms::{LoginForm, ValidationErrors};
use crate::guard::{safe_next, HOME_PATH, LOGIN_PATH};
use crate::state::{ConsoleState, FlashMessage};
use crate::views::{HxTemplate, Layout, LoginView};

/// Where to go after signing in
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    /// Local path the guard stopped
    pub next: Option<String>,
}

/// GET /login
pub async fn login_form(
    State(state): State<ConsoleState>,
    Query(query): Query<NextQuery>,
) -> Response {
    if state.session().is_authenticated() {
        return Redirect::to(&landing(&state, query.next.as_deref())).into_response();
    }

    let error = state.session().last_error().unwrap_or_default();
    state.session().clear_error();

    LoginView {
        layout: Layout::new(&state, "Sign in"),
        username: String::new(),
        next: safe_next(query.next.as_deref()).unwrap_or_default().to_string(),
        error,
        username_error: String::new(),
        password_error: String::new(),
    }
    .render_html()
}

/// POST /login
///
/// Blank fields re-render with 422; rejected credentials with 401.
pub async fn login(State(state): State<ConsoleState>, Form(form): Form<LoginForm>) -> Response {
    let echo = LoginEcho {
        username: form.username.trim().to_string(),
        next: form.next.clone().unwrap_or_default(),
    };
    let form = match form.checked() {
        Ok(form) => form,
        Err(errors) => {
            return login_view(&state, &echo, &errors, String::new())
                .render_status(StatusCode::UNPROCESSABLE_ENTITY);
        }
    };

    match state.session().login(&form.username, &form.password).await {
        Ok(user) => {
            state
                .flash()
                .push(FlashMessage::success(format!("Signed in as {}", user.username)));
            Redirect::to(&landing(&state, form.next.as_deref())).into_response()
        }
        Err(err) => {
            state.session().clear_error();
            login_view(&state, &echo, &ValidationErrors::new(), err.user_message())
                .render_status(StatusCode::UNAUTHORIZED)
        }
    }
}

/// POST /logout
pub async fn logout(State(state): State<ConsoleState>) -> Redirect {
    state.session().logout().await;
    state.flash().push(FlashMessage::info("You have been signed out"));
    Redirect::to(LOGIN_PATH)
}

struct LoginEcho {
    username: String,
    next: String,
}

fn login_view(
    state: &ConsoleState,
    echo: &LoginEcho,
    errors: &ValidationErrors,
    error: String,
) -> LoginView {
    LoginView {
        layout: Layout::new(state, "Sign in"),
        username: echo.username.clone(),
        next: safe_next(Some(&echo.next)).unwrap_or_default().to_string(),
        error,
        username_error: errors.first_message("username"),
        password_error: errors.first_message("password"),
    }
}

fn landing(state: &ConsoleState, next: Option<&str>) -> String {
    if let Some(next) = safe_next(next) {
        return next.to_string();
    }
    if state.session().has_admin_access() {
        "/admin".to_string()
    } else {
        HOME_PATH.to_string()
    }
}
