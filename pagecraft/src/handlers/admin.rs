//! Dashboard and template CRUD
//!
//! Every screen here sits behind the admin guard. Successful mutations queue
//! a flash message and redirect; invalid input re-renders the form with 422.

use axum::{
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};

use super::{bearer, failure, flash_or_sign_out, inline_error, ConsoleResult};
use crate::forms::{TemplateForm, ValidationErrors};
use crate::models::TemplateInput;
use crate::state::{ConsoleState, FlashMessage};
use crate::views::{DashboardView, HxTemplate, Layout, TemplateCard, TemplateFormView, TemplateListView};

/// GET /admin
pub async fn dashboard(
    State(state): State<ConsoleState>,
    OriginalUri(uri): OriginalUri,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    let role = state
        .session()
        .user()
        .map(|user| user.role_label().to_string())
        .unwrap_or_default();

    let mut view = DashboardView {
        layout: Layout::new(&state, "Dashboard"),
        role,
        template_count: 0,
        page_count: 0,
        field_count: 0,
        error: String::new(),
    };
    match state.catalog().templates(Some(&token)).await {
        Ok(templates) => {
            view.template_count = templates.len();
            view.page_count = templates.iter().map(|t| t.pages.len()).sum();
            view.field_count = templates.iter().map(|t| t.field_count()).sum();
        }
        Err(err) if err.is_unauthorized() => return Err(failure(&state, err, uri.path()).await),
        Err(err) => {
            tracing::warn!(error = %err, "could not load dashboard counts");
            view.error = err.user_message();
        }
    }
    Ok(view.render_html())
}

/// GET /admin/templates
pub async fn list(
    State(state): State<ConsoleState>,
    OriginalUri(uri): OriginalUri,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    let templates = match state.catalog().templates(Some(&token)).await {
        Ok(templates) => templates,
        Err(err) => return Err(failure(&state, err, uri.path()).await),
    };

    Ok(TemplateListView {
        layout: Layout::new(&state, "Templates"),
        templates: templates.iter().map(TemplateCard::from).collect(),
    }
    .render_html())
}

/// GET /admin/templates/new
pub async fn new_form(State(state): State<ConsoleState>) -> Response {
    TemplateFormView::new(
        Layout::new(&state, "New template"),
        &TemplateForm::default(),
        &ValidationErrors::new(),
    )
    .render_html()
}

/// POST /admin/templates/new
pub async fn create(
    State(state): State<ConsoleState>,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<TemplateForm>,
) -> ConsoleResult {
    let input = match form.to_input() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(TemplateFormView::new(Layout::new(&state, "New template"), &form, &errors)
                .render_status(StatusCode::UNPROCESSABLE_ENTITY));
        }
    };

    let token = bearer(&state, uri.path()).await?;
    match state.catalog().create(&input, Some(&token)).await {
        Ok(created) => {
            state
                .flash()
                .push(FlashMessage::success(format!("Template \"{}\" created", created.name)));
            Ok(Redirect::to(&format!("/admin/templates/{}", created.id)).into_response())
        }
        Err(err) => {
            let message = inline_error(&state, err, uri.path()).await?;
            let mut view =
                TemplateFormView::new(Layout::new(&state, "New template"), &form, &ValidationErrors::new());
            view.error = message;
            Ok(view.render_status(StatusCode::BAD_REQUEST))
        }
    }
}

/// GET /admin/templates/{id}
pub async fn edit_form(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    let template = match state.catalog().get(&id, Some(&token)).await {
        Ok(template) => template,
        Err(err) => return Err(failure(&state, err, uri.path()).await),
    };

    let form = TemplateForm::from(&TemplateInput::from(&template));
    Ok(TemplateFormView::new(
        Layout::new(&state, template.name.clone()),
        &form,
        &ValidationErrors::new(),
    )
    .editing(&template)
    .render_html())
}

/// POST /admin/templates/{id}
pub async fn update(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<TemplateForm>,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    let template = match state.catalog().get(&id, Some(&token)).await {
        Ok(template) => template,
        Err(err) => return Err(failure(&state, err, uri.path()).await),
    };

    let input = match form.to_input() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(TemplateFormView::new(Layout::new(&state, template.name.clone()), &form, &errors)
                .editing(&template)
                .render_status(StatusCode::UNPROCESSABLE_ENTITY));
        }
    };

    match state.catalog().update(&id, &input, Some(&token)).await {
        Ok(updated) => {
            state
                .flash()
                .push(FlashMessage::success(format!("Template \"{}\" saved", updated.name)));
            Ok(Redirect::to(&format!("/admin/templates/{id}")).into_response())
        }
        Err(err) => {
            let message = inline_error(&state, err, uri.path()).await?;
            let mut view = TemplateFormView::new(
                Layout::new(&state, template.name.clone()),
                &form,
                &ValidationErrors::new(),
            )
            .editing(&template);
            view.error = message;
            Ok(view.render_status(StatusCode::BAD_REQUEST))
        }
    }
}

/// POST /admin/templates/{id}/delete
pub async fn delete(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    match state.catalog().delete(&id, Some(&token)).await {
        Ok(()) => state.flash().push(FlashMessage::success("Template deleted")),
        Err(err) => flash_or_sign_out(&state, err, uri.path()).await?,
    }
    Ok(Redirect::to("/admin/templates").into_response())
}
