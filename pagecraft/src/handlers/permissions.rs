//! Template grants
//!
//! The user and group pickers are conveniences; if either list cannot be
//! loaded the screen still renders with that picker empty.

use axum::{
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Form,
};

use super::{bearer, failure, flash_or_sign_out, ConsoleResult};
use crate::forms::PermissionForm;
use crate::state::{ConsoleState, FlashMessage};
use crate::views::{HxTemplate, Layout, PermissionsView};

/// GET /admin/templates/{id}/permissions
pub async fn list(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    let view = load(&state, &id, &token, uri.path()).await?;
    Ok(view.render_html())
}

/// POST /admin/templates/{id}/permissions
pub async fn add(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
    Form(form): Form<PermissionForm>,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    let grant = match form.to_new_permission() {
        Ok(grant) => grant,
        Err(errors) => {
            let mut view = load(&state, &id, &token, uri.path()).await?;
            view.error = errors.messages().collect::<Vec<_>>().join(" ");
            return Ok(view.render_status(StatusCode::UNPROCESSABLE_ENTITY));
        }
    };

    match state.api().add_permission(&id, &grant, Some(&token)).await {
        Ok(permission) => {
            tracing::info!(template = %id, permission = %permission.id, "permission granted");
            state.flash().push(FlashMessage::success(format!(
                "Granted {} to {}",
                permission.permission_type,
                permission.grantee_label()
            )));
        }
        Err(err) => flash_or_sign_out(&state, err, uri.path()).await?,
    }
    Ok(Redirect::to(&format!("/admin/templates/{id}/permissions")).into_response())
}

/// POST /admin/templates/{id}/permissions/{permission}/delete
pub async fn remove(
    State(state): State<ConsoleState>,
    Path((id, permission_id)): Path<(String, String)>,
    OriginalUri(uri): OriginalUri,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    match state
        .api()
        .remove_permission(&id, &permission_id, Some(&token))
        .await
    {
        Ok(()) => {
            tracing::info!(template = %id, permission = %permission_id, "permission removed");
            state.flash().push(FlashMessage::success("Permission removed"));
        }
        Err(err) => flash_or_sign_out(&state, err, uri.path()).await?,
    }
    Ok(Redirect::to(&format!("/admin/templates/{id}/permissions")).into_response())
}

async fn load(
    state: &ConsoleState,
    id: &str,
    token: &str,
    requested: &str,
) -> ConsoleResult<PermissionsView> {
    let api = state.api();
    let (template, permissions) = tokio::join!(
        state.catalog().get(id, Some(token)),
        api.list_permissions(id, Some(token)),
    );
    let template = match template {
        Ok(template) => template,
        Err(err) => return Err(failure(state, err, requested).await),
    };
    let permissions = match permissions {
        Ok(permissions) => permissions,
        Err(err) => return Err(failure(state, err, requested).await),
    };

    let (users, groups) = tokio::join!(api.list_users(Some(token)), api.list_groups(Some(token)));
    let users = users.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "could not load users");
        Vec::new()
    });
    let groups = groups.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "could not load groups");
        Vec::new()
    });

    Ok(PermissionsView::new(
        Layout::new(state, format!("Permissions for {}", template.name)),
        &template,
        &permissions,
        &users,
        &groups,
    ))
}
