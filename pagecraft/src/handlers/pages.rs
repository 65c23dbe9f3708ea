//! Page editor and page assets

use axum::{
    extract::{Multipart, OriginalUri, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Form,
};

use super::{bearer, failure, flash_or_sign_out, inline_error, ConsoleError, ConsoleResult};
use crate::assets::{AssetError, AssetManager, UploadedFile};
use crate::forms::{PageForm, ValidationErrors};
use crate::models::{Page, Template};
use crate::state::{ConsoleState, FlashMessage};
use crate::views::{AssetRow, AssetsView, HxTemplate, Layout, PageFormView};

/// Name of the multipart part carrying the file
const FILE_PART: &str = "file";

/// GET /admin/templates/{id}/pages/new
pub async fn new_form(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    let template = load_template(&state, &id, &token, uri.path()).await?;

    Ok(PageFormView::new(
        Layout::new(&state, "New page"),
        &template,
        None,
        &PageForm::default(),
        &ValidationErrors::new(),
    )
    .render_html())
}

/// POST /admin/templates/{id}/pages/new
pub async fn create(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    let template = load_template(&state, &id, &token, uri.path()).await?;
    let form = PageForm::from_pairs(&pairs);
    let render = |form: &PageForm, errors: &ValidationErrors, status: StatusCode| {
        PageFormView::new(Layout::new(&state, "New page"), &template, None, form, errors)
            .render_status(status)
    };

    if is_add_field(&pairs) {
        return Ok(render(&form.clone().with_blank_row(), &ValidationErrors::new(), StatusCode::OK));
    }

    let page = match form.validate(None) {
        Ok(page) if template.page(&page.name).is_some() => {
            let mut errors = ValidationErrors::new();
            errors.add_with_code(
                "name",
                format!("A page named `{}` already exists", page.name),
                "duplicate",
            );
            return Ok(render(&form, &errors, StatusCode::UNPROCESSABLE_ENTITY));
        }
        Ok(page) => page,
        Err(errors) => return Ok(render(&form, &errors, StatusCode::UNPROCESSABLE_ENTITY)),
    };

    match state.catalog().create_page(&id, &page, Some(&token)).await {
        Ok(created) => {
            state
                .flash()
                .push(FlashMessage::success(format!("Page \"{}\" created", created.name)));
            Ok(Redirect::to(&format!("/admin/templates/{id}")).into_response())
        }
        Err(err) => {
            let message = inline_error(&state, err, uri.path()).await?;
            let mut view =
                PageFormView::new(Layout::new(&state, "New page"), &template, None, &form, &ValidationErrors::new());
            view.error = message;
            Ok(view.render_status(StatusCode::BAD_REQUEST))
        }
    }
}

/// GET /admin/templates/{id}/pages/{page}
pub async fn edit_form(
    State(state): State<ConsoleState>,
    Path((id, page_key)): Path<(String, String)>,
    OriginalUri(uri): OriginalUri,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    let template = load_template(&state, &id, &token, uri.path()).await?;
    let page = find_page(&state, &template, &page_key)?;

    Ok(PageFormView::new(
        Layout::new(&state, page.name.clone()),
        &template,
        Some(page.key()),
        &PageForm::from_page(page),
        &ValidationErrors::new(),
    )
    .render_html())
}

/// POST /admin/templates/{id}/pages/{page}
///
/// The page name is fixed once created.
pub async fn update(
    State(state): State<ConsoleState>,
    Path((id, page_key)): Path<(String, String)>,
    OriginalUri(uri): OriginalUri,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    let template = load_template(&state, &id, &token, uri.path()).await?;
    let existing = find_page(&state, &template, &page_key)?;
    let key = existing.key().to_string();

    let mut form = PageForm::from_pairs(&pairs);
    form.name.clone_from(&existing.name);
    let render = |form: &PageForm, errors: &ValidationErrors, status: StatusCode| {
        PageFormView::new(Layout::new(&state, existing.name.clone()), &template, Some(&key), form, errors)
            .render_status(status)
    };

    if is_add_field(&pairs) {
        return Ok(render(&form.clone().with_blank_row(), &ValidationErrors::new(), StatusCode::OK));
    }

    let mut page = match form.validate(Some(&existing.name)) {
        Ok(page) => page,
        Err(errors) => return Ok(render(&form, &errors, StatusCode::UNPROCESSABLE_ENTITY)),
    };
    page.id.clone_from(&existing.id);

    match state.catalog().update_page(&id, &key, &page, Some(&token)).await {
        Ok(updated) => {
            state
                .flash()
                .push(FlashMessage::success(format!("Page \"{}\" saved", updated.name)));
            Ok(Redirect::to(&format!("/admin/templates/{id}/pages/{key}")).into_response())
        }
        Err(err) => {
            let message = inline_error(&state, err, uri.path()).await?;
            let mut view = PageFormView::new(
                Layout::new(&state, existing.name.clone()),
                &template,
                Some(&key),
                &form,
                &ValidationErrors::new(),
            );
            view.error = message;
            Ok(view.render_status(StatusCode::BAD_REQUEST))
        }
    }
}

/// POST /admin/templates/{id}/pages/{page}/delete
pub async fn delete(
    State(state): State<ConsoleState>,
    Path((id, page_key)): Path<(String, String)>,
    OriginalUri(uri): OriginalUri,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    match state.catalog().delete_page(&id, &page_key, Some(&token)).await {
        Ok(()) => state.flash().push(FlashMessage::success("Page deleted")),
        Err(err) => flash_or_sign_out(&state, err, uri.path()).await?,
    }
    Ok(Redirect::to(&format!("/admin/templates/{id}")).into_response())
}

/// GET /admin/templates/{id}/pages/{page}/assets
pub async fn assets(
    State(state): State<ConsoleState>,
    Path((id, page_key)): Path<(String, String)>,
    OriginalUri(uri): OriginalUri,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    let template = load_template(&state, &id, &token, uri.path()).await?;
    let page = find_page(&state, &template, &page_key)?;
    let manager = AssetManager::for_page(&id, page);

    Ok(assets_view(&state, &id, page, &manager, String::new()).render_html())
}

/// POST /admin/templates/{id}/pages/{page}/assets
///
/// Files are checked against the upload policy before anything is sent.
pub async fn upload(
    State(state): State<ConsoleState>,
    Path((id, page_key)): Path<(String, String)>,
    OriginalUri(uri): OriginalUri,
    multipart: Multipart,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    let template = load_template(&state, &id, &token, uri.path()).await?;
    let page = find_page(&state, &template, &page_key)?;
    let mut manager = AssetManager::for_page(&id, page);

    let file = match read_file(multipart).await {
        Ok(file) => file,
        Err((status, message)) => {
            tracing::info!(%status, %message, "rejected upload body");
            return Ok(assets_view(&state, &id, page, &manager, message).render_status(status));
        }
    };

    match manager.upload(state.api(), Some(&token), state.uploads(), &file).await {
        Ok(asset) => {
            state
                .flash()
                .push(FlashMessage::success(format!("Uploaded {}", asset.name)));
            Ok(Redirect::to(&format!("/admin/templates/{id}/pages/{}/assets", page.key())).into_response())
        }
        Err(err) => {
            let status = if matches!(err, AssetError::Api(_)) {
                StatusCode::BAD_GATEWAY
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            };
            let message = inline_error(&state, err, uri.path()).await?;
            Ok(assets_view(&state, &id, page, &manager, message).render_status(status))
        }
    }
}

/// POST /admin/templates/{id}/pages/{page}/assets/{asset}/delete
pub async fn delete_asset(
    State(state): State<ConsoleState>,
    Path((id, page_key, asset_id)): Path<(String, String, String)>,
    OriginalUri(uri): OriginalUri,
) -> ConsoleResult {
    let token = bearer(&state, uri.path()).await?;
    let template = load_template(&state, &id, &token, uri.path()).await?;
    let page = find_page(&state, &template, &page_key)?;
    let mut manager = AssetManager::for_page(&id, page);

    match manager.delete(state.api(), Some(&token), &asset_id).await {
        Ok(asset) => state
            .flash()
            .push(FlashMessage::success(format!("Deleted {}", asset.name))),
        Err(err) => flash_or_sign_out(&state, err, uri.path()).await?,
    }
    Ok(Redirect::to(&format!("/admin/templates/{id}/pages/{}/assets", page.key())).into_response())
}

async fn load_template(
    state: &ConsoleState,
    id: &str,
    token: &str,
    requested: &str,
) -> ConsoleResult<Template> {
    match state.catalog().get(id, Some(token)).await {
        Ok(template) => Ok(template),
        Err(err) => Err(failure(state, err, requested).await),
    }
}

fn find_page<'a>(state: &ConsoleState, template: &'a Template, key: &str) -> ConsoleResult<&'a Page> {
    template
        .page(key)
        .ok_or_else(|| ConsoleError::not_found(state, "Page"))
}

fn is_add_field(pairs: &[(String, String)]) -> bool {
    pairs
        .iter()
        .any(|(key, value)| key == "action" && value == "add_field")
}

fn assets_view(
    state: &ConsoleState,
    template_id: &str,
    page: &Page,
    manager: &AssetManager,
    error: String,
) -> AssetsView {
    AssetsView {
        layout: Layout::new(state, format!("Assets for {}", page.name)),
        template_id: template_id.to_string(),
        page_key: page.key().to_string(),
        page_name: page.name.clone(),
        assets: manager.assets().iter().map(AssetRow::from).collect(),
        accept: state.uploads().accept_attribute(),
        hint: state.uploads().describe(),
        error,
    }
}

async fn read_file(mut multipart: Multipart) -> Result<UploadedFile, (StatusCode, String)> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|err| (err.status(), err.body_text()))?;
        let Some(field) = field else {
            return Err((StatusCode::BAD_REQUEST, "Choose a file to upload".to_string()));
        };
        if field.name() != Some(FILE_PART) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|err| (err.status(), err.body_text()))?;
        if filename.is_empty() && data.is_empty() {
            return Err((StatusCode::BAD_REQUEST, "Choose a file to upload".to_string()));
        }
        return Ok(UploadedFile::new(filename, content_type, data));
    }
}
