//! Template picker and form wizard
//!
//! The wizard keeps no server-side state. Every page posts all values
//! entered so far as `v.<field>` inputs together with the page index, and
//! the wizard is rebuilt from them on each request.

use axum::{
    extract::{OriginalUri, Path, State},
    response::{IntoResponse, Response},
    Form,
};
use axum_htmx::HxRequest;

use super::{failure, ConsoleResult};
use crate::error::PagecraftError;
use crate::forms::{FormWizard, WizardError};
use crate::models::Template;
use crate::state::ConsoleState;
use crate::views::{
    HomeView, HxTemplate, Layout, TemplateCard, WizardPanel, WizardPanelView, WizardView,
    WIZARD_VALUE_PREFIX,
};

/// Template picker
///
/// GET /
pub async fn home(State(state): State<ConsoleState>) -> Response {
    let bearer = state.session().optional_access_token().await;
    let (templates, error) = match state.catalog().templates(bearer.as_deref()).await {
        Ok(templates) => (templates.iter().map(TemplateCard::from).collect(), String::new()),
        Err(err) => {
            tracing::warn!(error = %err, "could not load templates");
            (Vec::new(), err.user_message())
        }
    };

    HomeView {
        layout: Layout::new(&state, "Templates"),
        templates,
        error,
    }
    .render_html()
}

/// First page of a template's form
///
/// GET /wizard/{id}
pub async fn start(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
    HxRequest(is_htmx): HxRequest,
) -> ConsoleResult {
    let template = fetch(&state, &id, uri.path()).await?;
    let title = template.name.clone();

    let mut wizard = FormWizard::new();
    let panel = match wizard.select(template) {
        Ok(()) => WizardPanel::from_wizard(&wizard, ""),
        Err(err) => empty_panel(&id, &title, &err),
    };
    Ok(render(&state, &title, panel, is_htmx))
}

/// Advance, go back or submit
///
/// POST /wizard/{id}
pub async fn step(
    State(state): State<ConsoleState>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
    HxRequest(is_htmx): HxRequest,
    Form(pairs): Form<Vec<(String, String)>>,
) -> ConsoleResult {
    let template = fetch(&state, &id, uri.path()).await?;
    let title = template.name.clone();
    let input = WizardInput::from_pairs(pairs);

    let mut wizard = match FormWizard::resume(template, input.page, input.values) {
        Ok(wizard) => wizard,
        Err(err) => return Ok(render(&state, &title, empty_panel(&id, &title, &err), is_htmx)),
    };

    let error = match input.action {
        WizardAction::Back => {
            wizard.previous_page();
            String::new()
        }
        WizardAction::Next => wizard.next_page().err().map(|e| e.user_message()).unwrap_or_default(),
        WizardAction::Submit => {
            let bearer = state.session().optional_access_token().await;
            match wizard.submit(state.api(), bearer.as_deref()).await {
                Ok(result) => {
                    tracing::info!(template = %id, url = %result.url, "document generated");
                    String::new()
                }
                Err(err) => {
                    let err = PagecraftError::from(err);
                    if err.is_unauthorized() {
                        return Err(failure(&state, err, uri.path()).await);
                    }
                    err.user_message()
                }
            }
        }
    };

    Ok(render(&state, &title, WizardPanel::from_wizard(&wizard, error), is_htmx))
}

async fn fetch(state: &ConsoleState, id: &str, requested: &str) -> ConsoleResult<Template> {
    let bearer = state.session().optional_access_token().await;
    match state.catalog().get(id, bearer.as_deref()).await {
        Ok(template) => Ok(template),
        Err(err) => Err(failure(state, err, requested).await),
    }
}

fn empty_panel(id: &str, name: &str, err: &WizardError) -> WizardPanel {
    WizardPanel {
        template_id: id.to_string(),
        template_name: name.to_string(),
        error: err.user_message(),
        ..WizardPanel::default()
    }
}

fn render(state: &ConsoleState, title: &str, panel: WizardPanel, is_htmx: bool) -> Response {
    let panel = WizardPanel {
        csrf_token: state.csrf().as_str().to_string(),
        ..panel
    };
    if is_htmx {
        WizardPanelView { panel }.render_html()
    } else {
        WizardView {
            layout: Layout::new(state, title),
            panel,
        }
        .render_html()
    }
    .into_response()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WizardAction {
    Next,
    Back,
    Submit,
}

#[derive(Debug)]
struct WizardInput {
    page: usize,
    action: WizardAction,
    values: Vec<(String, String)>,
}

impl WizardInput {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut input = Self {
            page: 0,
            action: WizardAction::Next,
            values: Vec::new(),
        };
        for (key, value) in pairs {
            if let Some(name) = key.strip_prefix(WIZARD_VALUE_PREFIX) {
                input.values.push((name.to_string(), value));
                continue;
            }
            match key.as_str() {
                "page" => input.page = value.trim().parse().unwrap_or(0),
                "action" => {
                    input.action = match value.as_str() {
                        "back" => WizardAction::Back,
                        "submit" => WizardAction::Submit,
                        _ => WizardAction::Next,
                    };
                }
                _ => {}
            }
        }
        input
    }
}
