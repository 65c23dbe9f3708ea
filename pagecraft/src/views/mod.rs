//! Server-rendered console screens
//!
//! Each screen is an askama template under `templates/` backed by a view
//! struct of plain strings and flags. Conversions from domain types live
//! here so the templates stay free of logic.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::forms::{FormWizard, PageForm, TemplateForm, ValidationErrors};
use crate::models::{Asset, Group, Page, Permission, PermissionType, PrincipalRef, Template as DocTemplate, TemplateType};
use crate::state::{ConsoleState, FlashMessage};

/// Render helpers for askama templates
pub trait HxTemplate: Template {
    /// Render as a 200 HTML response
    fn render_html(self) -> Response
    where
        Self: Sized,
    {
        self.render_status(StatusCode::OK)
    }

    /// Render with an explicit status
    fn render_status(self, status: StatusCode) -> Response
    where
        Self: Sized,
    {
        match self.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "template rendering failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Template rendering failed").into_response()
            }
        }
    }
}

impl<T: Template> HxTemplate for T {}

/// Data every full page needs
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Page title
    pub title: String,
    /// Signed-in username, empty when anonymous
    pub username: String,
    /// Someone is signed in
    pub signed_in: bool,
    /// The signed-in user may open admin screens
    pub is_admin: bool,
    /// Messages queued by earlier requests
    pub flash: Vec<FlashMessage>,
    /// Echoed back by every form
    pub csrf_token: String,
}

impl Layout {
    /// Build from the console state, taking any queued flash messages
    #[must_use]
    pub fn new(state: &ConsoleState, title: impl Into<String>) -> Self {
        let user = state.session().user();
        Self {
            title: title.into(),
            signed_in: user.is_some(),
            is_admin: state.session().has_admin_access(),
            username: user.map(|u| u.username).unwrap_or_default(),
            flash: state.flash().drain(),
            csrf_token: state.csrf().as_str().to_string(),
        }
    }
}

/// A template as listed on the home and admin screens
#[derive(Debug, Clone)]
pub struct TemplateCard {
    /// Identifier
    pub id: String,
    /// Name
    pub name: String,
    /// Version label, may be empty
    pub version: String,
    /// Category
    pub template_type: String,
    /// Description, may be empty
    pub description: String,
    /// Number of pages
    pub page_count: usize,
    /// Number of fields across pages
    pub field_count: usize,
}

impl From<&DocTemplate> for TemplateCard {
    fn from(template: &DocTemplate) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            version: template.version.clone().unwrap_or_default(),
            template_type: template.template_type.to_string(),
            description: template.description.clone().unwrap_or_default(),
            page_count: template.pages.len(),
            field_count: template.field_count(),
        }
    }
}

/// Public landing page: pick a template
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeView {
    /// Shared page data
    pub layout: Layout,
    /// Templates to choose from
    pub templates: Vec<TemplateCard>,
    /// Why the list could not be loaded
    pub error: String,
}

/// One input on a wizard page
#[derive(Debug, Clone)]
pub struct FieldView {
    /// Form key
    pub name: String,
    /// Label
    pub label: String,
    /// HTML input type
    pub input_type: String,
    /// Placeholder
    pub placeholder: String,
    /// Current value
    pub value: String,
    /// Must be filled
    pub required: bool,
    /// Validation message, empty when valid
    pub error: String,
}

/// A value carried in a hidden input
#[derive(Debug, Clone)]
pub struct HiddenValue {
    /// Form key
    pub name: String,
    /// Value
    pub value: String,
}

/// Prefix for wizard value inputs, keeping them apart from control fields
pub const WIZARD_VALUE_PREFIX: &str = "v.";

/// The swappable part of the wizard screen
#[derive(Debug, Clone, Default)]
pub struct WizardPanel {
    /// Template identifier
    pub template_id: String,
    /// Template name
    pub template_name: String,
    /// Zero-based page index
    pub page_index: usize,
    /// One-based page number
    pub page_number: usize,
    /// Total pages
    pub page_count: usize,
    /// Page name
    pub page_name: String,
    /// On the first page
    pub is_first: bool,
    /// On the last page
    pub is_last: bool,
    /// Inputs on the current page
    pub fields: Vec<FieldView>,
    /// Values from other pages
    pub hidden: Vec<HiddenValue>,
    /// Form-level error
    pub error: String,
    /// A document was generated
    pub done: bool,
    /// Generated document URL
    pub result_url: String,
    /// Preview URL, may be empty
    pub preview_url: String,
    /// Echoed back by the form
    pub csrf_token: String,
}

impl WizardPanel {
    /// Snapshot a wizard for rendering
    #[must_use]
    pub fn from_wizard(wizard: &FormWizard, error: impl Into<String>) -> Self {
        let Some(template) = wizard.template() else {
            return Self {
                error: error.into(),
                ..Self::default()
            };
        };
        let page = wizard.current_page();
        let on_page: Vec<&str> = page
            .map(|p| p.fields.iter().map(|f| f.name.as_str()).collect())
            .unwrap_or_default();

        let fields = page
            .map(|p| {
                p.fields
                    .iter()
                    .map(|field| FieldView {
                        name: format!("{WIZARD_VALUE_PREFIX}{}", field.name),
                        label: if field.label.is_empty() {
                            field.name.clone()
                        } else {
                            field.label.clone()
                        },
                        input_type: field.input_type().to_string(),
                        placeholder: field.placeholder.clone().unwrap_or_default(),
                        value: wizard.value(&field.name).to_string(),
                        required: field.required,
                        error: wizard.errors().first_message(&field.name),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let hidden = wizard
            .values()
            .iter()
            .filter(|(name, _)| !on_page.contains(&name.as_str()))
            .map(|(name, value)| HiddenValue {
                name: format!("{WIZARD_VALUE_PREFIX}{name}"),
                value: value.clone(),
            })
            .collect();

        let result = wizard.result();
        Self {
            template_id: template.id.clone(),
            template_name: template.name.clone(),
            page_index: wizard.page_index(),
            page_number: wizard.page_index() + 1,
            page_count: wizard.page_count(),
            page_name: page.map(|p| p.name.clone()).unwrap_or_default(),
            is_first: wizard.page_index() == 0,
            is_last: wizard.is_last_page(),
            fields,
            hidden,
            error: error.into(),
            done: result.is_some(),
            result_url: result.map(|r| r.url.clone()).unwrap_or_default(),
            preview_url: result
                .and_then(|r| r.preview_url.clone())
                .unwrap_or_default(),
            csrf_token: String::new(),
        }
    }
}

/// Full wizard page
#[derive(Template)]
#[template(path = "wizard.html")]
pub struct WizardView {
    /// Shared page data
    pub layout: Layout,
    /// Wizard content
    pub panel: WizardPanel,
}

/// Wizard content alone, for htmx swaps
#[derive(Template)]
#[template(path = "wizard_panel.html")]
pub struct WizardPanelView {
    /// Wizard content
    pub panel: WizardPanel,
}

/// Sign-in page
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginView {
    /// Shared page data
    pub layout: Layout,
    /// Username to prefill
    pub username: String,
    /// Where to go after signing in
    pub next: String,
    /// Login failure
    pub error: String,
    /// Username validation message
    pub username_error: String,
    /// Password validation message
    pub password_error: String,
}

/// Admin landing page
#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardView {
    /// Shared page data
    pub layout: Layout,
    /// Role of the signed-in user
    pub role: String,
    /// Templates on the backend
    pub template_count: usize,
    /// Pages across templates
    pub page_count: usize,
    /// Fields across templates
    pub field_count: usize,
    /// Why counts are missing
    pub error: String,
}

/// Admin template list
#[derive(Template)]
#[template(path = "admin/templates.html")]
pub struct TemplateListView {
    /// Shared page data
    pub layout: Layout,
    /// All templates
    pub templates: Vec<TemplateCard>,
}

/// An option in a `<select>`
#[derive(Debug, Clone)]
pub struct SelectOption {
    /// Submitted value
    pub value: String,
    /// Shown text
    pub label: String,
    /// Preselected
    pub selected: bool,
}

/// A page in the template editor
#[derive(Debug, Clone)]
pub struct PageRow {
    /// Path identifier
    pub key: String,
    /// Name
    pub name: String,
    /// e.g. `210 × 297 mm`
    pub size: String,
    /// Number of fields
    pub field_count: usize,
    /// Number of assets
    pub asset_count: usize,
}

impl From<&Page> for PageRow {
    fn from(page: &Page) -> Self {
        let form = PageForm::from_page(page);
        Self {
            key: page.key().to_string(),
            name: page.name.clone(),
            size: format!("{} × {} {}", form.width, form.height, form.units),
            field_count: page.fields.len(),
            asset_count: page.assets.len(),
        }
    }
}

/// Template create and edit screen
#[derive(Template)]
#[template(path = "admin/template_form.html")]
pub struct TemplateFormView {
    /// Shared page data
    pub layout: Layout,
    /// Creating rather than editing
    pub is_new: bool,
    /// Identifier when editing
    pub template_id: String,
    /// Name input
    pub name: String,
    /// Version input
    pub version: String,
    /// Description input
    pub description: String,
    /// Category choices
    pub type_options: Vec<SelectOption>,
    /// Name message
    pub name_error: String,
    /// Version message
    pub version_error: String,
    /// Type message
    pub type_error: String,
    /// Backend failure
    pub error: String,
    /// Pages when editing
    pub pages: Vec<PageRow>,
}

impl TemplateFormView {
    /// Build from form input and its errors
    #[must_use]
    pub fn new(layout: Layout, form: &TemplateForm, errors: &ValidationErrors) -> Self {
        let mut type_options: Vec<SelectOption> = TemplateType::KNOWN
            .iter()
            .map(|kind| SelectOption {
                value: kind.as_str().to_string(),
                label: capitalize(kind.as_str()),
                selected: kind.as_str() == form.template_type,
            })
            .collect();
        if !type_options.iter().any(|o| o.selected) && !form.template_type.is_empty() {
            type_options.push(SelectOption {
                value: form.template_type.clone(),
                label: form.template_type.clone(),
                selected: true,
            });
        }
        Self {
            layout,
            is_new: true,
            template_id: String::new(),
            name: form.name.clone(),
            version: form.version.clone(),
            description: form.description.clone(),
            type_options,
            name_error: errors.first_message("name"),
            version_error: errors.first_message("version"),
            type_error: errors.first_message("template_type"),
            error: String::new(),
            pages: Vec::new(),
        }
    }

    /// Switch to editing an existing template
    #[must_use]
    pub fn editing(mut self, template: &DocTemplate) -> Self {
        self.is_new = false;
        self.template_id.clone_from(&template.id);
        self.pages = template.pages.iter().map(PageRow::from).collect();
        self
    }
}

/// One row in the page editor's field table
#[derive(Debug, Clone)]
pub struct FieldRowView {
    /// Row index used in input names
    pub index: usize,
    /// Field key
    pub name: String,
    /// Field label
    pub label: String,
    /// Required flag
    pub required: bool,
}

/// Page create and edit screen
#[derive(Template)]
#[template(path = "admin/page_form.html")]
pub struct PageFormView {
    /// Shared page data
    pub layout: Layout,
    /// Creating rather than editing
    pub is_new: bool,
    /// Owning template
    pub template_id: String,
    /// Owning template's name
    pub template_name: String,
    /// Path identifier when editing
    pub page_key: String,
    /// Name input
    pub name: String,
    /// Width input
    pub width: String,
    /// Height input
    pub height: String,
    /// Millimetres selected
    pub units_mm: bool,
    /// Bleeds input
    pub bleeds: String,
    /// Markup input
    pub html: String,
    /// Field rows
    pub fields: Vec<FieldRowView>,
    /// Name message
    pub name_error: String,
    /// Width message
    pub width_error: String,
    /// Height message
    pub height_error: String,
    /// Bleeds message
    pub bleeds_error: String,
    /// Field table message
    pub fields_error: String,
    /// Backend failure
    pub error: String,
}

impl PageFormView {
    /// Build from form input and its errors
    #[must_use]
    pub fn new(
        layout: Layout,
        template: &DocTemplate,
        page_key: Option<&str>,
        form: &PageForm,
        errors: &ValidationErrors,
    ) -> Self {
        Self {
            layout,
            is_new: page_key.is_none(),
            template_id: template.id.clone(),
            template_name: template.name.clone(),
            page_key: page_key.unwrap_or_default().to_string(),
            name: form.name.clone(),
            width: form.width.clone(),
            height: form.height.clone(),
            units_mm: form.units != "px",
            bleeds: form.bleeds.clone(),
            html: form.html.clone(),
            fields: form
                .fields
                .iter()
                .enumerate()
                .map(|(index, row)| FieldRowView {
                    index,
                    name: row.name.clone(),
                    label: row.label.clone(),
                    required: row.required,
                })
                .collect(),
            name_error: errors.first_message("name"),
            width_error: errors.first_message("width"),
            height_error: errors.first_message("height"),
            bleeds_error: errors.first_message("bleeds"),
            fields_error: errors.joined("fields"),
            error: String::new(),
        }
    }
}

/// An asset in the asset manager
#[derive(Debug, Clone)]
pub struct AssetRow {
    /// Identifier
    pub id: String,
    /// File name
    pub name: String,
    /// MIME type
    pub file_type: String,
    /// Human-readable size
    pub size: String,
    /// Download URL
    pub url: String,
    /// Show a thumbnail
    pub is_image: bool,
}

impl From<&Asset> for AssetRow {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id.clone(),
            name: asset.name.clone(),
            file_type: asset.file_type.clone(),
            size: asset.display_size(),
            url: asset.url.clone(),
            is_image: asset.is_image(),
        }
    }
}

/// Asset manager screen for one page
#[derive(Template)]
#[template(path = "admin/assets.html")]
pub struct AssetsView {
    /// Shared page data
    pub layout: Layout,
    /// Owning template
    pub template_id: String,
    /// Owning page
    pub page_key: String,
    /// Page name
    pub page_name: String,
    /// Current assets
    pub assets: Vec<AssetRow>,
    /// `<input accept>` value
    pub accept: String,
    /// Upload rules
    pub hint: String,
    /// Last failure
    pub error: String,
}

/// A grant on the permissions screen
#[derive(Debug, Clone)]
pub struct PermissionRow {
    /// Identifier
    pub id: String,
    /// `view`, `edit` or `generate`
    pub permission_type: String,
    /// Who holds it
    pub grantee: String,
}

impl From<&Permission> for PermissionRow {
    fn from(permission: &Permission) -> Self {
        Self {
            id: permission.id.clone(),
            permission_type: permission.permission_type.to_string(),
            grantee: permission.grantee_label(),
        }
    }
}

/// Permissions screen for one template
#[derive(Template)]
#[template(path = "admin/permissions.html")]
pub struct PermissionsView {
    /// Shared page data
    pub layout: Layout,
    /// Template identifier
    pub template_id: String,
    /// Template name
    pub template_name: String,
    /// Current grants
    pub permissions: Vec<PermissionRow>,
    /// Permission kinds
    pub types: Vec<SelectOption>,
    /// Users to grant to
    pub users: Vec<SelectOption>,
    /// Groups to grant to
    pub groups: Vec<SelectOption>,
    /// Last failure
    pub error: String,
}

impl PermissionsView {
    /// Build from fetched data
    #[must_use]
    pub fn new(
        layout: Layout,
        template: &DocTemplate,
        permissions: &[Permission],
        users: &[PrincipalRef],
        groups: &[Group],
    ) -> Self {
        Self {
            layout,
            template_id: template.id.clone(),
            template_name: template.name.clone(),
            permissions: permissions.iter().map(PermissionRow::from).collect(),
            types: PermissionType::ALL
                .iter()
                .map(|kind| SelectOption {
                    value: kind.as_str().to_string(),
                    label: capitalize(kind.as_str()),
                    selected: *kind == PermissionType::View,
                })
                .collect(),
            users: users
                .iter()
                .map(|user| SelectOption {
                    value: user.id.clone(),
                    label: user.username.clone(),
                    selected: false,
                })
                .collect(),
            groups: groups
                .iter()
                .map(|group| SelectOption {
                    value: group.id.clone(),
                    label: group.name.clone(),
                    selected: false,
                })
                .collect(),
            error: String::new(),
        }
    }
}

/// Error page
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorView {
    /// Shared page data
    pub layout: Layout,
    /// HTTP status code
    pub status: u16,
    /// What went wrong
    pub message: String,
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn template() -> DocTemplate {
        serde_json::from_value(fixtures::two_page_template()).unwrap()
    }

    #[test]
    fn test_wizard_panel_carries_other_pages_as_hidden() {
        let wizard = FormWizard::resume(
            template(),
            1,
            [
                ("full_name".to_string(), "Ada".to_string()),
                ("date".to_string(), "2024-01-01".to_string()),
            ],
        )
        .unwrap();

        let panel = WizardPanel::from_wizard(&wizard, "");

        assert_eq!(panel.page_number, 2);
        assert!(panel.is_last);
        assert_eq!(panel.fields[0].name, "v.date");
        assert_eq!(panel.fields[0].value, "2024-01-01");
        assert_eq!(panel.fields[0].input_type, "date");
        assert_eq!(panel.hidden.len(), 1);
        assert_eq!(panel.hidden[0].name, "v.full_name");
    }

    #[test]
    fn test_wizard_panel_shows_field_errors() {
        let mut wizard = FormWizard::resume(template(), 0, []).unwrap();
        assert!(wizard.next_page().is_err());

        let panel = WizardPanel::from_wizard(&wizard, "Please fill in all required fields");
        let rendered = WizardPanelView { panel }.render().unwrap();

        assert!(rendered.contains("Full name is required"));
        assert!(rendered.contains("Please fill in all required fields"));
    }

    #[test]
    fn test_result_panel_links_document() {
        let panel = WizardPanel {
            template_id: "1".into(),
            done: true,
            result_url: "https://cdn.example/doc.pdf".into(),
            preview_url: "https://cdn.example/doc.png".into(),
            ..WizardPanel::default()
        };
        let rendered = WizardPanelView { panel }.render().unwrap();
        assert!(rendered.contains("doc.pdf"));
        assert!(rendered.contains("doc.png"));
    }

    #[test]
    fn test_template_form_view_keeps_unknown_type() {
        let form = TemplateForm {
            template_type: "travel".into(),
            ..TemplateForm::default()
        };
        let view = TemplateFormView::new(Layout::default(), &form, &ValidationErrors::new());
        assert_eq!(view.type_options.len(), 4);
        assert!(view.type_options[3].selected);
        assert_eq!(view.type_options[0].label, "Official");
    }

    #[test]
    fn test_page_row_size() {
        let template = template();
        let row = PageRow::from(&template.pages[0]);
        assert_eq!(row.key, "11");
        assert_eq!(row.size, "210 × 297 mm");
        assert_eq!(row.asset_count, 2);
    }

    #[test]
    fn test_error_page_escapes_message() {
        let view = ErrorView {
            layout: Layout::default(),
            status: 502,
            message: "<script>".into(),
        };
        let html = view.render().unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("502"));
    }
}
