//! Template form wizard
//!
//! Three steps: pick a template, fill its pages one at a time, view the
//! generated document. Leaving a page forward requires every required field
//! on it to be non-blank; going back never validates.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use super::ValidationErrors;
use crate::api::{ApiClient, ApiError};
use crate::models::{Page, RenderRequest, RenderResult, Template};

/// Where the wizard is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardStep {
    /// No template chosen yet
    #[default]
    SelectTemplate,
    /// Filling the current page
    FillForm,
    /// A document was generated
    Result,
}

/// Wizard failures
#[derive(Debug, Error)]
pub enum WizardError {
    /// An operation needed a template
    #[error("no template selected")]
    NoTemplate,

    /// The chosen template has nothing to fill
    #[error("template `{0}` has no pages")]
    EmptyTemplate(String),

    /// Required fields on the current page are blank
    #[error("required fields missing: {}", .0.iter().cloned().collect::<Vec<_>>().join(", "))]
    Incomplete(BTreeSet<String>),

    /// Submission was attempted before the last page
    #[error("documents can only be generated from the last page")]
    NotLastPage,

    /// The render call failed
    #[error("document generation failed: {0}")]
    Render(#[from] ApiError),
}

impl WizardError {
    /// Text suitable for showing to a person
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Render(err) => format!("Document generation failed: {}", err.user_message()),
            Self::Incomplete(_) => "Please fill in all required fields".to_string(),
            other => other.to_string(),
        }
    }
}

/// State of one pass through the public flow
#[derive(Debug, Clone, Default)]
pub struct FormWizard {
    template: Option<Template>,
    page_index: usize,
    values: BTreeMap<String, String>,
    errors: ValidationErrors,
    result: Option<RenderResult>,
}

impl FormWizard {
    /// A wizard at the selection step
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a wizard mid-flow from carried form state
    ///
    /// `page_index` is clamped to the template's last page.
    pub fn resume(
        template: Template,
        page_index: usize,
        values: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, WizardError> {
        let mut wizard = Self::new();
        wizard.select(template)?;
        wizard.page_index = page_index.min(wizard.page_count().saturating_sub(1));
        wizard.values = values.into_iter().collect();
        Ok(wizard)
    }

    /// Current step
    #[must_use]
    pub const fn step(&self) -> WizardStep {
        match (&self.template, &self.result) {
            (None, _) => WizardStep::SelectTemplate,
            (Some(_), None) => WizardStep::FillForm,
            (Some(_), Some(_)) => WizardStep::Result,
        }
    }

    /// Choose a template and start at its first page with empty values
    pub fn select(&mut self, template: Template) -> Result<(), WizardError> {
        if template.pages.is_empty() {
            return Err(WizardError::EmptyTemplate(template.name));
        }
        tracing::debug!(template = %template.id, pages = template.pages.len(), "template selected");
        *self = Self {
            template: Some(template),
            ..Self::default()
        };
        Ok(())
    }

    /// The chosen template
    #[must_use]
    pub const fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    /// The page being filled
    #[must_use]
    pub fn current_page(&self) -> Option<&Page> {
        self.template.as_ref()?.pages.get(self.page_index)
    }

    /// Zero-based index of the page being filled
    #[must_use]
    pub const fn page_index(&self) -> usize {
        self.page_index
    }

    /// Number of pages in the chosen template
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.template.as_ref().map_or(0, |t| t.pages.len())
    }

    /// True on the final page
    #[must_use]
    pub fn is_last_page(&self) -> bool {
        self.page_index + 1 >= self.page_count()
    }

    /// Value entered for `name`, empty if none
    #[must_use]
    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map_or("", String::as_str)
    }

    /// All entered values
    #[must_use]
    pub const fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Record a value and clear that field's error
    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.errors.remove(&name);
        self.values.insert(name, value.into());
    }

    /// Errors from the last validation
    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Check the current page's required fields
    ///
    /// On failure the returned set is exactly the blank required fields, and
    /// the same fields are marked in [`FormWizard::errors`].
    pub fn validate_page(&mut self) -> Result<(), WizardError> {
        let page = self.current_page().ok_or(WizardError::NoTemplate)?;
        let missing = missing_required(page, &self.values);
        let messages: Vec<(String, String)> = page
            .required_fields()
            .filter(|field| missing.contains(&field.name))
            .map(|field| {
                let label = if field.label.is_empty() {
                    &field.name
                } else {
                    &field.label
                };
                (field.name.clone(), format!("{label} is required"))
            })
            .collect();

        self.errors.clear();
        if missing.is_empty() {
            return Ok(());
        }
        for (name, message) in messages {
            self.errors.add_with_code(name, message, "required");
        }
        Err(WizardError::Incomplete(missing))
    }

    /// Validate the current page, then advance
    ///
    /// On the last page this only validates.
    pub fn next_page(&mut self) -> Result<(), WizardError> {
        self.validate_page()?;
        if !self.is_last_page() {
            self.page_index += 1;
        }
        Ok(())
    }

    /// Go back one page without validating
    ///
    /// Returns `false` on the first page, where "back" means leaving the form.
    pub fn previous_page(&mut self) -> bool {
        self.errors.clear();
        if self.page_index == 0 {
            return false;
        }
        self.page_index -= 1;
        true
    }

    /// Build the render request
    ///
    /// Only allowed from the last page. The last page is validated first;
    /// if an earlier page is also incomplete the wizard moves there.
    pub fn submission(&mut self) -> Result<RenderRequest, WizardError> {
        if self.template.is_none() {
            return Err(WizardError::NoTemplate);
        }
        if !self.is_last_page() {
            return Err(WizardError::NotLastPage);
        }
        self.validate_page()?;

        let earlier_gap = self.template.as_ref().and_then(|template| {
            template
                .pages
                .iter()
                .position(|page| !missing_required(page, &self.values).is_empty())
        });
        if let Some(index) = earlier_gap {
            self.page_index = index;
            self.validate_page()?;
        }

        let template = self.template.as_ref().ok_or(WizardError::NoTemplate)?;
        let known: BTreeSet<&str> = template
            .pages
            .iter()
            .flat_map(|page| page.fields.iter().map(|f| f.name.as_str()))
            .collect();
        let data = self
            .values
            .iter()
            .filter(|(name, _)| known.contains(name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Ok(RenderRequest {
            template_id: template.id.clone(),
            data,
        })
    }

    /// Validate, post to the renderer and move to the result step
    ///
    /// Nothing is sent when validation fails.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        bearer: Option<&str>,
    ) -> Result<&RenderResult, WizardError> {
        let request = self.submission()?;
        tracing::info!(template = %request.template_id, fields = request.data.len(), "generating document");
        let result = api.generate(&request, bearer).await?;
        Ok(self.result.insert(result))
    }

    /// The generated document, once submitted
    #[must_use]
    pub const fn result(&self) -> Option<&RenderResult> {
        self.result.as_ref()
    }

    /// Back to the selection step with nothing entered
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn missing_required(page: &Page, values: &BTreeMap<String, String>) -> BTreeSet<String> {
    page.required_fields()
        .filter(|field| {
            values
                .get(&field.name)
                .is_none_or(|value| value.trim().is_empty())
        })
        .map(|field| field.name.clone())
        .collect()
}
