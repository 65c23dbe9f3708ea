//! Cached template list
//!
//! The list is fetched once and served from memory until a mutation goes
//! through this catalog. Mutations are awaited first; only then is the
//! cache dropped and the list fetched again.
//!
//! The backend filters the list by caller, so an entry is only served back
//! for the same bearer credential it was fetched with.

use parking_lot::RwLock;

use crate::api::{ApiClient, ApiError};
use crate::models::{Page, Template, TemplateInput};

/// Template list with invalidate-after-mutation caching
#[derive(Debug)]
pub struct TemplateCatalog {
    api: ApiClient,
    cache: RwLock<Option<Cached>>,
}

#[derive(Debug, Clone)]
struct Cached {
    bearer: Option<String>,
    templates: Vec<Template>,
}

impl TemplateCatalog {
    /// An empty catalog
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self {
            api,
            cache: RwLock::new(None),
        }
    }

    /// The client used for fetches
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The last fetched list, whoever it was fetched for
    #[must_use]
    pub fn cached(&self) -> Option<Vec<Template>> {
        self.cache.read().as_ref().map(|entry| entry.templates.clone())
    }

    /// The cached list if it was fetched with `bearer`
    #[must_use]
    pub fn cached_for(&self, bearer: Option<&str>) -> Option<Vec<Template>> {
        self.cache
            .read()
            .as_ref()
            .filter(|entry| entry.bearer.as_deref() == bearer)
            .map(|entry| entry.templates.clone())
    }

    /// The template list for `bearer`, fetched on first use
    pub async fn templates(&self, bearer: Option<&str>) -> Result<Vec<Template>, ApiError> {
        if let Some(templates) = self.cached_for(bearer) {
            return Ok(templates);
        }
        self.refresh(bearer).await
    }

    /// Fetch the list and replace the cache
    pub async fn refresh(&self, bearer: Option<&str>) -> Result<Vec<Template>, ApiError> {
        let templates = self.api.list_templates(bearer).await?;
        tracing::debug!(count = templates.len(), "template list refreshed");
        *self.cache.write() = Some(Cached {
            bearer: bearer.map(str::to_string),
            templates: templates.clone(),
        });
        Ok(templates)
    }

    /// Drop the cached list
    pub fn invalidate(&self) {
        *self.cache.write() = None;
    }

    /// One template with its pages, always fetched fresh
    pub async fn get(&self, id: &str, bearer: Option<&str>) -> Result<Template, ApiError> {
        self.api.get_template(id, bearer).await
    }

    /// Create a template
    pub async fn create(
        &self,
        input: &TemplateInput,
        bearer: Option<&str>,
    ) -> Result<Template, ApiError> {
        let created = self.api.create_template(input, bearer).await?;
        tracing::info!(template = %created.id, name = %created.name, "template created");
        self.reload(bearer).await;
        Ok(created)
    }

    /// Update a template's details
    pub async fn update(
        &self,
        id: &str,
        input: &TemplateInput,
        bearer: Option<&str>,
    ) -> Result<Template, ApiError> {
        let updated = self.api.update_template(id, input, bearer).await?;
        tracing::info!(template = %id, "template updated");
        self.reload(bearer).await;
        Ok(updated)
    }

    /// Delete a template
    pub async fn delete(&self, id: &str, bearer: Option<&str>) -> Result<(), ApiError> {
        self.api.delete_template(id, bearer).await?;
        tracing::info!(template = %id, "template deleted");
        self.reload(bearer).await;
        Ok(())
    }

    /// Add a page to a template
    pub async fn create_page(
        &self,
        template_id: &str,
        page: &Page,
        bearer: Option<&str>,
    ) -> Result<Page, ApiError> {
        let created = self.api.create_page(template_id, page, bearer).await?;
        tracing::info!(template = %template_id, page = %created.key(), "page created");
        self.reload(bearer).await;
        Ok(created)
    }

    /// Replace a page
    pub async fn update_page(
        &self,
        template_id: &str,
        page_id: &str,
        page: &Page,
        bearer: Option<&str>,
    ) -> Result<Page, ApiError> {
        let updated = self.api.update_page(template_id, page_id, page, bearer).await?;
        tracing::info!(template = %template_id, page = %page_id, "page updated");
        self.reload(bearer).await;
        Ok(updated)
    }

    /// Remove a page
    pub async fn delete_page(
        &self,
        template_id: &str,
        page_id: &str,
        bearer: Option<&str>,
    ) -> Result<(), ApiError> {
        self.api.delete_page(template_id, page_id, bearer).await?;
        tracing::info!(template = %template_id, page = %page_id, "page deleted");
        self.reload(bearer).await;
        Ok(())
    }

    // The mutation already succeeded; a failed re-fetch only leaves the cache empty.
    async fn reload(&self, bearer: Option<&str>) {
        self.invalidate();
        if let Err(err) = self.refresh(bearer).await {
            tracing::warn!(error = %err, "could not refresh template list");
        }
    }
}
