use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::models::Page;

impl ApiClient {
    /// `POST /templates/{id}/pages/`
    pub async fn create_page(
        &self,
        template_id: &str,
        page: &Page,
        bearer: Option<&str>,
    ) -> Result<Page, ApiError> {
        let url = self.endpoint(&["templates", template_id, "pages"], true)?;
        self.send_json(self.request(Method::POST, url, bearer).json(page))
            .await
    }

    /// `PUT /templates/{id}/pages/{pageId}/`
    pub async fn update_page(
        &self,
        template_id: &str,
        page_id: &str,
        page: &Page,
        bearer: Option<&str>,
    ) -> Result<Page, ApiError> {
        let url = self.endpoint(&["templates", template_id, "pages", page_id], true)?;
        self.send_json(self.request(Method::PUT, url, bearer).json(page))
            .await
    }

    /// `DELETE /templates/{id}/pages/{pageId}/`
    pub async fn delete_page(
        &self,
        template_id: &str,
        page_id: &str,
        bearer: Option<&str>,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&["templates", template_id, "pages", page_id], true)?;
        self.send_empty(self.request(Method::DELETE, url, bearer))
            .await
    }
}
