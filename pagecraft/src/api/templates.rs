use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::models::{Template, TemplateInput};

impl ApiClient {
    /// `GET /templates/`
    pub async fn list_templates(&self, bearer: Option<&str>) -> Result<Vec<Template>, ApiError> {
        let url = self.endpoint(&["templates"], true)?;
        self.send_json(self.request(Method::GET, url, bearer)).await
    }

    /// `GET /templates/{id}/`
    pub async fn get_template(&self, id: &str, bearer: Option<&str>) -> Result<Template, ApiError> {
        let url = self.endpoint(&["templates", id], true)?;
        self.send_json(self.request(Method::GET, url, bearer)).await
    }

    /// `POST /templates/`
    pub async fn create_template(
        &self,
        input: &TemplateInput,
        bearer: Option<&str>,
    ) -> Result<Template, ApiError> {
        let url = self.endpoint(&["templates"], true)?;
        self.send_json(self.request(Method::POST, url, bearer).json(input))
            .await
    }

    /// `PUT /templates/{id}/`
    pub async fn update_template(
        &self,
        id: &str,
        input: &TemplateInput,
        bearer: Option<&str>,
    ) -> Result<Template, ApiError> {
        let url = self.endpoint(&["templates", id], true)?;
        self.send_json(self.request(Method::PUT, url, bearer).json(input))
            .await
    }

    /// `DELETE /templates/{id}/`
    pub async fn delete_template(&self, id: &str, bearer: Option<&str>) -> Result<(), ApiError> {
        let url = self.endpoint(&["templates", id], true)?;
        self.send_empty(self.request(Method::DELETE, url, bearer))
            .await
    }
}
