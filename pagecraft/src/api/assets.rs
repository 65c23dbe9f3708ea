use reqwest::{multipart, Method};

use super::{ApiClient, ApiError};
use crate::assets::UploadedFile;
use crate::models::Asset;

impl ApiClient {
    /// `POST /templates/{id}/pages/{pageId}/assets/` as multipart field `file`
    pub async fn upload_asset(
        &self,
        template_id: &str,
        page_id: &str,
        file: &UploadedFile,
        bearer: Option<&str>,
    ) -> Result<Asset, ApiError> {
        let url = self.endpoint(&["templates", template_id, "pages", page_id, "assets"], true)?;

        let part = multipart::Part::bytes(file.data.to_vec())
            .file_name(file.filename.clone())
            .mime_str(&file.content_type)
            .map_err(|_| {
                ApiError::InvalidRequest(format!("invalid content type `{}`", file.content_type))
            })?;
        let form = multipart::Form::new().part("file", part);

        self.send_json(self.request(Method::POST, url, bearer).multipart(form))
            .await
    }

    /// `DELETE /templates/{id}/pages/{pageId}/assets/{assetId}/`
    pub async fn delete_asset(
        &self,
        template_id: &str,
        page_id: &str,
        asset_id: &str,
        bearer: Option<&str>,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(
            &["templates", template_id, "pages", page_id, "assets", asset_id],
            true,
        )?;
        self.send_empty(self.request(Method::DELETE, url, bearer))
            .await
    }
}
