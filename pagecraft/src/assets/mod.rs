//! Page asset management
//!
//! Uploads are checked locally (size, extension) before one multipart
//! request is sent. The in-memory list only changes after the backend
//! confirms: an upload appends the returned asset, a delete removes exactly
//! the deleted id. Failed calls leave the list untouched.

use bytes::Bytes;
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::config::UploadSettings;
use crate::models::{Asset, Page};

/// Asset operation failures
#[derive(Debug, Error)]
pub enum AssetError {
    /// File exceeds the configured limit
    #[error("file is {actual} bytes, limit is {max}")]
    TooLarge {
        /// Size of the rejected file
        actual: u64,
        /// Configured maximum
        max: u64,
    },

    /// Extension not in the allow list
    #[error("file type `{0}` is not accepted")]
    UnsupportedType(String),

    /// The file has no content
    #[error("file is empty")]
    Empty,

    /// Id not in this page's asset list
    #[error("unknown asset `{0}`")]
    UnknownAsset(String),

    /// Backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AssetError {
    /// Text suitable for showing to a person
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::TooLarge { max, .. } => {
                format!("File is too large. Maximum size: {}", format_limit(*max))
            }
            Self::UnsupportedType(ext) if ext.is_empty() => {
                "Files without an extension are not accepted".to_string()
            }
            Self::UnsupportedType(ext) => format!("Files of type .{ext} are not accepted"),
            Self::Empty => "The file is empty".to_string(),
            Self::UnknownAsset(id) => format!("Asset {id} is not attached to this page"),
            Self::Api(err) => err.user_message(),
        }
    }
}

/// A file received from a browser or read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Original file name
    pub filename: String,
    /// MIME type
    pub content_type: String,
    /// File contents
    pub data: Bytes,
}

impl UploadedFile {
    /// Wrap file contents
    ///
    /// A blank or generic content type is replaced with one guessed from
    /// the file name.
    #[must_use]
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let filename = filename.into();
        let mut content_type = content_type.into();
        if content_type.trim().is_empty() || content_type == "application/octet-stream" {
            content_type = mime_guess::from_path(&filename)
                .first_or_octet_stream()
                .essence_str()
                .to_string();
        }
        Self {
            filename,
            content_type,
            data: data.into(),
        }
    }

    /// Size in bytes
    #[must_use]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Lowercase extension, if the name has one
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Local checks applied before any upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    max_size_bytes: u64,
    allowed_extensions: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from_settings(&UploadSettings::default())
    }
}

impl UploadPolicy {
    /// Build from configuration
    #[must_use]
    pub fn from_settings(settings: &UploadSettings) -> Self {
        Self {
            max_size_bytes: settings.max_size_bytes,
            allowed_extensions: settings
                .allowed_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Largest accepted file
    #[must_use]
    pub const fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Value for an `<input accept>` attribute, e.g. `.jpg,.png`
    #[must_use]
    pub fn accept_attribute(&self) -> String {
        self.allowed_extensions
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Hint shown next to the upload control
    #[must_use]
    pub fn describe(&self) -> String {
        let types = self
            .allowed_extensions
            .iter()
            .map(|ext| ext.to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(", ");
        format!("Supported formats: {types}. Maximum size: {}", format_limit(self.max_size_bytes))
    }

    /// Check a file against the policy
    ///
    /// # Errors
    ///
    /// Returns the first rule the file breaks.
    pub fn check(&self, file: &UploadedFile) -> Result<(), AssetError> {
        if file.data.is_empty() {
            return Err(AssetError::Empty);
        }
        if file.size() > self.max_size_bytes {
            return Err(AssetError::TooLarge {
                actual: file.size(),
                max: self.max_size_bytes,
            });
        }
        let extension = file.extension().unwrap_or_default();
        if !self.allowed_extensions.iter().any(|allowed| *allowed == extension) {
            return Err(AssetError::UnsupportedType(extension));
        }
        Ok(())
    }
}

/// The asset list of one page
#[derive(Debug, Clone)]
pub struct AssetManager {
    template_id: String,
    page_id: String,
    assets: Vec<Asset>,
}

impl AssetManager {
    /// Manage `assets` for a page
    #[must_use]
    pub fn new(template_id: impl Into<String>, page_id: impl Into<String>, assets: Vec<Asset>) -> Self {
        Self {
            template_id: template_id.into(),
            page_id: page_id.into(),
            assets,
        }
    }

    /// Manage the assets a fetched page came with
    #[must_use]
    pub fn for_page(template_id: impl Into<String>, page: &Page) -> Self {
        Self::new(template_id, page.key(), page.assets.clone())
    }

    /// Current list
    #[must_use]
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Look up an asset by id
    #[must_use]
    pub fn get(&self, asset_id: &str) -> Option<&Asset> {
        self.assets.iter().find(|asset| asset.id == asset_id)
    }

    /// Check and upload one file, appending the stored asset on success
    ///
    /// # Errors
    ///
    /// Policy violations fail before any request; backend failures leave the
    /// list unchanged.
    pub async fn upload(
        &mut self,
        api: &ApiClient,
        bearer: Option<&str>,
        policy: &UploadPolicy,
        file: &UploadedFile,
    ) -> Result<&Asset, AssetError> {
        policy.check(file)?;

        let asset = api
            .upload_asset(&self.template_id, &self.page_id, file, bearer)
            .await
            .inspect_err(|err| {
                tracing::warn!(filename = %file.filename, error = %err, "asset upload failed");
            })?;

        tracing::info!(
            template = %self.template_id,
            page = %self.page_id,
            asset = %asset.id,
            size = file.size(),
            "asset uploaded"
        );
        self.assets.push(asset);
        let last = self.assets.len() - 1;
        Ok(&self.assets[last])
    }

    /// Delete one asset, removing it from the list once the backend confirms
    ///
    /// # Errors
    ///
    /// Unknown ids fail without a request; backend failures leave the list
    /// unchanged.
    pub async fn delete(
        &mut self,
        api: &ApiClient,
        bearer: Option<&str>,
        asset_id: &str,
    ) -> Result<Asset, AssetError> {
        if self.get(asset_id).is_none() {
            return Err(AssetError::UnknownAsset(asset_id.to_string()));
        }

        api.delete_asset(&self.template_id, &self.page_id, asset_id, bearer)
            .await
            .inspect_err(|err| {
                tracing::warn!(asset = %asset_id, error = %err, "asset delete failed");
            })?;

        let position = self
            .assets
            .iter()
            .position(|asset| asset.id == asset_id)
            .ok_or_else(|| AssetError::UnknownAsset(asset_id.to_string()))?;
        tracing::info!(template = %self.template_id, page = %self.page_id, asset = %asset_id, "asset deleted");
        Ok(self.assets.remove(position))
    }
}

fn format_limit(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else if bytes >= 1024 && bytes % 1024 == 0 {
        format!("{}KB", bytes / 1024)
    } else {
        format!("{bytes} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Template;
    use crate::testing::{fixtures, FakeBackend};
    use axum::http::Method;
    use serde_json::json;

    async fn manager(backend: &FakeBackend) -> (ApiClient, AssetManager) {
        let template: Template = serde_json::from_value(fixtures::two_page_template()).unwrap();
        let front = template.page("front").unwrap();
        (backend.api(), AssetManager::for_page(&template.id, front))
    }

    fn png(name: &str, size: usize) -> UploadedFile {
        UploadedFile::new(name, "", vec![0_u8; size])
    }

    #[test]
    fn test_content_type_guessed_from_name() {
        assert_eq!(png("logo.png", 1).content_type, "image/png");
        assert_eq!(
            UploadedFile::new("doc.PDF", "application/octet-stream", vec![1]).content_type,
            "application/pdf"
        );
        assert_eq!(UploadedFile::new("x.svg", "image/svg+xml", vec![1]).content_type, "image/svg+xml");
    }

    #[test]
    fn test_policy_rejects_large_and_unknown_files() {
        let policy = UploadPolicy::default();

        let large = png("big.png", 10 * 1024 * 1024 + 1);
        assert!(matches!(policy.check(&large), Err(AssetError::TooLarge { .. })));

        let font = UploadedFile::new("font.ttf", "font/ttf", vec![1]);
        let err = policy.check(&font).unwrap_err();
        assert_eq!(err.user_message(), "Files of type .ttf are not accepted");

        assert!(matches!(policy.check(&png("e.png", 0)), Err(AssetError::Empty)));
        assert!(policy.check(&png("ok.JPG", 10)).is_ok());
    }

    #[test]
    fn test_policy_describe() {
        let policy = UploadPolicy::default();
        assert_eq!(
            policy.describe(),
            "Supported formats: JPG, JPEG, PNG, GIF, SVG, PDF. Maximum size: 10MB"
        );
        assert!(policy.accept_attribute().starts_with(".jpg,.jpeg"));
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_that_id() {
        let backend = FakeBackend::start().await;
        backend.reply(Method::DELETE, "/templates/1/pages/11/assets/100/", 204, json!(null));
        let (api, mut assets) = manager(&backend).await;

        let removed = assets.delete(&api, Some("tok"), "100").await.unwrap();

        assert_eq!(removed.name, "logo.png");
        let ids: Vec<_> = assets.assets().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["101"]);
        let calls = backend.calls_to(&Method::DELETE, "/templates/1/pages/11/assets/100/");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].authorization.as_deref(), Some("Bearer tok"));
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_list() {
        let backend = FakeBackend::start().await;
        backend.reply(
            Method::DELETE,
            "/templates/1/pages/11/assets/101/",
            500,
            json!({"detail": "Storage unavailable"}),
        );
        let (api, mut assets) = manager(&backend).await;

        let err = assets.delete(&api, None, "101").await.unwrap_err();

        assert_eq!(err.user_message(), "Storage unavailable");
        assert_eq!(assets.assets().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_id_makes_no_call() {
        let backend = FakeBackend::start().await;
        let (api, mut assets) = manager(&backend).await;

        let err = assets.delete(&api, None, "999").await.unwrap_err();

        assert!(matches!(err, AssetError::UnknownAsset(id) if id == "999"));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_upload_appends_returned_asset() {
        let backend = FakeBackend::start().await;
        backend.reply(
            Method::POST,
            "/templates/1/pages/11/assets/",
            201,
            json!({"id": 102, "name": "stamp.png", "type": "image/png", "size": 4, "url": "/media/stamp.png"}),
        );
        let (api, mut assets) = manager(&backend).await;

        let asset = assets
            .upload(&api, Some("tok"), &UploadPolicy::default(), &png("stamp.png", 4))
            .await
            .unwrap();
        assert_eq!(asset.id, "102");
        assert_eq!(assets.assets().len(), 3);

        let call = &backend.calls_to(&Method::POST, "/templates/1/pages/11/assets/")[0];
        assert!(call
            .content_type
            .as_deref()
            .unwrap()
            .starts_with("multipart/form-data"));
        assert!(call.body.contains("name=\"file\""));
        assert!(call.body.contains("filename=\"stamp.png\""));
    }

    #[tokio::test]
    async fn test_rejected_upload_makes_no_call() {
        let backend = FakeBackend::start().await;
        let (api, mut assets) = manager(&backend).await;

        let err = assets
            .upload(&api, None, &UploadPolicy::default(), &png("notes.txt", 4))
            .await
            .unwrap_err();

        assert!(matches!(err, AssetError::UnsupportedType(ext) if ext == "txt"));
        assert!(backend.calls().is_empty());
        assert_eq!(assets.assets().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_list() {
        let backend = FakeBackend::start().await;
        backend.reply(
            Method::POST,
            "/templates/1/pages/11/assets/",
            400,
            json!({"file": ["Unsupported image"]}),
        );
        let (api, mut assets) = manager(&backend).await;

        let err = assets
            .upload(&api, None, &UploadPolicy::default(), &png("a.png", 4))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "file: Unsupported image");
        assert_eq!(assets.assets().len(), 2);
    }
}
