use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `POST /render/generate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderRequest {
    /// Template to render
    pub template_id: String,
    /// Field values keyed by field name
    pub data: BTreeMap<String, String>,
}

/// Where the generated document can be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResult {
    /// Download location
    pub url: String,

    /// Inline preview, when the renderer produced one
    #[serde(
        rename = "previewUrl",
        alias = "preview_url",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preview_url: Option<String>,
}
