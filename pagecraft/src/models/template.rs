use serde::{Deserialize, Serialize};
use std::fmt;

use super::Page;

/// Template category
///
/// Unknown categories are kept verbatim so a newer backend never breaks
/// listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TemplateType {
    /// Government and institutional documents
    #[default]
    Official,
    /// Company documents
    Business,
    /// Private documents
    Personal,
    /// Anything the backend adds later
    Other(String),
}

impl TemplateType {
    /// The known categories, in display order
    pub const KNOWN: [Self; 3] = [Self::Official, Self::Business, Self::Personal];

    /// Wire value
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Official => "official",
            Self::Business => "business",
            Self::Personal => "personal",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for TemplateType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "official" => Self::Official,
            "business" => Self::Business,
            "personal" => Self::Personal,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for TemplateType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<TemplateType> for String {
    fn from(value: TemplateType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document template with its pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Backend identifier
    #[serde(deserialize_with = "super::id::deserialize")]
    pub id: String,

    /// Display name
    pub name: String,

    /// Version label; numeric versions are rendered as text
    #[serde(default, deserialize_with = "super::id::option::deserialize")]
    pub version: Option<String>,

    /// Category
    #[serde(rename = "type", default)]
    pub template_type: TemplateType,

    /// Optional long description
    #[serde(default)]
    pub description: Option<String>,

    /// Pages in fill order
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Template {
    /// Look up a page by its identifier or name
    #[must_use]
    pub fn page(&self, key: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.key() == key || page.name == key)
    }

    /// Total number of fields across all pages
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.pages.iter().map(|page| page.fields.len()).sum()
    }
}

/// Body for creating or updating a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TemplateInput {
    /// Display name
    pub name: String,

    /// Version label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Category
    #[serde(rename = "type")]
    pub template_type: TemplateType,

    /// Optional long description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&Template> for TemplateInput {
    fn from(template: &Template) -> Self {
        Self {
            name: template.name.clone(),
            version: template.version.clone(),
            template_type: template.template_type.clone(),
            description: template.description.clone(),
        }
    }
}
