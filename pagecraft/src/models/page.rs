use serde::{Deserialize, Serialize};
use std::fmt;

use super::Asset;

/// Measurement unit for page dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageUnits {
    /// Millimetres
    #[default]
    Mm,
    /// Pixels
    Px,
}

impl PageUnits {
    /// Wire value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::Px => "px",
        }
    }

    /// Parse a form value, defaulting to millimetres
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim() {
            "px" => Self::Px,
            _ => Self::Mm,
        }
    }
}

impl fmt::Display for PageUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fillable input on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Key used in the render payload
    pub name: String,

    /// Label shown to the person filling the form
    #[serde(default)]
    pub label: String,

    /// Must be non-empty (after trimming) before leaving the page
    #[serde(default)]
    pub required: bool,

    /// Input type hint, e.g. `text` or `date`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,

    /// Placeholder text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl Field {
    /// A required text field
    #[must_use]
    pub fn required(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            required: true,
            field_type: None,
            placeholder: None,
        }
    }

    /// An optional text field
    #[must_use]
    pub fn optional(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, label)
        }
    }

    /// HTML input type, defaulting to `text`
    #[must_use]
    pub fn input_type(&self) -> &str {
        self.field_type.as_deref().unwrap_or("text")
    }
}

/// One page of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Backend identifier, absent on pages not yet created
    #[serde(
        default,
        deserialize_with = "super::id::option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    /// Name, unique within its template
    pub name: String,

    /// Page width in `units`
    #[serde(default = "default_width")]
    pub width: f64,

    /// Page height in `units`
    #[serde(default = "default_height")]
    pub height: f64,

    /// Dimension unit
    #[serde(default)]
    pub units: PageUnits,

    /// Bleed margin in `units`
    #[serde(default = "default_bleeds")]
    pub bleeds: f64,

    /// Page markup
    #[serde(default)]
    pub html: String,

    /// Fillable inputs
    #[serde(default)]
    pub fields: Vec<Field>,

    /// Files referenced by the markup
    #[serde(default, skip_serializing)]
    pub assets: Vec<Asset>,
}

const fn default_width() -> f64 {
    210.0
}

const fn default_height() -> f64 {
    297.0
}

const fn default_bleeds() -> f64 {
    3.0
}

impl Default for Page {
    /// An A4 page in millimetres with `title` and `name` fields
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            width: default_width(),
            height: default_height(),
            units: PageUnits::Mm,
            bleeds: default_bleeds(),
            html: String::new(),
            fields: vec![Field::required("title", "Title"), Field::required("name", "Name")],
            assets: Vec::new(),
        }
    }
}

impl Page {
    /// Identifier used in resource paths; the name until the backend assigns an id
    #[must_use]
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }

    /// Fields that must be filled
    pub fn required_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|field| field.required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_page_defaults() {
        let page = Page::default();
        assert!((page.width - 210.0).abs() < f64::EPSILON);
        assert!((page.height - 297.0).abs() < f64::EPSILON);
        assert!((page.bleeds - 3.0).abs() < f64::EPSILON);
        assert_eq!(page.units, PageUnits::Mm);
        let names: Vec<_> = page.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["title", "name"]);
        assert_eq!(page.required_fields().count(), 2);
    }

    #[test]
    fn test_sparse_page_fills_defaults() {
        let page: Page = serde_json::from_str(r#"{"name": "cover"}"#).unwrap();
        assert_eq!(page.key(), "cover");
        assert!((page.width - 210.0).abs() < f64::EPSILON);
        assert!(page.fields.is_empty());
    }

    #[test]
    fn test_assets_are_not_sent_back() {
        let json = r#"{
            "id": 4, "name": "cover", "units": "px",
            "assets": [{"id": 1, "name": "logo.png", "type": "image/png", "size": 10, "url": "/m/logo.png"}]
        }"#;
        let page: Page = serde_json::from_str(json).unwrap();
        assert_eq!(page.key(), "4");
        assert_eq!(page.units, PageUnits::Px);
        assert_eq!(page.assets.len(), 1);

        let value = serde_json::to_value(&page).unwrap();
        assert!(value.get("assets").is_none());
        assert_eq!(value["units"], "px");
    }

    #[test]
    fn test_field_type_defaults_to_text() {
        let field: Field = serde_json::from_str(r#"{"name": "dob", "type": "date"}"#).unwrap();
        assert_eq!(field.input_type(), "date");
        assert!(!field.required);
        assert_eq!(Field::optional("x", "X").input_type(), "text");
    }

    #[test]
    fn test_units_parse() {
        assert_eq!(PageUnits::parse_or_default("px"), PageUnits::Px);
        assert_eq!(PageUnits::parse_or_default(" mm "), PageUnits::Mm);
        assert_eq!(PageUnits::parse_or_default("in"), PageUnits::Mm);
    }
}
