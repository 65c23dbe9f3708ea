//! Page editor form
//!
//! Browsers post field rows as indexed keys (`field_name_0`,
//! `field_label_0`, `field_required_0`, ...). Unchecked checkboxes are not
//! sent at all, so rows are matched by index rather than position.

use std::collections::{BTreeMap, BTreeSet};

use super::ValidationErrors;
use crate::models::{Field, Page, PageUnits};

/// One field row in the editor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRow {
    /// Field key
    pub name: String,
    /// Field label
    pub label: String,
    /// Required flag
    pub required: bool,
}

impl FieldRow {
    fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.label.trim().is_empty()
    }
}

/// Raw page editor input, kept as text so it can be re-rendered unchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageForm {
    /// Page name
    pub name: String,
    /// Width as typed
    pub width: String,
    /// Height as typed
    pub height: String,
    /// `mm` or `px`
    pub units: String,
    /// Bleeds as typed
    pub bleeds: String,
    /// Markup
    pub html: String,
    /// Field rows in index order
    pub fields: Vec<FieldRow>,
}

impl Default for PageForm {
    fn default() -> Self {
        Self::from_page(&Page::default())
    }
}

impl PageForm {
    /// Prefill from an existing page
    #[must_use]
    pub fn from_page(page: &Page) -> Self {
        Self {
            name: page.name.clone(),
            width: format_number(page.width),
            height: format_number(page.height),
            units: page.units.as_str().to_string(),
            bleeds: format_number(page.bleeds),
            html: page.html.clone(),
            fields: page
                .fields
                .iter()
                .map(|field| FieldRow {
                    name: field.name.clone(),
                    label: field.label.clone(),
                    required: field.required,
                })
                .collect(),
        }
    }

    /// Parse posted key/value pairs
    #[must_use]
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut form = Self {
            name: String::new(),
            width: String::new(),
            height: String::new(),
            units: PageUnits::Mm.as_str().to_string(),
            bleeds: String::new(),
            html: String::new(),
            fields: Vec::new(),
        };
        let mut rows: BTreeMap<usize, FieldRow> = BTreeMap::new();

        for (key, value) in pairs {
            match key.as_str() {
                "name" => form.name.clone_from(value),
                "width" => form.width.clone_from(value),
                "height" => form.height.clone_from(value),
                "units" => form.units.clone_from(value),
                "bleeds" => form.bleeds.clone_from(value),
                "html" => form.html.clone_from(value),
                other => {
                    if let Some((column, index)) = row_key(other) {
                        let row = rows.entry(index).or_default();
                        match column {
                            "name" => row.name.clone_from(value),
                            "label" => row.label.clone_from(value),
                            _ => row.required = matches!(value.as_str(), "on" | "true" | "1"),
                        }
                    }
                }
            }
        }

        form.fields = rows.into_values().collect();
        form
    }

    /// Append an empty row for the editor's "add field" action
    #[must_use]
    pub fn with_blank_row(mut self) -> Self {
        self.fields.push(FieldRow::default());
        self
    }

    /// Check the input and build the page
    ///
    /// Fully blank rows are ignored. `existing_name` pins the name when
    /// editing, since page names cannot change.
    pub fn validate(&self, existing_name: Option<&str>) -> Result<Page, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = existing_name.unwrap_or(&self.name).trim().to_string();
        if name.is_empty() {
            errors.add_with_code("name", "Page name is required", "required");
        }

        let width = parse_dimension(&self.width, "width", "Width", 1.0, &mut errors);
        let height = parse_dimension(&self.height, "height", "Height", 1.0, &mut errors);
        let bleeds = parse_dimension(&self.bleeds, "bleeds", "Bleeds", 0.0, &mut errors);

        let rows: Vec<&FieldRow> = self.fields.iter().filter(|row| !row.is_blank()).collect();
        if rows
            .iter()
            .any(|row| row.name.trim().is_empty() || row.label.trim().is_empty())
        {
            errors.add_with_code(
                "fields",
                "Every field must have a name and a label",
                "incomplete",
            );
        }
        let mut seen = BTreeSet::new();
        for row in &rows {
            let key = row.name.trim();
            if !key.is_empty() && !seen.insert(key) {
                errors.add_with_code("fields", format!("Field name `{key}` is used twice"), "duplicate");
            }
        }

        if errors.has_errors() {
            return Err(errors);
        }

        Ok(Page {
            id: None,
            name,
            width,
            height,
            units: PageUnits::parse_or_default(&self.units),
            bleeds,
            html: self.html.clone(),
            fields: rows
                .into_iter()
                .map(|row| Field {
                    name: row.name.trim().to_string(),
                    label: row.label.trim().to_string(),
                    required: row.required,
                    field_type: None,
                    placeholder: None,
                })
                .collect(),
            assets: Vec::new(),
        })
    }
}

fn row_key(key: &str) -> Option<(&str, usize)> {
    let rest = key.strip_prefix("field_")?;
    let (column, index) = rest.rsplit_once('_')?;
    let index = index.parse().ok()?;
    matches!(column, "name" | "label" | "required").then_some((column, index))
}

fn parse_dimension(
    raw: &str,
    key: &str,
    label: &str,
    min: f64,
    errors: &mut ValidationErrors,
) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= min => value,
        Ok(_) => {
            errors.add_with_code(key, format!("{label} must be at least {min}"), "range");
            min
        }
        Err(_) => {
            errors.add_with_code(key, format!("{label} must be a number"), "number");
            min
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
