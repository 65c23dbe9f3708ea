//! Per-field validation failures
//!
//! Keyed by field name in name order, so the set of invalid fields compares
//! and renders the same way every time.

use std::collections::{BTreeMap, BTreeSet};

/// One reason a field was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Short rule name such as `required` or `range`
    pub code: String,
    /// Text shown next to the input
    pub message: String,
}

/// Rejected fields and why
///
/// ```rust
/// use pagecraft::forms::ValidationErrors;
///
/// let mut errors = ValidationErrors::new();
/// errors.add_with_code("title", "Title is required", "required");
/// errors.add_with_code("width", "Width must be at least 1", "range");
///
/// assert_eq!(errors.first_message("title"), "Title is required");
/// errors.remove("title");
/// assert!(!errors.has_field_error("title"));
/// assert!(errors.has_errors());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    by_field: BTreeMap<String, Vec<FieldError>>,
}

impl ValidationErrors {
    /// Nothing rejected yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject `field` under rule `code`
    pub fn add_with_code(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) {
        let error = FieldError {
            code: code.into(),
            message: message.into(),
        };
        self.by_field.entry(field.into()).or_default().push(error);
    }

    /// Anything rejected
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.by_field.is_empty()
    }

    /// `field` was rejected
    #[must_use]
    pub fn has_field_error(&self, field: &str) -> bool {
        self.by_field.contains_key(field)
    }

    /// First message for `field`, empty when the field passed
    #[must_use]
    pub fn first_message(&self, field: &str) -> String {
        self.by_field
            .get(field)
            .and_then(|errors| errors.first())
            .map(|error| error.message.clone())
            .unwrap_or_default()
    }

    /// Every message for `field`, joined by spaces
    #[must_use]
    pub fn joined(&self, field: &str) -> String {
        self.by_field.get(field).map_or_else(String::new, |errors| {
            errors
                .iter()
                .map(|error| error.message.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    /// All messages across fields, in field order
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.by_field
            .values()
            .flatten()
            .map(|error| error.message.as_str())
    }

    /// Names of rejected fields
    #[must_use]
    pub fn fields_with_errors(&self) -> BTreeSet<String> {
        self.by_field.keys().cloned().collect()
    }

    /// Forget one field's failures
    pub fn remove(&mut self, field: &str) {
        self.by_field.remove(field);
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.by_field.clear();
    }

    /// Rejected fields with their failures
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldError])> {
        self.by_field
            .iter()
            .map(|(field, errors)| (field.as_str(), errors.as_slice()))
    }
}

impl From<validator::ValidationErrors> for ValidationErrors {
    fn from(source: validator::ValidationErrors) -> Self {
        let mut errors = Self::new();
        for (field, failures) in source.field_errors() {
            for failure in failures {
                let message = failure
                    .message
                    .as_ref()
                    .map_or_else(|| failure.code.to_string(), ToString::to_string);
                errors.add_with_code(field.to_string(), message, failure.code.to_string());
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_and_joined_messages() {
        let mut errors = ValidationErrors::new();
        errors.add_with_code("fields", "Row 1 needs a name.", "required");
        errors.add_with_code("fields", "Row 2 needs a label.", "required");

        assert_eq!(errors.first_message("fields"), "Row 1 needs a name.");
        assert_eq!(errors.joined("fields"), "Row 1 needs a name. Row 2 needs a label.");
        assert_eq!(errors.first_message("name"), "");
        assert_eq!(errors.joined("name"), "");
    }

    #[test]
    fn test_messages_follow_field_order() {
        let mut errors = ValidationErrors::new();
        errors.add_with_code("user", "Pick a user", "choice");
        errors.add_with_code("permission_type", "Unknown permission", "choice");

        let fields: Vec<_> = errors.fields_with_errors().into_iter().collect();
        assert_eq!(fields, ["permission_type", "user"]);
        assert_eq!(
            errors.messages().collect::<Vec<_>>(),
            ["Unknown permission", "Pick a user"]
        );
    }

    #[test]
    fn test_remove_leaves_other_fields() {
        let mut errors = ValidationErrors::new();
        errors.add_with_code("a", "x", "required");
        errors.add_with_code("b", "y", "required");

        errors.remove("a");
        assert!(!errors.has_field_error("a"));
        assert!(errors.has_field_error("b"));

        errors.clear();
        assert!(!errors.has_errors());
    }

    #[test]
    fn test_codes_survive_iteration() {
        let mut errors = ValidationErrors::new();
        errors.add_with_code("width", "Width must be at least 1", "range");

        let (field, failures) = errors.iter().next().unwrap();
        assert_eq!(field, "width");
        assert_eq!(failures[0].code, "range");
    }
}
