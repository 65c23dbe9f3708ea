//! Posted form bodies checked with `validator`
//!
//! Values are trimmed before validation so whitespace-only input counts as
//! empty.

use serde::Deserialize;
use validator::Validate;

use super::ValidationErrors;
use crate::models::{NewPermission, PermissionType, TemplateInput, TemplateType};

/// Sign-in form
#[derive(Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    /// Account name
    #[validate(length(min = 1, message = "Username is required"))]
    #[serde(default)]
    pub username: String,

    /// Password, never trimmed
    #[validate(length(min = 1, message = "Password is required"))]
    #[serde(default)]
    pub password: String,

    /// Where to go after signing in
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    /// Trim the username and validate
    ///
    /// # Errors
    ///
    /// Returns the per-field errors when either value is missing.
    pub fn checked(mut self) -> Result<Self, ValidationErrors> {
        self.username = self.username.trim().to_string();
        self.validate()?;
        Ok(self)
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("next", &self.next)
            .finish()
    }
}

/// Template create/edit form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TemplateForm {
    /// Display name
    #[validate(length(min = 1, max = 200, message = "Template name is required"))]
    #[serde(default)]
    pub name: String,

    /// Version label
    #[validate(length(min = 1, max = 50, message = "Version is required"))]
    #[serde(default)]
    pub version: String,

    /// Category
    #[validate(length(min = 1, message = "Type is required"))]
    #[serde(rename = "type", default)]
    pub template_type: String,

    /// Optional description
    #[serde(default)]
    pub description: String,
}

impl Default for TemplateForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: "1.0".to_string(),
            template_type: TemplateType::Official.as_str().to_string(),
            description: String::new(),
        }
    }
}

impl From<&TemplateInput> for TemplateForm {
    fn from(input: &TemplateInput) -> Self {
        Self {
            name: input.name.clone(),
            version: input.version.clone().unwrap_or_default(),
            template_type: input.template_type.as_str().to_string(),
            description: input.description.clone().unwrap_or_default(),
        }
    }
}

impl TemplateForm {
    /// Trim, validate and convert to a request body
    ///
    /// # Errors
    ///
    /// Returns the per-field errors when a required value is missing.
    pub fn to_input(&self) -> Result<TemplateInput, ValidationErrors> {
        let trimmed = Self {
            name: self.name.trim().to_string(),
            version: self.version.trim().to_string(),
            template_type: self.template_type.trim().to_string(),
            description: self.description.trim().to_string(),
        };
        trimmed.validate()?;

        Ok(TemplateInput {
            name: trimmed.name,
            version: Some(trimmed.version),
            template_type: TemplateType::from(trimmed.template_type),
            description: (!trimmed.description.is_empty()).then_some(trimmed.description),
        })
    }
}

/// Grant form on the permissions screen
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionForm {
    /// `view`, `edit` or `generate`
    #[serde(default)]
    pub permission_type: String,
    /// User id, blank when granting to a group
    #[serde(default)]
    pub user: String,
    /// Group id, blank when granting to a user
    #[serde(default)]
    pub group: String,
}

impl PermissionForm {
    /// Check the choice and build the request body
    ///
    /// # Errors
    ///
    /// Fails when the type is unknown or not exactly one grantee is chosen.
    pub fn to_new_permission(&self) -> Result<NewPermission, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let permission_type = self
            .permission_type
            .trim()
            .parse::<PermissionType>()
            .map_err(|message| errors.add_with_code("permission_type", message, "choice"))
            .ok();
        let grant = NewPermission::from_choice(permission_type.unwrap_or_default(), &self.user, &self.group);
        if grant.is_none() {
            errors.add_with_code("grantee", "Choose either a user or a group", "choice");
        }

        match grant {
            Some(grant) if !errors.has_errors() => Ok(grant),
            _ => Err(errors),
        }
    }
}
