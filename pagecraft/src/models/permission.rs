use serde::{Deserialize, Serialize};
use std::fmt;

/// What a permission allows on a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionType {
    /// See the template
    #[default]
    View,
    /// Change the template
    Edit,
    /// Generate documents from the template
    Generate,
}

impl PermissionType {
    /// All permission kinds, in display order
    pub const ALL: [Self; 3] = [Self::View, Self::Edit, Self::Generate];

    /// Wire value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Generate => "generate",
        }
    }
}

impl fmt::Display for PermissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PermissionType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "view" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            "generate" => Ok(Self::Generate),
            other => Err(format!("unknown permission type `{other}`")),
        }
    }
}

/// A user as listed by `GET /users/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalRef {
    /// Backend identifier
    #[serde(deserialize_with = "super::id::deserialize")]
    pub id: String,
    /// Login name
    pub username: String,
}

/// A group as listed by `GET /groups/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Backend identifier
    #[serde(deserialize_with = "super::id::deserialize")]
    pub id: String,
    /// Group name
    pub name: String,
}

/// A grant on a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Backend identifier
    #[serde(deserialize_with = "super::id::deserialize")]
    pub id: String,

    /// Granted capability
    pub permission_type: PermissionType,

    /// Grantee user id
    #[serde(default, deserialize_with = "super::id::option::deserialize")]
    pub user: Option<String>,

    /// Grantee group id
    #[serde(default, deserialize_with = "super::id::option::deserialize")]
    pub group: Option<String>,

    /// Expanded user, when the backend includes it
    #[serde(default)]
    pub user_details: Option<PrincipalRef>,

    /// Expanded group, when the backend includes it
    #[serde(default)]
    pub group_details: Option<Group>,
}

impl Permission {
    /// `User: name` or `Group: name`, falling back to raw ids
    #[must_use]
    pub fn grantee_label(&self) -> String {
        if let Some(user) = &self.user_details {
            return format!("User: {}", user.username);
        }
        if let Some(group) = &self.group_details {
            return format!("Group: {}", group.name);
        }
        match (&self.user, &self.group) {
            (Some(user), _) => format!("User #{user}"),
            (None, Some(group)) => format!("Group #{group}"),
            (None, None) => "Unknown grantee".to_string(),
        }
    }
}

/// Body of `POST /templates/{id}/add_permission/`
///
/// Exactly one of `user` or `group` is set; the constructors enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPermission {
    /// Granted capability
    pub permission_type: PermissionType,
    /// Grantee user id
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    /// Grantee group id
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<String>,
}

impl NewPermission {
    /// Grant to a single user
    #[must_use]
    pub fn for_user(permission_type: PermissionType, user: impl Into<String>) -> Self {
        Self {
            permission_type,
            user: Some(user.into()),
            group: None,
        }
    }

    /// Grant to a group
    #[must_use]
    pub fn for_group(permission_type: PermissionType, group: impl Into<String>) -> Self {
        Self {
            permission_type,
            user: None,
            group: Some(group.into()),
        }
    }

    /// Build from form input where either field may be blank
    ///
    /// Returns `None` unless exactly one grantee is given.
    #[must_use]
    pub fn from_choice(permission_type: PermissionType, user: &str, group: &str) -> Option<Self> {
        match (user.trim(), group.trim()) {
            ("", "") => None,
            (user, "") => Some(Self::for_user(permission_type, user)),
            ("", group) => Some(Self::for_group(permission_type, group)),
            _ => None,
        }
    }

    /// Grantee user id
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Grantee group id
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }
}
