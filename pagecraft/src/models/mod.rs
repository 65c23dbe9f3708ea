//! Wire types exchanged with the template backend
//!
//! Every request and response body has an explicit serde type here and is
//! parsed before use. Identifiers are carried as strings: the backend emits
//! both integers and UUIDs depending on the resource.

mod asset;
mod auth;
mod page;
mod permission;
mod render;
mod template;

pub use asset::Asset;
pub use auth::{LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RefreshResponse, User};
pub use page::{Field, Page, PageUnits};
pub use permission::{Group, NewPermission, Permission, PermissionType, PrincipalRef};
pub use render::{RenderRequest, RenderResult};
pub use template::{Template, TemplateInput, TemplateType};

/// Serde adapters for identifiers that arrive as either strings or numbers
pub(crate) mod id {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    impl From<Raw> for String {
        fn from(raw: Raw) -> Self {
            match raw {
                Raw::Text(s) => s,
                Raw::Int(n) => n.to_string(),
                Raw::Float(f) => f.to_string(),
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Raw::deserialize(deserializer)
            .map(String::from)
            .map_err(|_| de::Error::custom("expected a string or a number"))
    }

    pub mod option {
        use super::Raw;
        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Ok(Option::<Raw>::deserialize(deserializer)?.map(String::from))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "super::id::deserialize")]
        id: String,
        #[serde(default, deserialize_with = "super::id::option::deserialize")]
        parent: Option<String>,
    }

    #[test]
    fn test_numeric_and_string_ids_normalize() {
        let a: Probe = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(a.id, "42");
        assert_eq!(a.parent, None);

        let b: Probe =
            serde_json::from_str(r#"{"id": "9f1c", "parent": 7}"#).unwrap();
        assert_eq!(b.id, "9f1c");
        assert_eq!(b.parent.as_deref(), Some("7"));
    }

    #[test]
    fn test_non_scalar_id_is_rejected() {
        assert!(serde_json::from_str::<Probe>(r#"{"id": [1]}"#).is_err());
    }
}
