use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Hypermedia link attached to paged collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
        }
    }
}

/// Repository user account. The password is accepted on create and never returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    #[serde(default = "default_true")]
    pub active: bool,

    #[serde(default)]
    pub system: bool,

    #[serde(default)]
    pub external: bool,

    /// Node path relative to the repository root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_last_modified: Option<DateTime<FixedOffset>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Group>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            first_name: None,
            last_name: None,
            email: None,
            password: None,
            active: true,
            system: false,
            external: false,
            path: None,
            password_last_modified: None,
            groups: None,
            uri: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<String>>,

    #[serde(default)]
    pub external: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            members: None,
            external: false,
            href: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCollection {
    pub users: Vec<User>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCollection {
    pub groups: Vec<Group>,
    pub links: Vec<Link>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_password_is_never_serialized() {
        let mut user = User::new("editor");
        user.password = Some("secret".to_string());
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["active"], true);
    }

    #[test]
    fn test_user_input_defaults() {
        let user: User = serde_json::from_value(json!({
            "username": "editor",
            "password": "secret",
            "firstName": "Ed"
        }))
        .unwrap();
        assert!(user.active);
        assert!(!user.external);
        assert_eq!(user.first_name.as_deref(), Some("Ed"));
        assert_eq!(user.password.as_deref(), Some("secret"));
    }
}
