use chrono::{
    DateTime,
    Utc,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::ValidationErrors,
    permission::Permissions,
    resource::Resource,
    validate::{
        Validate,
        require,
        require_email,
    },
};

pub const DEFAULT_LANG: &str = "en";

fn default_lang() -> String {
    DEFAULT_LANG.to_string()
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub permissions: Permissions,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub authenticated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct UserCreation {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub lang: String,
    pub permissions: Permissions,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Resource for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.full_name()
    }
}

impl Default for UserCreation {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            lang: default_lang(),
            permissions: Permissions::default(),
        }
    }
}

impl UserCreation {
    /// The payload as sent; permissions are normalized on the way out.
    pub fn normalized(mut self) -> Self {
        self.permissions = self.permissions.normalized();
        self
    }
}

impl From<&User> for UserUpdate {
    fn from(user: &User) -> Self {
        Self {
            first_name: Some(user.first_name.clone()),
            last_name: Some(user.last_name.clone()),
            email: Some(user.email.clone()),
            lang: Some(user.lang.clone()),
            permissions: Some(user.permissions.clone()),
        }
    }
}

impl UserUpdate {
    pub fn normalized(mut self) -> Self {
        self.permissions = self.permissions.map(|p| p.normalized());
        self
    }
}

impl Validate for UserCreation {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "first_name", &self.first_name, "First name is required");
        require(&mut errors, "last_name", &self.last_name, "Last name is required");
        require_email(&mut errors, "email", &self.email);
        errors.into_result()
    }
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(first_name) = self.first_name.as_deref() {
            require(&mut errors, "first_name", first_name, "First name is required");
        }
        if let Some(last_name) = self.last_name.as_deref() {
            require(&mut errors, "last_name", last_name, "Last name is required");
        }
        if let Some(email) = self.email.as_deref() {
            require_email(&mut errors, "email", email);
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn validation() {
        let errors = UserCreation::default()
            .validate()
            .expect_err("empty form must not validate");
        assert_eq!(errors.len(), 3);

        let creation = UserCreation {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john.doe@example.net".into(),
            .. Default::default()
        };
        assert!(creation.validate().is_ok());
        assert_eq!(creation.lang, "en");

        let update = UserUpdate {
            email: Some("john.doe".into()),
            .. Default::default()
        };
        assert_eq!(
            update.validate().expect_err("bad email").field("email"),
            Some("Invalid email address"),
        );
    }

    #[test]
    fn decode_defaults() -> anyhow::Result<()> {
        let user: User = serde_json::from_str(r#"{
            "id": "u1",
            "first_name": "John",
            "last_name": "Doe",
            "email": "john.doe@example.net",
            "created_at": "2024-01-02T03:04:05Z"
        }"#)?;
        assert_eq!(user.label(), "John Doe");
        assert_eq!(user.lang, "en");
        assert_eq!(user.permissions, Permissions::default());
        assert!(user.authenticated_at.is_none());
        Ok(())
    }
}
