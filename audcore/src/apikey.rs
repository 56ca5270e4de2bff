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
    },
};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Apikey {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub permissions: Permissions,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ApikeyCreation {
    pub name: String,
    pub permissions: Permissions,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ApikeyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Permissions>,
}

/// Returned on creation and key regeneration; the secret is only ever
/// available from this response.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApikeySecret {
    pub id: String,
    pub key: String,
}

impl Resource for Apikey {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

impl ApikeyCreation {
    pub fn normalized(mut self) -> Self {
        self.permissions = self.permissions.normalized();
        self
    }
}

impl ApikeyUpdate {
    pub fn normalized(mut self) -> Self {
        self.permissions = self.permissions.map(|p| p.normalized());
        self
    }
}

impl From<&Apikey> for ApikeyUpdate {
    fn from(apikey: &Apikey) -> Self {
        Self {
            name: Some(apikey.name.clone()),
            permissions: Some(apikey.permissions.clone()),
        }
    }
}

impl Validate for ApikeyCreation {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "name", &self.name, "Name is required");
        errors.into_result()
    }
}

impl Validate for ApikeyUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = self.name.as_deref() {
            require(&mut errors, "name", name, "Name is required");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod test {
    use crate::permission::ReadWritePermissions;
    use super::*;

    #[test]
    fn creation_normalized() {
        let mut permissions = Permissions::default();
        permissions.logs.read = true;
        permissions.set_repo_log_permissions("r1", ReadWritePermissions::new(true, false));
        let creation = ApikeyCreation {
            name: "ingest".into(),
            permissions,
        }.normalized();
        assert!(creation.validate().is_ok());
        assert!(creation.permissions.logs.repos.is_empty());
    }
}
