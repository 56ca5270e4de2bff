use chrono::{
    DateTime,
    Utc,
};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    str::FromStr,
};

use crate::{
    error::ValidationErrors,
    resource::Resource,
    validate::{
        Validate,
        require,
    },
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoStatus {
    #[default]
    Enabled,
    Readonly,
    Disabled,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct RepoStats {
    pub first_log_date: Option<DateTime<Utc>>,
    pub last_log_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub log_count: u64,
    #[serde(default)]
    pub storage_size: u64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Repo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: RepoStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<RepoStats>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct RepoCreation {
    pub name: String,
    pub status: RepoStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct RepoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RepoStatus>,
}

impl Resource for Repo {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

impl From<&Repo> for RepoUpdate {
    fn from(repo: &Repo) -> Self {
        Self {
            name: Some(repo.name.clone()),
            status: Some(repo.status),
        }
    }
}

impl Validate for RepoCreation {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "name", &self.name, "Name is required");
        errors.into_result()
    }
}

impl Validate for RepoUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = self.name.as_deref() {
            require(&mut errors, "name", name, "Name is required");
        }
        errors.into_result()
    }
}

impl fmt::Display for RepoStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            RepoStatus::Enabled => "enabled",
            RepoStatus::Readonly => "readonly",
            RepoStatus::Disabled => "disabled",
        })
    }
}

impl FromStr for RepoStatus {
    type Err = ValidationErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enabled" => Ok(RepoStatus::Enabled),
            "readonly" => Ok(RepoStatus::Readonly),
            "disabled" => Ok(RepoStatus::Disabled),
            s => {
                let mut errors = ValidationErrors::new();
                errors.push("status", format!("unknown repository status: {s}"));
                Err(errors)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decode() -> anyhow::Result<()> {
        let repo: Repo = serde_json::from_str(r#"{
            "id": "0e5bd4a5-7cbb-4bf1-9c42-2c0b8b1d0a1f",
            "name": "Orders",
            "status": "readonly",
            "created_at": "2024-01-02T03:04:05Z"
        }"#)?;
        assert_eq!(repo.label(), "Orders");
        assert_eq!(repo.status, RepoStatus::Readonly);
        assert!(repo.stats.is_none());
        assert_eq!(RepoUpdate::from(&repo).status, Some(RepoStatus::Readonly));
        Ok(())
    }

    #[test]
    fn validation() {
        assert!(RepoCreation::default().validate().is_err());
        assert!(RepoCreation { name: "Orders".into(), .. Default::default() }.validate().is_ok());
        assert!(RepoUpdate::default().validate().is_ok());
        assert!(RepoUpdate { name: Some(" ".into()), .. Default::default() }.validate().is_err());
    }

    #[test]
    fn update_skips_unset() -> anyhow::Result<()> {
        let update = RepoUpdate { status: Some(RepoStatus::Disabled), .. Default::default() };
        assert_eq!(serde_json::to_string(&update)?, r#"{"status":"disabled"}"#);
        Ok(())
    }
}
