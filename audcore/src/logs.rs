//! Log entries, as browsed from the log screens.  These are read-only
//! from the point of view of the administration client.

use chrono::{
    DateTime,
    Utc,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::BackendError,
    resource::Resource,
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CustomField {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
}

/// An actor or a resource attached to a log entry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Entity {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub extra: Vec<CustomField>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Tag {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Node {
    #[serde(rename = "ref")]
    pub reference: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct LogEntry {
    pub id: String,
    pub action: Action,
    #[serde(default)]
    pub source: Vec<CustomField>,
    #[serde(default)]
    pub actor: Option<Entity>,
    #[serde(default)]
    pub resource: Option<Entity>,
    #[serde(default)]
    pub details: Vec<CustomField>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub node_path: Vec<Node>,
    pub saved_at: DateTime<Utc>,
}

/// Filters for the log browser; carried in the query string so searches
/// can be shared as links.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct LogSearchParams {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repo_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
}

impl Resource for LogEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        format!("{}/{}", self.action.category, self.action.kind)
    }
}

impl LogSearchParams {
    pub fn for_repo(repo_id: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            .. Default::default()
        }
    }

    /// The url-encoded form of these parameters.
    pub fn to_query(&self) -> Result<String, BackendError> {
        serde_urlencoded::to_string(self)
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    pub fn from_query(query: &str) -> Result<Self, BackendError> {
        serde_urlencoded::from_str(query.trim_start_matches('?'))
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Whether anything beyond the repository is being filtered on.
    pub fn is_filtering(&self) -> bool {
        self != &Self::for_repo(self.repo_id.clone())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn query_roundtrip() -> anyhow::Result<()> {
        let params = LogSearchParams {
            actor_name: Some("John Doe".into()),
            since: Some("2024-01-02T03:04:05Z".parse()?),
            .. LogSearchParams::for_repo("r1")
        };
        let query = params.to_query()?;
        assert!(query.starts_with("repo_id=r1&actor_name=John+Doe&since="));
        assert_eq!(LogSearchParams::from_query(&format!("?{query}"))?, params);
        assert!(params.is_filtering());
        assert!(!LogSearchParams::for_repo("r1").is_filtering());
        Ok(())
    }

    #[test]
    fn decode_entry() -> anyhow::Result<()> {
        let entry: LogEntry = serde_json::from_str(r#"{
            "id": "l1",
            "action": {"type": "login", "category": "authentication"},
            "actor": {"ref": "u1", "type": "user", "name": "John Doe"},
            "tags": [{"type": "security"}],
            "node_path": [{"ref": "n1", "name": "Customer 1"}],
            "saved_at": "2024-01-02T03:04:05Z"
        }"#)?;
        assert_eq!(entry.label(), "authentication/login");
        assert_eq!(entry.tags[0].kind, "security");
        assert!(entry.resource.is_none());
        Ok(())
    }
}
