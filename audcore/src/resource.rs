use serde::{Deserialize, Serialize};
use std::{
    fmt,
    str::FromStr,
};

use crate::error::ValidationErrors;

pub mod traits;

/// The kinds of resources listed by the administration screens; also the
/// leading part of every query cache key.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Repos,
    Users,
    Apikeys,
    Logs,
}

/// Anything listed by a management screen.
pub trait Resource {
    fn id(&self) -> &str;
    /// A human readable name for confirmation prompts.
    fn label(&self) -> String {
        self.id().to_string()
    }
}

/// The free-text filter shared by the entity listings.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

/// The identifier returned by the backend upon creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CreatedId {
    pub id: String,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Repos => "repos",
            ResourceKind::Users => "users",
            ResourceKind::Apikeys => "apikeys",
            ResourceKind::Logs => "logs",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ValidationErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "repos" => Ok(ResourceKind::Repos),
            "users" => Ok(ResourceKind::Users),
            "apikeys" => Ok(ResourceKind::Apikeys),
            "logs" => Ok(ResourceKind::Logs),
            s => {
                let mut errors = ValidationErrors::new();
                errors.push("kind", format!("unknown resource kind: {s}"));
                Err(errors)
            }
        }
    }
}

impl SearchFilter {
    /// Build the filter from the search box; blank text means no filter.
    pub fn from_search(text: &str) -> Self {
        let text = text.trim();
        Self {
            q: (!text.is_empty()).then(|| text.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn kind_roundtrip() {
        for kind in [
            ResourceKind::Repos,
            ResourceKind::Users,
            ResourceKind::Apikeys,
            ResourceKind::Logs,
        ] {
            assert_eq!(kind.to_string().parse::<ResourceKind>(), Ok(kind));
        }
        assert!("workspaces".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn search_filter() {
        assert_eq!(SearchFilter::from_search("  "), SearchFilter::default());
        assert_eq!(SearchFilter::from_search(" acme ").q.as_deref(), Some("acme"));
    }
}
