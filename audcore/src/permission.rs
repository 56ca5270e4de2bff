//! Permissions
//!
//! A grant describes what a principal (user or API key) may do: global
//! log access with per-repository overrides, plus read/write access on
//! the administrative entities.  The derived [`ApplicablePermissions`]
//! is a display summary only; enforcement is done by the backend.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReadWritePermissions {
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub write: bool,
}

/// The wire representation of a per-repository log grant.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RepoLogPermissions {
    pub repo_id: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub write: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogsPermissions {
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub write: bool,
    // keyed by repository id; the backend sends and expects a list.
    #[serde(default, with = "repo_list")]
    pub repos: BTreeMap<String, ReadWritePermissions>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ManagementPermissions {
    #[serde(default)]
    pub repos: ReadWritePermissions,
    #[serde(default)]
    pub users: ReadWritePermissions,
    #[serde(default)]
    pub apikeys: ReadWritePermissions,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Permissions {
    #[serde(default)]
    pub is_superadmin: bool,
    #[serde(default)]
    pub logs: LogsPermissions,
    #[serde(default)]
    pub management: ManagementPermissions,
}

/// How much of the known repository set a log permission reaches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionScope {
    All,
    Partial,
    #[default]
    None,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApplicableLogPermissions {
    pub read: PermissionScope,
    pub write: PermissionScope,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApplicablePermissions {
    pub is_superadmin: bool,
    pub logs: ApplicableLogPermissions,
    pub management: ManagementPermissions,
}

mod repo_list {
    use serde::{
        Deserialize,
        Deserializer,
        Serializer,
    };
    use std::collections::BTreeMap;
    use super::{
        ReadWritePermissions,
        RepoLogPermissions,
    };

    pub fn serialize<S: Serializer>(
        repos: &BTreeMap<String, ReadWritePermissions>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(repos.iter()
            .map(|(repo_id, rw)| RepoLogPermissions {
                repo_id: repo_id.clone(),
                read: rw.read,
                write: rw.write,
            })
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, ReadWritePermissions>, D::Error> {
        let mut repos = BTreeMap::<String, ReadWritePermissions>::new();
        for p in Vec::<RepoLogPermissions>::deserialize(deserializer)? {
            // a repository listed more than once is granted the union.
            let rw = repos.entry(p.repo_id).or_default();
            *rw = rw.merge(ReadWritePermissions::new(p.read, p.write));
        }
        Ok(repos)
    }
}

mod impls;
