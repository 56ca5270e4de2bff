use std::{
    collections::BTreeMap,
    fmt,
};
use super::{
    ApplicableLogPermissions,
    ApplicablePermissions,
    LogsPermissions,
    ManagementPermissions,
    PermissionScope,
    Permissions,
    ReadWritePermissions,
};

impl ReadWritePermissions {
    pub const NONE: Self = Self { read: false, write: false };
    pub const ALL: Self = Self { read: true, write: true };

    pub fn new(read: bool, write: bool) -> Self {
        Self { read, write }
    }

    pub fn is_empty(&self) -> bool {
        !self.read && !self.write
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            read: self.read || other.read,
            write: self.write || other.write,
        }
    }

    /// Whether every flag set on `other` is also set on `self`.
    pub fn covers(&self, other: &Self) -> bool {
        (self.read || !other.read) && (self.write || !other.write)
    }
}

impl ManagementPermissions {
    pub const ALL: Self = Self {
        repos: ReadWritePermissions::ALL,
        users: ReadWritePermissions::ALL,
        apikeys: ReadWritePermissions::ALL,
    };

    pub fn merge(self, other: Self) -> Self {
        Self {
            repos: self.repos.merge(other.repos),
            users: self.users.merge(other.users),
            apikeys: self.apikeys.merge(other.apikeys),
        }
    }

    pub fn covers(&self, other: &Self) -> bool {
        self.repos.covers(&other.repos)
            && self.users.covers(&other.users)
            && self.apikeys.covers(&other.apikeys)
    }
}

impl LogsPermissions {
    fn global(&self) -> ReadWritePermissions {
        ReadWritePermissions::new(self.read, self.write)
    }
}

impl Permissions {
    pub fn superadmin() -> Self {
        Self {
            is_superadmin: true,
            .. Default::default()
        }
    }

    /// The effective log permissions on a single repository, taking the
    /// global flags and the superadmin flag into account.
    pub fn repo_log_permissions(&self, repo_id: &str) -> ReadWritePermissions {
        if self.is_superadmin {
            return ReadWritePermissions::ALL;
        }
        self.logs.repos
            .get(repo_id)
            .copied()
            .unwrap_or_default()
            .merge(self.logs.global())
    }

    /// Set the per-repository override; an empty grant removes the entry.
    pub fn set_repo_log_permissions(
        &mut self,
        repo_id: impl Into<String>,
        value: ReadWritePermissions,
    ) {
        let repo_id = repo_id.into();
        if value.is_empty() {
            self.logs.repos.remove(&repo_id);
        } else {
            self.logs.repos.insert(repo_id, value);
        }
    }

    /// Produce the form to send to the backend.
    ///
    /// Superadmin grants are left untouched as the backend decides the
    /// precedence.  Otherwise per-repository flags already granted by
    /// the global log flags are cleared and entries left granting
    /// nothing are dropped.
    pub fn normalized(&self) -> Self {
        if self.is_superadmin {
            return self.clone();
        }
        let repos = self.logs.repos
            .iter()
            .filter_map(|(repo_id, rw)| {
                let rw = ReadWritePermissions {
                    read: rw.read && !self.logs.read,
                    write: rw.write && !self.logs.write,
                };
                (!rw.is_empty()).then(|| (repo_id.clone(), rw))
            })
            .collect::<BTreeMap<_, _>>();
        Self {
            is_superadmin: false,
            logs: LogsPermissions {
                read: self.logs.read,
                write: self.logs.write,
                repos,
            },
            management: self.management,
        }
    }

    /// The union of two grants.
    pub fn merge(&self, other: &Self) -> Self {
        let mut repos = self.logs.repos.clone();
        for (repo_id, rw) in other.logs.repos.iter() {
            let entry = repos.entry(repo_id.clone()).or_default();
            *entry = entry.merge(*rw);
        }
        Self {
            is_superadmin: self.is_superadmin || other.is_superadmin,
            logs: LogsPermissions {
                read: self.logs.read || other.logs.read,
                write: self.logs.write || other.logs.write,
                repos,
            },
            management: self.management.merge(other.management),
        }
    }

    /// Whether this grant includes everything `other` grants.
    pub fn covers(&self, other: &Self) -> bool {
        if self.is_superadmin {
            return true;
        }
        if other.is_superadmin {
            return false;
        }
        self.management.covers(&other.management)
            && self.logs.global().covers(&other.logs.global())
            && other.logs.repos
                .iter()
                .all(|(repo_id, rw)| self.repo_log_permissions(repo_id).covers(rw))
    }

    /// Summarize the log permissions against the set of repositories
    /// known to the caller.
    pub fn applicable<'a>(
        &self,
        known_repo_ids: impl IntoIterator<Item = &'a str>,
    ) -> ApplicablePermissions {
        if self.is_superadmin {
            return ApplicablePermissions {
                is_superadmin: true,
                logs: ApplicableLogPermissions {
                    read: PermissionScope::All,
                    write: PermissionScope::All,
                },
                management: ManagementPermissions::ALL,
            };
        }
        let known = known_repo_ids.into_iter().collect::<Vec<_>>();
        ApplicablePermissions {
            is_superadmin: false,
            logs: ApplicableLogPermissions {
                read: scope(self.logs.read, &known, &self.logs.repos, |rw| rw.read),
                write: scope(self.logs.write, &known, &self.logs.repos, |rw| rw.write),
            },
            management: self.management,
        }
    }
}

fn scope(
    global: bool,
    known: &[&str],
    repos: &BTreeMap<String, ReadWritePermissions>,
    flag: fn(&ReadWritePermissions) -> bool,
) -> PermissionScope {
    if global {
        return PermissionScope::All;
    }
    let granted = |repo_id: &&str| repos.get(*repo_id).map(flag).unwrap_or(false);
    if !known.is_empty() && known.iter().all(granted) {
        PermissionScope::All
    } else if repos.values().any(flag) {
        // entries for repositories unknown to the caller still count, so
        // the summary never claims less than what was granted.
        PermissionScope::Partial
    } else {
        PermissionScope::None
    }
}

impl ApplicableLogPermissions {
    /// A single label for both flags.
    pub fn overall(&self) -> PermissionScope {
        match (self.read, self.write) {
            (PermissionScope::All, PermissionScope::All) => PermissionScope::All,
            (PermissionScope::None, PermissionScope::None) => PermissionScope::None,
            _ => PermissionScope::Partial,
        }
    }
}

impl fmt::Display for PermissionScope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            PermissionScope::All => "all",
            PermissionScope::Partial => "partial",
            PermissionScope::None => "none",
        })
    }
}
