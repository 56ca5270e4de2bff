//! The current user, passed down explicitly to whatever needs it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    error::ValidationErrors,
    permission::{
        Permissions,
        ReadWritePermissions,
    },
    user::DEFAULT_LANG,
    validate::{
        Validate,
        require,
        require_email,
        require_password,
    },
};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CurrentUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub permissions: Permissions,
}

fn default_lang() -> String {
    DEFAULT_LANG.to_string()
}

/// `Anonymous` stands for "not logged in"; it is the default rather
/// than an absent value.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(CurrentUser),
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ForgotPassword {
    pub email: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PasswordChange {
    pub password: String,
    #[serde(skip_serializing)]
    pub confirm: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PasswordReset {
    #[serde(skip_serializing)]
    pub token: String,
    pub password: String,
    #[serde(skip_serializing)]
    pub confirm: String,
}

impl From<CurrentUser> for Session {
    fn from(user: CurrentUser) -> Self {
        Session::Authenticated(user)
    }
}

impl Session {
    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            Session::Anonymous => None,
            Session::Authenticated(user) => Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    /// The permissions of the current user; nothing for anonymous.
    pub fn permissions(&self) -> Permissions {
        self.user()
            .map(|user| user.permissions.clone())
            .unwrap_or_default()
    }

    fn management(&self, select: fn(&Permissions) -> ReadWritePermissions) -> ReadWritePermissions {
        match self.user() {
            Some(user) if user.permissions.is_superadmin => ReadWritePermissions::ALL,
            Some(user) => select(&user.permissions),
            None => ReadWritePermissions::NONE,
        }
    }

    pub fn can_read_repos(&self) -> bool {
        self.management(|p| p.management.repos).read
    }

    pub fn can_write_repos(&self) -> bool {
        self.management(|p| p.management.repos).write
    }

    pub fn can_read_users(&self) -> bool {
        self.management(|p| p.management.users).read
    }

    pub fn can_write_users(&self) -> bool {
        self.management(|p| p.management.users).write
    }

    pub fn can_read_apikeys(&self) -> bool {
        self.management(|p| p.management.apikeys).read
    }

    pub fn can_write_apikeys(&self) -> bool {
        self.management(|p| p.management.apikeys).write
    }

    /// Whether the log screens should be offered at all.
    pub fn can_read_logs(&self) -> bool {
        match self.user() {
            Some(user) => {
                let p = &user.permissions;
                p.is_superadmin || p.logs.read || p.logs.repos.values().any(|rw| rw.read)
            }
            None => false,
        }
    }

    /// Whether the current user may hand out `permissions` to others.
    pub fn can_grant(&self, permissions: &Permissions) -> bool {
        self.user()
            .map(|user| user.permissions.covers(permissions))
            .unwrap_or(false)
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Session::Anonymous => f.write_str("<Session:Anonymous>"),
            Session::Authenticated(user) => write!(f, "<Session:{}>", user.email),
        }
    }
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_email(&mut errors, "email", &self.email);
        require(&mut errors, "password", &self.password, "Password is required");
        errors.into_result()
    }
}

impl Validate for ForgotPassword {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_email(&mut errors, "email", &self.email);
        errors.into_result()
    }
}

impl Validate for PasswordChange {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_password(&mut errors, &self.password, &self.confirm);
        errors.into_result()
    }
}

impl Validate for PasswordReset {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require(&mut errors, "token", &self.token, "The reset link is invalid");
        require_password(&mut errors, &self.password, &self.confirm);
        errors.into_result()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn user(permissions: Permissions) -> Session {
        CurrentUser {
            id: "u1".into(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john.doe@example.net".into(),
            lang: "en".into(),
            permissions,
        }.into()
    }

    #[test]
    fn anonymous() {
        let session = Session::default();
        assert!(!session.is_authenticated());
        assert!(!session.can_read_repos());
        assert!(!session.can_read_logs());
        assert!(!session.can_grant(&Permissions::default()));
        assert_eq!(session.to_string(), "<Session:Anonymous>");
    }

    #[test]
    fn superadmin() {
        let session = user(Permissions::superadmin());
        assert!(session.can_write_repos());
        assert!(session.can_write_users());
        assert!(session.can_write_apikeys());
        assert!(session.can_read_logs());
        assert!(session.can_grant(&Permissions::superadmin()));
    }

    #[test]
    fn limited() {
        let mut permissions = Permissions::default();
        permissions.management.users.read = true;
        permissions.set_repo_log_permissions("r1", ReadWritePermissions::new(true, false));
        let session = user(permissions);
        assert!(session.can_read_users());
        assert!(!session.can_write_users());
        assert!(!session.can_read_repos());
        assert!(session.can_read_logs());
        assert!(!session.can_grant(&Permissions::superadmin()));
        assert_eq!(session.to_string(), "<Session:john.doe@example.net>");
    }

    #[test]
    fn password_forms() {
        let change = PasswordChange {
            password: "hunter22".into(),
            confirm: "hunter22".into(),
        };
        assert!(change.validate().is_ok());
        let reset = PasswordReset {
            password: "hunter22".into(),
            confirm: "hunter22".into(),
            .. Default::default()
        };
        assert!(reset.validate().expect_err("missing token").field("token").is_some());
        assert!(LoginForm::default().validate().is_err());
        assert!(ForgotPassword { email: "nobody".into() }.validate().is_err());
    }
}
