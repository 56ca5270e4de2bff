use crate::error::ValidationErrors;

/// Local checks run on a form before anything is sent to the backend.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

pub const PASSWORD_MIN_LENGTH: usize = 8;

pub(crate) fn require(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    message: &str,
) {
    if value.trim().is_empty() {
        errors.push(field, message);
    }
}

pub(crate) fn require_email(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
) {
    let value = value.trim();
    if value.is_empty() {
        errors.push(field, "Email is required");
    } else if !is_email(value) {
        errors.push(field, "Invalid email address");
    }
}

pub(crate) fn require_password(
    errors: &mut ValidationErrors,
    password: &str,
    confirm: &str,
) {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        errors.push(
            "password",
            format!("Password must be at least {PASSWORD_MIN_LENGTH} characters long"),
        );
    }
    if password != confirm {
        errors.push("confirm", "Passwords do not match");
    }
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty()
            && !domain.is_empty()
            && !domain.contains('@')
            && !value.contains(char::is_whitespace),
        None => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn email() {
        assert!(is_email("john.doe@example.net"));
        assert!(!is_email("john.doe"));
        assert!(!is_email("@example.net"));
        assert!(!is_email("john@"));
        assert!(!is_email("john@doe@example.net"));
        assert!(!is_email("john doe@example.net"));
    }

    #[test]
    fn password() {
        let mut errors = ValidationErrors::new();
        require_password(&mut errors, "short", "short");
        assert!(errors.field("password").is_some());
        assert!(errors.field("confirm").is_none());

        let mut errors = ValidationErrors::new();
        require_password(&mut errors, "long enough", "long enougH");
        assert!(errors.field("password").is_none());
        assert_eq!(errors.field("confirm"), Some("Passwords do not match"));
    }
}
