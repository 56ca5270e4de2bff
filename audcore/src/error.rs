use thiserror::Error;

/// Failures reported by a backend call.  These are cloneable as the
/// query cache hands the same result to every waiting reader.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BackendError {
    /// The request never produced a usable response.
    #[error("network error: {0}")]
    Network(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// 401/403 equivalents; details are intentionally not carried.
    #[error("not authorized")]
    Authorization,
    #[error("http error {status}: {message}")]
    Http {
        status: u16,
        message: String,
    },
    #[error("decode error: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::Authorization,
            404 => Self::NotFound(message.into()),
            status => Self::Http { status, message: message.into() },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// The message shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Unable to reach the server, please try again.".to_string(),
            Self::NotFound(_) => "The requested item could not be found.".to_string(),
            Self::Authorization => "You are not allowed to perform this action.".to_string(),
            Self::Http { message, .. } if !message.is_empty() => message.clone(),
            Self::Http { status, .. } => format!("The server responded with an error ({status})."),
            Self::Decode(_) => "Unexpected response from the server.".to_string(),
        }
    }
}

/// A single field level validation failure.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Validation failures collected from a form; these never leave the
/// client.
#[derive(Clone, Debug, Default, Error, PartialEq, Eq)]
#[error("validation failed for {} field(s)", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError { field, message: message.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn field(&self, field: &str) -> Option<&str> {
        self.0.iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl Error {
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.0.iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            Self::Backend(e) => e.user_message(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(BackendError::from_status(401, "nope"), BackendError::Authorization);
        assert_eq!(BackendError::from_status(403, "nope"), BackendError::Authorization);
        assert!(BackendError::from_status(404, "repo").is_not_found());
        assert_eq!(
            BackendError::from_status(409, "Repository already exists"),
            BackendError::Http { status: 409, message: "Repository already exists".to_string() },
        );
    }

    #[test]
    fn authorization_message_has_no_details() {
        let message = BackendError::from_status(403, "missing logs:write on repo r1")
            .user_message();
        assert!(!message.contains("r1"));
    }

    #[test]
    fn validation_errors() {
        let mut errors = ValidationErrors::new();
        assert!(errors.clone().into_result().is_ok());
        errors.push("name", "Name is required");
        assert_eq!(errors.field("name"), Some("Name is required"));
        assert_eq!(errors.field("email"), None);
        assert_eq!(
            Error::from(errors).user_message(),
            "Name is required",
        );
    }
}
