use audcore::error::{
    BackendError,
    Error,
};
use http::status::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Serialize, Deserialize)]
pub enum AppError {
    #[error("403 Forbidden")]
    Forbidden,
    #[error("404 Not Found")]
    NotFound,
    #[error("500 Internal Server Error")]
    InternalServerError,

    // other non-http error
    #[error("Network Error")]
    NetworkError,
    #[error("Encode/decode error")]
    SerdeError,
    #[error("{0}")]
    Message(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StatusCode> for AppError {
    // Only convert into status known to AppError
    fn from(value: StatusCode) -> Self {
        match value {
            StatusCode::NOT_FOUND => AppError::NotFound,
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => AppError::Forbidden,
            _ => AppError::InternalServerError,
        }
    }
}

impl From<BackendError> for AppError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Network(_) => Self::NetworkError,
            BackendError::NotFound(_) => Self::NotFound,
            BackendError::Authorization => Self::Forbidden,
            BackendError::Decode(_) => Self::SerdeError,
            BackendError::Http { status, .. } => StatusCode::from_u16(status)
                .map(Self::from)
                .unwrap_or(Self::InternalServerError),
            _ => Self::InternalServerError,
        }
    }
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        match e {
            Error::Backend(e) => e.into(),
            e => Self::Message(e.user_message()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_backend() {
        assert_eq!(AppError::from(BackendError::Authorization), AppError::Forbidden);
        assert_eq!(AppError::from(BackendError::NotFound("r1".into())), AppError::NotFound);
        assert_eq!(
            AppError::from(BackendError::from_status(503, "")),
            AppError::InternalServerError,
        );
        assert_eq!(
            AppError::from(BackendError::Network("offline".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR,
        );
    }
}
