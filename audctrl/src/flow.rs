//! Modal flows for creating, editing and deleting a resource.
//!
//! Each flow owns the lifecycle of one modal.  Mutation failures are
//! kept in the flow state for the modal to show; only transitions that
//! make no sense for the current state are reported as [`FlowError`].

use audcore::error::Error;

use crate::error::FlowError;

mod create;
mod delete;
mod edit;

pub use create::CreateFlow;
pub use delete::DeleteFlow;
pub use edit::EditFlow;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum FlowState {
    #[default]
    Closed,
    /// The resource being edited is being loaded.
    Loading,
    Open {
        error: Option<Error>,
    },
    Submitting,
    /// The resource to edit does not exist.
    NotFound,
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Loading => "loading",
            Self::Open { .. } => "open",
            Self::Submitting => "submitting",
            Self::NotFound => "not found",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Open { error } => error.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn open() -> Self {
        Self::Open { error: None }
    }

    pub(crate) fn failed(error: impl Into<Error>) -> Self {
        Self::Open { error: Some(error.into()) }
    }

    pub(crate) fn invalid(&self, action: &'static str) -> FlowError {
        log::warn!("refusing to {action} while {}", self.name());
        FlowError::InvalidTransition {
            action,
            state: self.name(),
        }
    }
}

#[cfg(test)]
mod test {
    use audcore::error::BackendError;
    use super::*;

    #[test]
    fn state_error() {
        assert_eq!(FlowState::open().error(), None);
        assert!(FlowState::open().is_open());
        let state = FlowState::failed(BackendError::Authorization);
        assert_eq!(state.error(), Some(&Error::Backend(BackendError::Authorization)));
        assert_eq!(
            FlowState::Submitting.invalid("close"),
            FlowError::InvalidTransition { action: "close", state: "submitting" },
        );
    }
}
