use thiserror::Error;

#[derive(Debug, PartialEq, Error)]
pub enum StateError {
    /// The edit modal is only ever opened by following a resource link.
    #[error("resource id may only be cleared; follow resource_link({0:?}) instead")]
    ResourceIdNotNull(String),
}

#[derive(Debug, PartialEq, Error)]
pub enum FlowError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

#[derive(Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid api url {url:?}: {reason}")]
    InvalidUrl {
        url: String,
        reason: String,
    },
}
