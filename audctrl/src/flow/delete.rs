use audcore::resource::{
    Resource,
    traits::MutationBackend,
};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::{
    error::FlowError,
    query::QueryCache,
};
use super::FlowState;

#[derive(Default)]
struct Inner {
    state: FlowState,
    // (id, label)
    target: Option<(String, String)>,
}

/// The deletion confirmation.  Unlike the other modals it is not part of
/// the navigable state.
pub struct DeleteFlow<B: MutationBackend> {
    backend: Arc<B>,
    cache: QueryCache,
    inner: Mutex<Inner>,
}

impl<B: MutationBackend> DeleteFlow<B> {
    pub fn new(backend: Arc<B>, cache: QueryCache) -> Self {
        Self {
            backend,
            cache,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn state(&self) -> FlowState {
        self.inner.lock().state.clone()
    }

    pub fn target_id(&self) -> Option<String> {
        self.inner.lock()
            .target
            .as_ref()
            .map(|(id, _)| id.clone())
    }

    /// The label of the resource pending deletion, for the prompt.
    pub fn target_label(&self) -> Option<String> {
        self.inner.lock()
            .target
            .as_ref()
            .map(|(_, label)| label.clone())
    }

    pub fn open(&self, resource: &impl Resource) -> Result<(), FlowError> {
        self.open_id(resource.id(), resource.label())
    }

    /// Open the confirmation for an id without the resource at hand.
    pub fn open_id(
        &self,
        id: &str,
        label: impl Into<String>,
    ) -> Result<(), FlowError> {
        let mut inner = self.inner.lock();
        if inner.state == FlowState::Submitting {
            return Err(inner.state.invalid("open"));
        }
        inner.state = FlowState::open();
        inner.target = Some((id.to_string(), label.into()));
        Ok(())
    }

    pub fn cancel(&self) -> Result<(), FlowError> {
        let mut inner = self.inner.lock();
        if inner.state == FlowState::Submitting {
            return Err(inner.state.invalid("cancel"));
        }
        inner.state = FlowState::Closed;
        inner.target = None;
        Ok(())
    }

    /// Delete the target.  Returns whether it is gone; on failure the
    /// confirmation stays open with the error.
    pub async fn confirm(&self) -> Result<bool, FlowError> {
        let id = {
            let mut inner = self.inner.lock();
            let id = match (&inner.state, &inner.target) {
                (FlowState::Open { .. }, Some((id, _))) => id.clone(),
                _ => return Err(inner.state.invalid("confirm")),
            };
            inner.state = FlowState::Submitting;
            id
        };

        let result = self.backend.delete(&id).await;
        let kind = self.backend.kind();
        match result {
            Ok(()) => {
                self.cache.invalidate(kind);
                let mut inner = self.inner.lock();
                inner.state = FlowState::Closed;
                inner.target = None;
                log::trace!("deleted {id} from {kind}");
                Ok(true)
            }
            Err(e) => {
                log::trace!("failed to delete {id} from {kind}: {e}");
                self.inner.lock().state = FlowState::failed(e);
                Ok(false)
            }
        }
    }
}
