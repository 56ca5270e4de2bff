use audcore::{
    resource::traits::MutationBackend,
    validate::Validate,
};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::{
    error::FlowError,
    query::QueryCache,
    state::ResourceState,
};
use super::FlowState;

struct Inner<C> {
    state: FlowState,
    draft: Option<C>,
}

/// The creation modal.
pub struct CreateFlow<B: MutationBackend> {
    backend: Arc<B>,
    state: Arc<dyn ResourceState>,
    cache: QueryCache,
    inner: Mutex<Inner<B::Create>>,
}

impl<B: MutationBackend> CreateFlow<B>
where
    B::Create: Validate,
{
    pub fn new(
        backend: Arc<B>,
        state: Arc<dyn ResourceState>,
        cache: QueryCache,
    ) -> Self {
        Self {
            backend,
            state,
            cache,
            inner: Mutex::new(Inner {
                state: FlowState::Closed,
                draft: None,
            }),
        }
    }

    pub fn state(&self) -> FlowState {
        self.inner.lock().state.clone()
    }

    /// The last submitted payload; kept after a failure so the form can
    /// be shown as it was.
    pub fn draft(&self) -> Option<B::Create> {
        self.inner.lock().draft.clone()
    }

    pub fn open(&self) -> Result<(), FlowError> {
        {
            let mut inner = self.inner.lock();
            if inner.state == FlowState::Submitting {
                return Err(inner.state.invalid("open"));
            }
            inner.state = FlowState::open();
            inner.draft = None;
        }
        log::trace!("opening create flow for {}", self.backend.kind());
        self.state.set_is_new(true);
        Ok(())
    }

    pub fn close(&self) -> Result<(), FlowError> {
        {
            let mut inner = self.inner.lock();
            if inner.state == FlowState::Submitting {
                return Err(inner.state.invalid("close"));
            }
            inner.state = FlowState::Closed;
            inner.draft = None;
        }
        self.state.set_is_new(false);
        Ok(())
    }

    /// Submit the form.  Returns the created value on success, `None` if
    /// the form was rejected either locally or by the backend, in which
    /// case the flow stays open with the error.
    pub async fn submit(
        &self,
        payload: B::Create,
    ) -> Result<Option<B::Created>, FlowError> {
        {
            let mut inner = self.inner.lock();
            if !inner.state.is_open() {
                return Err(inner.state.invalid("submit"));
            }
            inner.draft = Some(payload.clone());
            if let Err(errors) = payload.validate() {
                log::trace!("create form has {} invalid field(s)", errors.len());
                inner.state = FlowState::failed(errors);
                return Ok(None);
            }
            inner.state = FlowState::Submitting;
        }

        let result = self.backend.create(payload).await;
        let kind = self.backend.kind();
        match result {
            Ok(created) => {
                self.cache.invalidate(kind);
                {
                    let mut inner = self.inner.lock();
                    inner.state = FlowState::Closed;
                    inner.draft = None;
                }
                log::trace!("created a new item in {kind}");
                self.state.set_is_new(false);
                Ok(Some(created))
            }
            Err(e) => {
                log::trace!("failed to create item in {kind}: {e}");
                self.inner.lock().state = FlowState::failed(e);
                Ok(None)
            }
        }
    }
}
