use audcore::{
    error::BackendError,
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

struct Inner<R, U> {
    state: FlowState,
    target: Option<String>,
    form: Option<R>,
    draft: Option<U>,
    // bumped on every open and close so a load that completes late can
    // tell it is no longer wanted.
    generation: u64,
}

/// The edit modal for a single resource.
pub struct EditFlow<B: MutationBackend> {
    backend: Arc<B>,
    state: Arc<dyn ResourceState>,
    cache: QueryCache,
    inner: Mutex<Inner<B::Resource, B::Update>>,
}

impl<B: MutationBackend> EditFlow<B>
where
    B::Update: Validate,
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
                target: None,
                form: None,
                draft: None,
                generation: 0,
            }),
        }
    }

    pub fn state(&self) -> FlowState {
        self.inner.lock().state.clone()
    }

    /// The id of the resource being edited.
    pub fn target(&self) -> Option<String> {
        self.inner.lock().target.clone()
    }

    /// The loaded resource, only available once the flow is open.
    pub fn form(&self) -> Option<B::Resource> {
        let inner = self.inner.lock();
        match inner.state {
            FlowState::Open { .. } => inner.form.clone(),
            _ => None,
        }
    }

    pub fn draft(&self) -> Option<B::Update> {
        self.inner.lock().draft.clone()
    }

    /// Load `id` and open the form with it.
    pub async fn open(&self, id: &str) -> Result<(), FlowError> {
        let generation = {
            let mut inner = self.inner.lock();
            if inner.state == FlowState::Submitting {
                return Err(inner.state.invalid("open"));
            }
            inner.generation += 1;
            inner.state = FlowState::Loading;
            inner.target = Some(id.to_string());
            inner.form = None;
            inner.draft = None;
            inner.generation
        };
        log::trace!("loading {id} from {} for edit", self.backend.kind());

        let result = self.backend.load(id).await;

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            log::warn!("discarding stale load of {id}");
            return Ok(());
        }
        match result {
            Ok(resource) => {
                inner.form = Some(resource);
                inner.state = FlowState::open();
            }
            Err(BackendError::NotFound(_)) => inner.state = FlowState::NotFound,
            Err(e) => inner.state = FlowState::failed(e),
        }
        Ok(())
    }

    pub fn close(&self) -> Result<(), FlowError> {
        {
            let mut inner = self.inner.lock();
            if inner.state == FlowState::Submitting {
                return Err(inner.state.invalid("close"));
            }
            inner.generation += 1;
            inner.state = FlowState::Closed;
            inner.target = None;
            inner.form = None;
            inner.draft = None;
        }
        self.leave();
        Ok(())
    }

    /// Submit the patch for the loaded resource.  Returns whether the
    /// update went through; on failure the flow stays open with the
    /// error and the loaded form.
    pub async fn submit(&self, patch: B::Update) -> Result<bool, FlowError> {
        let id = {
            let mut inner = self.inner.lock();
            let id = match (&inner.state, &inner.form, &inner.target) {
                (FlowState::Open { .. }, Some(_), Some(id)) => id.clone(),
                _ => return Err(inner.state.invalid("submit")),
            };
            inner.draft = Some(patch.clone());
            if let Err(errors) = patch.validate() {
                log::trace!("edit form for {id} has {} invalid field(s)", errors.len());
                inner.state = FlowState::failed(errors);
                return Ok(false);
            }
            inner.state = FlowState::Submitting;
            id
        };

        let result = self.backend.update(&id, patch).await;
        let kind = self.backend.kind();
        match result {
            Ok(()) => {
                self.cache.invalidate(kind);
                {
                    let mut inner = self.inner.lock();
                    inner.generation += 1;
                    inner.state = FlowState::Closed;
                    inner.target = None;
                    inner.form = None;
                    inner.draft = None;
                }
                log::trace!("updated {id} in {kind}");
                self.leave();
                Ok(true)
            }
            Err(e) => {
                log::trace!("failed to update {id} in {kind}: {e}");
                self.inner.lock().state = FlowState::failed(e);
                Ok(false)
            }
        }
    }

    fn leave(&self) {
        if let Err(e) = self.state.set_resource_id(None) {
            log::warn!("unable to leave edit modal: {e}");
        }
    }
}
