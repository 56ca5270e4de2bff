use audcore::location::Location;
use parking_lot::Mutex;

use crate::error::StateError;
use super::{
    Modal,
    ResourceState,
    link_for,
    modal_from,
};

#[derive(Debug, Default)]
struct Inner {
    page: u32,
    modal: Modal,
    search: String,
}

/// State held in memory; it is gone once the screen is dropped.
#[derive(Debug)]
pub struct MemoryState {
    // links are generated against the location the screen was mounted at.
    base: Location,
    inner: Mutex<Inner>,
}

impl MemoryState {
    pub fn new(base: Location) -> Self {
        Self {
            base,
            inner: Mutex::new(Inner {
                page: 1,
                .. Default::default()
            }),
        }
    }
}

impl ResourceState for MemoryState {
    fn page(&self) -> u32 {
        self.inner.lock().page
    }

    fn set_page(&self, page: u32) {
        self.inner.lock().page = page.max(1);
    }

    fn modal(&self) -> Modal {
        self.inner.lock().modal.clone()
    }

    fn set_is_new(&self, value: bool) {
        let mut inner = self.inner.lock();
        if value {
            inner.modal = Modal::Creating;
        } else if inner.modal == Modal::Creating {
            inner.modal = Modal::Closed;
        }
    }

    fn set_resource_id(&self, id: Option<&str>) -> Result<(), StateError> {
        match id {
            Some(id) => Err(StateError::ResourceIdNotNull(id.to_string())),
            None => {
                let mut inner = self.inner.lock();
                if matches!(inner.modal, Modal::Editing(_)) {
                    inner.modal = Modal::Closed;
                }
                Ok(())
            }
        }
    }

    fn resource_link(&self, id: &str) -> String {
        link_for(&self.base, id)
    }

    fn follow_link(&self, target: &str) {
        match modal_from(&Location::parse(target)) {
            Modal::Editing(id) => self.inner.lock().modal = Modal::Editing(id),
            modal => log::warn!("ignoring link {target:?} resolving to {modal:?}"),
        }
    }

    fn search(&self) -> String {
        self.inner.lock().search.clone()
    }

    fn set_search(&self, text: &str) {
        self.inner.lock().search = text.to_string();
    }
}
